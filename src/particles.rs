use crate::config::ParticleConfig;
use crate::glow::Point;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub fn css(self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Base colour and alpha range `(min, spread)` for a theme.
fn theme_tint(theme: Theme) -> ((u8, u8, u8), f64, f64) {
    match theme {
        Theme::Dark => ((100, 181, 246), 0.3, 0.5),
        Theme::Light => ((74, 144, 226), 0.2, 0.4),
    }
}

pub fn link_color(theme: Theme, opacity: f64) -> Rgba {
    let ((r, g, b), _, _) = theme_tint(theme);
    Rgba { r, g, b, a: opacity }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub radius: f64,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub from: Point,
    pub to: Point,
    pub opacity: f64,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    rng: fastrand::Rng,
}

impl ParticleField {
    pub fn new(
        count: usize,
        bounds: (f64, f64),
        theme: Theme,
        config: &ParticleConfig,
        seed: u64,
    ) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(count),
            width: bounds.0,
            height: bounds.1,
            rng: fastrand::Rng::with_seed(seed),
        };
        field.rebuild(count, bounds, theme, config);
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn jittered_color(&mut self, theme: Theme) -> Rgba {
        let ((r, g, b), min, spread) = theme_tint(theme);
        Rgba {
            r,
            g,
            b,
            a: self.rng.f64() * spread + min,
        }
    }

    /// Replaces every particle; used at startup and on resize.
    pub fn rebuild(&mut self, count: usize, bounds: (f64, f64), theme: Theme, config: &ParticleConfig) {
        self.width = bounds.0.max(0.0);
        self.height = bounds.1.max(0.0);
        self.particles.clear();

        for _ in 0..count {
            let color = self.jittered_color(theme);
            let particle = Particle {
                x: self.rng.f64() * self.width,
                y: self.rng.f64() * self.height,
                speed_x: (self.rng.f64() - 0.5) * config.speed_spread,
                speed_y: (self.rng.f64() - 0.5) * config.speed_spread,
                radius: self.rng.f64() * config.radius_spread + config.min_radius,
                color,
            };
            self.particles.push(particle);
        }
    }

    /// New colours only; positions and velocities are kept.
    pub fn recolor(&mut self, theme: Theme) {
        for index in 0..self.particles.len() {
            let color = self.jittered_color(theme);
            self.particles[index].color = color;
        }
    }

    pub fn step(&mut self, pointer: Option<Point>, config: &ParticleConfig) {
        let (width, height) = (self.width, self.height);

        for particle in &mut self.particles {
            particle.x += particle.speed_x;
            particle.y += particle.speed_y;

            if let Some(pointer) = pointer {
                let dx = pointer.x - particle.x;
                let dy = pointer.y - particle.y;
                let distance = dx.hypot(dy);
                if distance < config.pointer_radius {
                    let force = (config.pointer_radius - distance) / config.pointer_radius;
                    let angle = dy.atan2(dx);
                    particle.x -= angle.cos() * force * config.push_strength;
                    particle.y -= angle.sin() * force * config.push_strength;
                }
            }

            if particle.x < 0.0 || particle.x > width {
                particle.speed_x = -particle.speed_x;
            }
            if particle.y < 0.0 || particle.y > height {
                particle.speed_y = -particle.speed_y;
            }

            particle.x = particle.x.clamp(0.0, width);
            particle.y = particle.y.clamp(0.0, height);
        }
    }

    /// Every unordered pair closer than `connection_distance`, with opacity
    /// fading linearly to zero at the cutoff.
    pub fn links(&self, connection_distance: f64, opacity_scale: f64) -> Vec<Link> {
        let mut links = Vec::new();
        for (index, a) in self.particles.iter().enumerate() {
            for b in &self.particles[index + 1..] {
                let distance = (a.x - b.x).hypot(a.y - b.y);
                if distance < connection_distance {
                    links.push(Link {
                        from: Point::new(a.x, a.y),
                        to: Point::new(b.x, b.y),
                        opacity: (1.0 - distance / connection_distance) * opacity_scale,
                    });
                }
            }
        }
        links
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{link_color, ParticleField};
    use crate::config::ParticleConfig;
    use crate::device::{viewport_size, DeviceProfile};
    use crate::glow::Point;
    use crate::theme::Theme;
    use crate::logging::{LogLevel, LogOnce};
    use gloo::events::EventListener;
    use gloo::render::{request_animation_frame, AnimationFrame};
    use std::cell::{Cell, RefCell};
    use std::f64::consts::TAU;
    use serde_json::json;
    use std::rc::Rc;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

    const CANVAS_ID: &str = "particle-canvas";

    pub struct ParticleLayer {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        config: ParticleConfig,
        narrow: bool,
        theme: Rc<Cell<Theme>>,
        field: RefCell<ParticleField>,
        pointer: Cell<Option<Point>>,
        frame: RefCell<Option<AnimationFrame>>,
        listeners: RefCell<Vec<EventListener>>,
        running: Cell<bool>,
        draw_failed: LogOnce,
    }

    impl ParticleLayer {
        pub fn mount(
            config: ParticleConfig,
            device: &DeviceProfile,
            theme: Rc<Cell<Theme>>,
        ) -> Result<Rc<Self>, JsValue> {
            let window = window().ok_or_else(|| JsValue::from_str("no window"))?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
            if document.get_element_by_id(CANVAS_ID).is_some() {
                return Err(JsValue::from_str("particle canvas already mounted"));
            }

            let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
            canvas.set_id(CANVAS_ID);
            let style = canvas.style();
            for (name, value) in [
                ("position", "fixed"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("z-index", "-1"),
                ("pointer-events", "none"),
            ] {
                style.set_property(name, value)?;
            }
            style.set_property("opacity", &config.canvas_opacity.to_string())?;
            let ctx: CanvasRenderingContext2d = canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
                .dyn_into()?;
            body.append_child(&canvas)?;

            let viewport = viewport_size();
            let field = ParticleField::new(
                config.count_for(device.narrow),
                viewport,
                theme.get(),
                &config,
                js_sys::Date::now() as u64,
            );
            canvas.set_width(viewport.0 as u32);
            canvas.set_height(viewport.1 as u32);

            let layer = Rc::new(Self {
                canvas,
                ctx,
                config,
                narrow: device.narrow,
                theme,
                field: RefCell::new(field),
                pointer: Cell::new(None),
                frame: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                running: Cell::new(false),
                draw_failed: LogOnce::default(),
            });
            layer.install_listeners(&window);
            Ok(layer)
        }

        fn install_listeners(self: &Rc<Self>, window: &web_sys::Window) {
            let mut listeners = self.listeners.borrow_mut();

            let layer = Rc::downgrade(self);
            listeners.push(EventListener::new(window, "resize", move |_| {
                if let Some(layer) = layer.upgrade() {
                    layer.resize();
                }
            }));

            let layer = Rc::downgrade(self);
            listeners.push(EventListener::new(window, "mousemove", move |event| {
                let (Some(layer), Some(event)) = (layer.upgrade(), event.dyn_ref::<MouseEvent>())
                else {
                    return;
                };
                layer.pointer.set(Some(Point::new(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                )));
            }));

            let layer = Rc::downgrade(self);
            listeners.push(EventListener::new(window, "mouseout", move |_| {
                if let Some(layer) = layer.upgrade() {
                    layer.pointer.set(None);
                }
            }));
        }

        fn resize(&self) {
            let viewport = viewport_size();
            self.canvas.set_width(viewport.0 as u32);
            self.canvas.set_height(viewport.1 as u32);
            self.field.borrow_mut().rebuild(
                self.config.count_for(self.narrow),
                viewport,
                self.theme.get(),
                &self.config,
            );
        }

        pub fn recolor(&self, theme: Theme) {
            self.field.borrow_mut().recolor(theme);
        }

        pub fn start(self: &Rc<Self>) {
            if self.running.replace(true) {
                return;
            }
            self.schedule();
        }

        pub fn stop(&self) {
            self.running.set(false);
            self.frame.borrow_mut().take();
            self.listeners.borrow_mut().clear();
            self.canvas.remove();
        }

        fn schedule(self: &Rc<Self>) {
            let layer = Rc::clone(self);
            let handle = request_animation_frame(move |_timestamp| layer.frame());
            *self.frame.borrow_mut() = Some(handle);
        }

        fn frame(self: &Rc<Self>) {
            self.frame.borrow_mut().take();
            if !self.running.get() {
                return;
            }

            let mut field = self.field.borrow_mut();
            field.step(self.pointer.get(), &self.config);
            let drawn = self.draw(&field);
            drop(field);
            if let Err(err) = drawn {
                self.draw_failed.log(
                    LogLevel::Error,
                    "particle_draw_failed",
                    json!({ "error": format!("{err:?}") }),
                );
            }
            self.schedule();
        }

        fn draw(&self, field: &ParticleField) -> Result<(), JsValue> {
            let ctx = &self.ctx;
            let (width, height) = field.bounds();
            ctx.clear_rect(0.0, 0.0, width, height);

            let theme = self.theme.get();
            let distance = self.config.connection_distance_for(self.narrow);
            ctx.set_line_width(self.config.link_width);
            for link in field.links(distance, self.config.link_opacity) {
                ctx.set_stroke_style(&JsValue::from_str(&link_color(theme, link.opacity).css()));
                ctx.begin_path();
                ctx.move_to(link.from.x, link.from.y);
                ctx.line_to(link.to.x, link.to.y);
                ctx.stroke();
            }

            for particle in field.particles() {
                ctx.set_fill_style(&JsValue::from_str(&particle.color.css()));
                ctx.begin_path();
                ctx.arc(particle.x, particle.y, particle.radius, 0.0, TAU)?;
                ctx.fill();
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ParticleLayer;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn field(count: usize, theme: Theme) -> (ParticleField, ParticleConfig) {
        let config = AppConfig::default().particles;
        (ParticleField::new(count, (640.0, 480.0), theme, &config, 7), config)
    }

    fn in_bounds(field: &ParticleField) -> bool {
        let (width, height) = field.bounds();
        field
            .particles()
            .iter()
            .all(|p| (0.0..=width).contains(&p.x) && (0.0..=height).contains(&p.y))
    }

    #[test]
    fn particles_stay_inside_canvas_after_many_steps() {
        let (mut field, config) = field(60, Theme::Light);
        let pointers = [None, Some(Point::new(0.0, 0.0)), Some(Point::new(320.0, 240.0))];

        for frame in 0..5_000 {
            field.step(pointers[frame % pointers.len()], &config);
            assert!(in_bounds(&field), "escaped bounds at frame {frame}");
        }
    }

    #[test]
    fn velocity_reflects_at_edge() {
        let config = AppConfig::default().particles;
        let mut field = ParticleField::new(1, (100.0, 100.0), Theme::Dark, &config, 1);
        field.particles[0] = Particle {
            x: 99.9,
            y: 50.0,
            speed_x: 0.25,
            speed_y: 0.0,
            ..field.particles[0]
        };

        field.step(None, &config);

        assert_eq!(field.particles[0].x, 100.0);
        assert_eq!(field.particles[0].speed_x, -0.25);
    }

    #[test]
    fn pointer_repels_nearby_particle() {
        let config = AppConfig::default().particles;
        let mut field = ParticleField::new(1, (400.0, 400.0), Theme::Light, &config, 3);
        field.particles[0] = Particle {
            x: 150.0,
            y: 200.0,
            speed_x: 0.0,
            speed_y: 0.0,
            ..field.particles[0]
        };

        field.step(Some(Point::new(200.0, 200.0)), &config);

        let expected_push = (100.0 - 50.0) / 100.0 * config.push_strength;
        assert!((field.particles[0].x - (150.0 - expected_push)).abs() < 1e-9);
        assert!((field.particles[0].y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn links_fade_linearly_with_distance() {
        let config = AppConfig::default().particles;
        let mut field = ParticleField::new(3, (500.0, 500.0), Theme::Light, &config, 11);
        let template = field.particles[0];
        field.particles = vec![
            Particle { x: 0.0, y: 0.0, ..template },
            Particle { x: 60.0, y: 0.0, ..template },
            Particle { x: 400.0, y: 400.0, ..template },
        ];

        let links = field.links(120.0, 0.3);

        assert_eq!(links.len(), 1);
        assert!((links[0].opacity - 0.15).abs() < 1e-9);
    }

    #[test]
    fn recolor_keeps_motion_state() {
        let (mut field, config) = field(20, Theme::Light);
        field.step(None, &config);
        let before = field.particles().to_vec();

        field.recolor(Theme::Dark);

        for (old, new) in before.iter().zip(field.particles()) {
            assert_eq!((old.x, old.y, old.speed_x, old.speed_y), (new.x, new.y, new.speed_x, new.speed_y));
            assert_eq!((new.color.r, new.color.g, new.color.b), (100, 181, 246));
            assert!((0.3..0.8).contains(&new.color.a));
        }
    }

    #[test]
    fn rebuild_replaces_set_for_new_bounds() {
        let (mut field, config) = field(60, Theme::Light);

        field.rebuild(30, (200.0, 100.0), Theme::Light, &config);

        assert_eq!(field.particles().len(), 30);
        assert!(in_bounds(&field));
        assert!(field
            .particles()
            .iter()
            .all(|p| (1.0..4.0).contains(&p.radius) && (0.2..0.6).contains(&p.color.a)));
    }
}
