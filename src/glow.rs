use crate::config::GlowConfig;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pointer-follow state: a raw target and an eased position chasing it.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowState {
    pub target: Point,
    pub position: Point,
    idle: bool,
    idle_clock: f64,
}

impl GlowState {
    pub fn centered(viewport: (f64, f64)) -> Self {
        let center = Point::new(viewport.0 / 2.0, viewport.1 / 2.0);
        Self {
            target: center,
            position: center,
            idle: true,
            idle_clock: 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.target = Point::new(x, y);
        self.idle = false;
        self.idle_clock = 0.0;
    }

    pub fn go_idle(&mut self) {
        self.idle = true;
    }

    pub fn step(&mut self, viewport: (f64, f64), config: &GlowConfig) {
        if self.idle {
            self.idle_clock += config.idle_speed;
            self.target = idle_orbit(self.idle_clock, viewport, config);
        }

        self.position.x += (self.target.x - self.position.x) * config.smoothing;
        self.position.y += (self.target.y - self.position.y) * config.smoothing;
    }
}

pub fn idle_orbit(clock: f64, viewport: (f64, f64), config: &GlowConfig) -> Point {
    Point::new(
        viewport.0 / 2.0 + clock.sin() * config.idle_radius,
        viewport.1 / 2.0 + (clock * 0.7).cos() * config.idle_radius * config.idle_vertical_factor,
    )
}

pub fn radii(viewport: (f64, f64), config: &GlowConfig) -> (f64, f64) {
    let main = viewport.0.min(viewport.1) * config.radius_factor;
    (main, main * config.secondary_radius_factor)
}

pub struct GlowPalette {
    pub main: [(f32, &'static str); 3],
    pub secondary: [(f32, &'static str); 2],
}

pub fn palette(theme: Theme) -> GlowPalette {
    match theme {
        Theme::Dark => GlowPalette {
            main: [
                (0.0, "rgba(100, 181, 246, 0.4)"),
                (0.4, "rgba(139, 92, 246, 0.3)"),
                (1.0, "transparent"),
            ],
            secondary: [(0.0, "rgba(139, 92, 246, 0.2)"), (1.0, "transparent")],
        },
        Theme::Light => GlowPalette {
            main: [
                (0.0, "rgba(74, 144, 226, 0.8)"),
                (0.4, "rgba(255, 107, 107, 0.3)"),
                (1.0, "transparent"),
            ],
            secondary: [(0.0, "rgba(255, 107, 107, 0.2)"), (1.0, "transparent")],
        },
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{palette, radii, GlowState};
    use crate::config::GlowConfig;
    use crate::device::viewport_size;
    use crate::theme::Theme;
    use crate::logging::{LogLevel, LogOnce};
    use gloo::events::EventListener;
    use gloo::render::{request_animation_frame, AnimationFrame};
    use gloo::timers::callback::Timeout;
    use std::cell::{Cell, RefCell};
    use std::f64::consts::TAU;
    use serde_json::json;
    use std::rc::Rc;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

    const CANVAS_ID: &str = "mouse-follow-canvas";
    /// Sized in CSS pixels here; the backing store follows the pixel ratio.
    const CANVAS_STYLE: [(&str, &str); 7] = [
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("pointer-events", "none"),
        ("z-index", "-1"),
    ];

    pub struct GlowLayer {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        config: GlowConfig,
        theme: Rc<Cell<Theme>>,
        state: RefCell<GlowState>,
        viewport: Cell<(f64, f64)>,
        frame: RefCell<Option<AnimationFrame>>,
        idle_timer: RefCell<Option<Timeout>>,
        listeners: RefCell<Vec<EventListener>>,
        running: Cell<bool>,
        draw_failed: LogOnce,
    }

    impl GlowLayer {
        pub fn mount(config: GlowConfig, theme: Rc<Cell<Theme>>) -> Result<Rc<Self>, JsValue> {
            let window = window().ok_or_else(|| JsValue::from_str("no window"))?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
            if document.get_element_by_id(CANVAS_ID).is_some() {
                return Err(JsValue::from_str("glow canvas already mounted"));
            }

            let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
            canvas.set_id(CANVAS_ID);
            let style = canvas.style();
            for (property, value) in CANVAS_STYLE {
                style.set_property(property, value)?;
            }
            let ctx: CanvasRenderingContext2d = canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
                .dyn_into()?;
            body.append_child(&canvas)?;

            let viewport = viewport_size();
            let layer = Rc::new(Self {
                canvas,
                ctx,
                config,
                theme,
                state: RefCell::new(GlowState::centered(viewport)),
                viewport: Cell::new(viewport),
                frame: RefCell::new(None),
                idle_timer: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                running: Cell::new(false),
                draw_failed: LogOnce::default(),
            });
            layer.resize();
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
                layer.pointer_moved(f64::from(event.client_x()), f64::from(event.client_y()));
            }));
        }

        fn resize(&self) {
            let viewport = viewport_size();
            self.viewport.set(viewport);
            let dpr = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            self.canvas.set_width((viewport.0 * dpr) as u32);
            self.canvas.set_height((viewport.1 * dpr) as u32);
            if let Err(err) = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
                self.draw_failed.log(
                    LogLevel::Error,
                    "glow_draw_failed",
                    json!({ "error": format!("{err:?}") }),
                );
            }
        }

        fn pointer_moved(self: &Rc<Self>, x: f64, y: f64) {
            self.state.borrow_mut().pointer_moved(x, y);

            let layer = Rc::downgrade(self);
            let timer = Timeout::new(self.config.idle_timeout_ms, move || {
                if let Some(layer) = layer.upgrade() {
                    layer.state.borrow_mut().go_idle();
                }
            });
            *self.idle_timer.borrow_mut() = Some(timer);
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
            self.idle_timer.borrow_mut().take();
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

            let viewport = self.viewport.get();
            let position = {
                let mut state = self.state.borrow_mut();
                state.step(viewport, &self.config);
                state.position
            };
            if let Err(err) = self.draw(position.x, position.y, viewport) {
                self.draw_failed.log(
                    LogLevel::Error,
                    "glow_draw_failed",
                    json!({ "error": format!("{err:?}") }),
                );
            }
            self.schedule();
        }

        fn draw(&self, x: f64, y: f64, viewport: (f64, f64)) -> Result<(), JsValue> {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, viewport.0, viewport.1);

            let colors = palette(self.theme.get());
            let (main_radius, secondary_radius) = radii(viewport, &self.config);
            self.fill_gradient(x, y, main_radius, &colors.main)?;
            self.fill_gradient(x, y, secondary_radius, &colors.secondary)
        }

        fn fill_gradient(
            &self,
            x: f64,
            y: f64,
            radius: f64,
            stops: &[(f32, &'static str)],
        ) -> Result<(), JsValue> {
            let gradient = self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius)?;
            for (offset, color) in stops {
                gradient.add_color_stop(*offset, color)?;
            }
            self.ctx.set_fill_style(&gradient);
            self.ctx.begin_path();
            self.ctx.arc(x, y, radius, 0.0, TAU)?;
            self.ctx.fill();
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::GlowLayer;
