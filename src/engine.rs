use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::JsValue;

use crate::config::AppConfig;
use crate::device::DeviceProfile;
use crate::glow::GlowLayer;
use crate::logging::{log_event, LogLevel};
use crate::motion::Motion;
use crate::particles::ParticleLayer;
use crate::reveal::{play_hero_intro, HeroIntro, RevealWatcher};
use crate::theme::{SubscriptionId, Theme, ThemeState};
use crate::tilt::TiltBinding;

fn mounted<T>(layer: &str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log_event(
                LogLevel::Error,
                "effect_mount_failed",
                json!({ "layer": layer, "error": format!("{err:?}") }),
            );
            None
        }
    }
}

/// Owns the continuous visual effects: pointer glow, particle field, scroll
/// reveal and card tilt. Each piece is optional; a missing mount point or a
/// constrained device simply leaves it out.
pub struct VisualEffectEngine {
    config: AppConfig,
    device: DeviceProfile,
    motion: Rc<dyn Motion>,
    theme_state: Rc<ThemeState>,
    theme: Rc<Cell<Theme>>,
    glow: RefCell<Option<Rc<GlowLayer>>>,
    particles: RefCell<Option<Rc<ParticleLayer>>>,
    reveal: RefCell<Option<RevealWatcher>>,
    hero: RefCell<Option<HeroIntro>>,
    tilt: RefCell<Option<TiltBinding>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl VisualEffectEngine {
    pub fn new(
        config: AppConfig,
        device: DeviceProfile,
        motion: Rc<dyn Motion>,
        theme_state: Rc<ThemeState>,
    ) -> Rc<Self> {
        let theme = Rc::new(Cell::new(theme_state.current()));
        Rc::new(Self {
            config,
            device,
            motion,
            theme_state,
            theme,
            glow: RefCell::new(None),
            particles: RefCell::new(None),
            reveal: RefCell::new(None),
            hero: RefCell::new(None),
            tilt: RefCell::new(None),
            subscription: Cell::new(None),
        })
    }

    pub fn is_running(&self) -> bool {
        self.subscription.get().is_some()
    }

    /// Mounts every layer independently. A layer that fails to mount is
    /// logged and left out; the others still run.
    pub fn start(self: &Rc<Self>) {
        if self.is_running() {
            return;
        }
        self.theme.set(self.theme_state.current());

        if self.device.pointer_effects_enabled() {
            *self.glow.borrow_mut() = mounted(
                "glow",
                GlowLayer::mount(self.config.glow.clone(), Rc::clone(&self.theme)),
            );
        } else {
            log_event(
                LogLevel::Info,
                "pointer_effects_disabled",
                json!({ "narrow": self.device.narrow, "touchPrimary": self.device.touch_primary }),
            );
        }
        if let Some(glow) = self.glow.borrow().as_ref() {
            glow.start();
        }

        *self.particles.borrow_mut() = mounted(
            "particles",
            ParticleLayer::mount(
                self.config.particles.clone(),
                &self.device,
                Rc::clone(&self.theme),
            ),
        );
        if let Some(particles) = self.particles.borrow().as_ref() {
            particles.start();
        }

        *self.reveal.borrow_mut() = mounted(
            "reveal",
            RevealWatcher::observe(&self.config.reveal, Rc::clone(&self.motion)),
        )
        .flatten();
        *self.hero.borrow_mut() = Some(play_hero_intro(
            &self.config.reveal,
            Rc::clone(&self.motion),
        ));

        *self.tilt.borrow_mut() = TiltBinding::attach(&self.config.tilt, &self.device);

        let engine = Rc::downgrade(self);
        let id = self.theme_state.subscribe(move |change| {
            if let Some(engine) = engine.upgrade() {
                engine.on_theme_changed(if change.is_dark { Theme::Dark } else { Theme::Light });
            }
        });
        self.subscription.set(Some(id));

        log_event(
            LogLevel::Debug,
            "effects_started",
            json!({
                "glow": self.glow.borrow().is_some(),
                "particles": self.particles.borrow().is_some(),
                "tiltCards": self.tilt.borrow().as_ref().map_or(0, TiltBinding::card_count),
                "reveal": self.reveal.borrow().is_some(),
            }),
        );
    }

    fn on_theme_changed(&self, theme: Theme) {
        self.theme.set(theme);
        if let Some(particles) = self.particles.borrow().as_ref() {
            particles.recolor(theme);
        }
    }

    /// Cancels every pending frame, timer and listener and removes the
    /// canvases created by `start`. Safe to call more than once.
    pub fn stop(&self) {
        if let Some(id) = self.subscription.take() {
            self.theme_state.unsubscribe(id);
        }
        if let Some(glow) = self.glow.borrow_mut().take() {
            glow.stop();
        }
        if let Some(particles) = self.particles.borrow_mut().take() {
            particles.stop();
        }
        self.hero.borrow_mut().take();
        let revealed = self.reveal.borrow_mut().take().map_or(0, |reveal| {
            reveal.disconnect();
            reveal.revealed_count()
        });
        if let Some(mut tilt) = self.tilt.borrow_mut().take() {
            tilt.detach();
        }
        log_event(
            LogLevel::Debug,
            "effects_stopped",
            json!({ "revealed": revealed }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::ImmediateMotion;
    use crate::preferences::PreferenceStore;
    use wasm_bindgen_test::*;
    use web_sys::window;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas_present(id: &str) -> bool {
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .is_some()
    }

    #[wasm_bindgen_test]
    fn stop_tears_down_canvases_and_subscription() {
        let config = AppConfig::default();
        let device = DeviceProfile::classify((1440.0, 900.0), false, false, 0, 768.0);
        let theme_state = Rc::new(ThemeState::new(PreferenceStore::in_memory(), &config.theme));
        let engine = VisualEffectEngine::new(
            config,
            device,
            Rc::new(ImmediateMotion),
            Rc::clone(&theme_state),
        );

        engine.start();
        assert!(engine.is_running());
        assert!(canvas_present("particle-canvas"));
        assert!(canvas_present("mouse-follow-canvas"));

        theme_state.toggle();
        assert_eq!(engine.theme.get(), Theme::Dark);
        let id = engine.subscription.get().expect("subscribed while running");

        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        assert!(!canvas_present("particle-canvas"));
        assert!(!canvas_present("mouse-follow-canvas"));
        assert!(!theme_state.unsubscribe(id));
    }

    #[wasm_bindgen_test]
    fn narrow_device_skips_glow_but_keeps_particles() {
        let config = AppConfig::default();
        let device = DeviceProfile::classify((390.0, 844.0), true, true, 5, 768.0);
        let theme_state = Rc::new(ThemeState::new(PreferenceStore::in_memory(), &config.theme));
        let engine = VisualEffectEngine::new(config, device, Rc::new(ImmediateMotion), theme_state);

        engine.start();
        assert!(!canvas_present("mouse-follow-canvas"));
        assert!(canvas_present("particle-canvas"));
        assert!(engine.tilt.borrow().is_none());
        engine.stop();
    }

    #[wasm_bindgen_test]
    fn failed_glow_mount_leaves_other_layers_running() {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let blocker = document.create_element("div").expect("div");
        blocker.set_id("mouse-follow-canvas");
        document.body().expect("body").append_child(&blocker).expect("append");

        let config = AppConfig::default();
        let device = DeviceProfile::classify((1440.0, 900.0), false, false, 0, 768.0);
        let theme_state = Rc::new(ThemeState::new(PreferenceStore::in_memory(), &config.theme));
        let engine = VisualEffectEngine::new(
            config,
            device,
            Rc::new(ImmediateMotion),
            Rc::clone(&theme_state),
        );

        engine.start();
        assert!(engine.is_running());
        assert!(engine.glow.borrow().is_none());
        assert!(canvas_present("particle-canvas"));

        theme_state.toggle();
        assert_eq!(engine.theme.get(), Theme::Dark);

        engine.stop();
        assert!(!canvas_present("particle-canvas"));
        blocker.remove();
    }
}
