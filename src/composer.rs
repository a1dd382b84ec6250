use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::JsValue;

use crate::config::{self, AppConfig};
use crate::device;
use crate::engine::VisualEffectEngine;
use crate::form::FormController;
use crate::interaction::InteractionController;
use crate::language::{LanguageController, LanguageState};
use crate::logging::{self, log_event, LogLevel};
use crate::motion;
use crate::navigation::NavigationController;
use crate::preferences::{LocalStorage, PreferenceStore};
use crate::theme::{ThemeController, ThemeState};

thread_local! {
    static APP: RefCell<Option<PortfolioApp>> = const { RefCell::new(None) };
}

/// Every controller attached to the rendered page. Dropping it removes
/// their listeners; the effect engine additionally needs `stop`.
pub struct PortfolioApp {
    _theme: Rc<ThemeController>,
    _language: Rc<LanguageController>,
    engine: Rc<VisualEffectEngine>,
    _navigation: NavigationController,
    _interaction: InteractionController,
    _form: FormController,
}

fn report(module: &str, result: Result<(), JsValue>) {
    match result {
        Ok(()) => log_event(LogLevel::Debug, "module_ready", json!({ "module": module })),
        Err(err) => log_event(
            LogLevel::Error,
            "module_init_failed",
            json!({ "module": module, "error": format!("{err:?}") }),
        ),
    }
}

impl PortfolioApp {
    /// Best-effort startup: a module that fails to initialise is logged and
    /// the remaining modules still attach. Nothing is rolled back.
    pub fn init(config: AppConfig) -> Self {
        let store = PreferenceStore::new(Rc::new(LocalStorage));
        let motion = motion::detect();
        let device = device::detect(&config.device);
        log_event(
            LogLevel::Debug,
            "device_detected",
            json!({
                "viewport": [device.viewport_width, device.viewport_height],
                "narrow": device.narrow,
                "touchPrimary": device.touch_primary,
                "touchCapable": device.touch_capable,
                "animated": motion.animated(),
            }),
        );

        let theme_state = Rc::new(ThemeState::new(store.clone(), &config.theme));
        let theme = ThemeController::new(Rc::clone(&theme_state), Rc::clone(&motion));
        report("theme", theme.init());

        let language_state = Rc::new(LanguageState::new(store, &config.language));
        let language = LanguageController::new(Rc::clone(&language_state), Rc::clone(&motion));
        report("language", language.init());

        let engine = VisualEffectEngine::new(
            config.clone(),
            device,
            Rc::clone(&motion),
            theme_state,
        );
        engine.start();

        let mut navigation = NavigationController::new(config.navigation.clone());
        report("navigation", navigation.init());

        let mut interaction =
            InteractionController::new(config.interaction.clone(), device, Rc::clone(&motion));
        report("interaction", interaction.init());

        let mut form = FormController::new(config.form.clone(), language_state, motion);
        report("form", form.init());

        Self {
            _theme: theme,
            _language: language,
            engine,
            _navigation: navigation,
            _interaction: interaction,
            _form: form,
        }
    }
}

pub fn start() {
    console_error_panic_hook::set_once();
    if APP.with(|slot| slot.borrow().is_some()) {
        return;
    }

    let config = config::load();
    logging::set_min_level(config.log_level);
    let app = PortfolioApp::init(config);
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    log_event(LogLevel::Info, "app_started", json!({}));
}

pub fn shutdown() {
    let Some(app) = APP.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    app.engine.stop();
    drop(app);
    log_event(LogLevel::Info, "app_stopped", json!({}));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn running() -> bool {
        APP.with(|slot| slot.borrow().is_some())
    }

    #[wasm_bindgen_test]
    fn start_is_idempotent_and_shutdown_releases_the_app() {
        start();
        start();
        assert!(running());

        shutdown();
        assert!(!running());
        shutdown();
    }
}
