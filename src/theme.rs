use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ThemeConfig;
use crate::preferences::{PreferenceStore, PreferenceValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }
}

impl PreferenceValue for Theme {
    fn decode(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(Self::Dark),
            "false" => Some(Self::Light),
            _ => None,
        }
    }

    fn encode(self) -> &'static str {
        if self.is_dark() {
            "true"
        } else {
            "false"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeChanged {
    pub is_dark: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(ThemeChanged)>;

/// Theme flag plus its persistence and the list of dependents that want to
/// hear about changes.
pub struct ThemeState {
    theme: Cell<Theme>,
    store: PreferenceStore,
    storage_key: &'static str,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
}

impl ThemeState {
    pub fn new(store: PreferenceStore, config: &ThemeConfig) -> Self {
        let theme = store.load(config.storage_key, config.default);
        Self {
            theme: Cell::new(theme),
            store,
            storage_key: config.storage_key,
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Theme {
        self.theme.get()
    }

    /// Flips and persists without notifying anyone.
    pub fn flip(&self) -> Theme {
        let next = self.theme.get().toggled();
        self.theme.set(next);
        self.store.save(self.storage_key, next);
        next
    }

    pub fn broadcast(&self) {
        let change = ThemeChanged {
            is_dark: self.current().is_dark(),
        };
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(change);
        }
    }

    pub fn toggle(&self) -> Theme {
        let next = self.flip();
        self.broadcast();
        next
    }

    pub fn subscribe(&self, listener: impl Fn(ThemeChanged) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{Theme, ThemeState};
    use crate::logging::{log_event, LogLevel};
    use crate::motion::{pulse, Motion};
    use gloo::events::EventListener;
    use js_sys::{Object, Reflect};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{window, CustomEvent, CustomEventInit, HtmlElement};

    pub const THEME_EVENT: &str = "themeChanged";
    const TOGGLE_ID: &str = "themeToggle";

    pub fn apply_theme(theme: Theme) {
        let Some(root) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };

        let classes = root.class_list();
        let _ = classes.remove_1(theme.toggled().as_str());
        let _ = classes.add_1(theme.as_str());
    }

    fn toggle_control() -> Option<HtmlElement> {
        window()?
            .document()?
            .get_element_by_id(TOGGLE_ID)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn sync_toggle_control(theme: Theme) {
        if let Some(control) = toggle_control() {
            let _ = control.set_attribute("aria-pressed", &theme.is_dark().to_string());
            let _ = control.set_attribute("aria-label", &theme.toggle_label());
        }
    }

    fn dispatch_theme_event(theme: Theme) -> Result<(), JsValue> {
        let Some(document) = window().and_then(|w| w.document()) else {
            return Ok(());
        };

        let detail = Object::new();
        Reflect::set(
            &detail,
            &JsValue::from_str("isDark"),
            &JsValue::from_bool(theme.is_dark()),
        )?;
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        let event = CustomEvent::new_with_event_init_dict(THEME_EVENT, &init)?;
        document.dispatch_event(&event)?;
        Ok(())
    }

    pub struct ThemeController {
        state: Rc<ThemeState>,
        motion: Rc<dyn Motion>,
        click: RefCell<Option<EventListener>>,
    }

    impl ThemeController {
        pub fn new(state: Rc<ThemeState>, motion: Rc<dyn Motion>) -> Rc<Self> {
            Rc::new(Self {
                state,
                motion,
                click: RefCell::new(None),
            })
        }

        pub fn init(self: &Rc<Self>) -> Result<(), JsValue> {
            let theme = self.state.current();
            apply_theme(theme);
            sync_toggle_control(theme);

            let Some(control) = toggle_control() else {
                return Ok(());
            };
            let controller = Rc::downgrade(self);
            let listener = EventListener::new(&control, "click", move |_| {
                if let Some(controller) = controller.upgrade() {
                    controller.toggle();
                }
            });
            *self.click.borrow_mut() = Some(listener);
            Ok(())
        }

        pub fn toggle(&self) -> Theme {
            let theme = self.state.flip();
            apply_theme(theme);
            sync_toggle_control(theme);
            if let Some(control) = toggle_control() {
                self.motion
                    .play(&control, &pulse(300, &[1.0, 0.95, 1.05, 1.0]), None);
            }
            if let Err(err) = dispatch_theme_event(theme) {
                log_event(
                    LogLevel::Warn,
                    "theme_event_failed",
                    json!({ "error": format!("{err:?}") }),
                );
            }
            self.state.broadcast();
            theme
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::AppConfig;
        use crate::motion::ImmediateMotion;
        use crate::preferences::PreferenceStore;
        use std::cell::Cell;
        use wasm_bindgen_test::*;

        wasm_bindgen_test_configure!(run_in_browser);

        fn root_classes() -> (bool, bool) {
            let root = window()
                .and_then(|w| w.document())
                .and_then(|d| d.document_element())
                .expect("document element");
            let classes = root.class_list();
            (classes.contains("dark"), classes.contains("light"))
        }

        #[wasm_bindgen_test]
        fn toggling_twice_restores_class_and_preference() {
            let config = AppConfig::default();
            let store = PreferenceStore::in_memory();
            let state = Rc::new(ThemeState::new(store.clone(), &config.theme));
            let controller = ThemeController::new(Rc::clone(&state), Rc::new(ImmediateMotion));
            controller.init().expect("init succeeds");
            assert_eq!(root_classes(), (false, true));

            let seen = Rc::new(Cell::new(0));
            let counter = Rc::clone(&seen);
            state.subscribe(move |_| counter.set(counter.get() + 1));

            assert_eq!(controller.toggle(), Theme::Dark);
            assert_eq!(root_classes(), (true, false));
            assert_eq!(store.get(config.theme.storage_key, None, ""), "true");

            assert_eq!(controller.toggle(), Theme::Light);
            assert_eq!(root_classes(), (false, true));
            assert_eq!(store.get(config.theme.storage_key, None, ""), "false");
            assert_eq!(seen.get(), 2);
        }

        #[wasm_bindgen_test]
        fn toggle_dispatches_theme_changed_with_dark_flag() {
            let config = AppConfig::default();
            let state = Rc::new(ThemeState::new(PreferenceStore::in_memory(), &config.theme));
            let controller = ThemeController::new(Rc::clone(&state), Rc::new(ImmediateMotion));
            controller.init().expect("init succeeds");

            let document = window().and_then(|w| w.document()).expect("document");
            let received = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&received);
            let _listener = EventListener::new(&document, THEME_EVENT, move |event| {
                let is_dark = event
                    .dyn_ref::<CustomEvent>()
                    .map(CustomEvent::detail)
                    .and_then(|detail| Reflect::get(&detail, &JsValue::from_str("isDark")).ok())
                    .and_then(|flag| flag.as_bool());
                sink.borrow_mut().push(is_dark);
            });

            controller.toggle();
            controller.toggle();
            assert_eq!(*received.borrow(), vec![Some(true), Some(false)]);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ThemeController;
