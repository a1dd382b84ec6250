use std::cell::Cell;
use std::fmt;

use crate::config::LanguageConfig;
use crate::logging::{log_event, LogLevel};
use crate::preferences::{PreferenceStore, PreferenceValue};
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    German,
    English,
}

pub const SUPPORTED_LANGUAGES: [Language; 2] = [Language::German, Language::English];

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::German => "de",
            Self::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        SUPPORTED_LANGUAGES
            .into_iter()
            .find(|language| language.code() == code)
    }

    /// Attribute holding an element's text in this language, e.g. `data-en`.
    pub fn text_attribute(self) -> String {
        format!("data-{}", self.code())
    }

    pub fn placeholder_attribute(self) -> String {
        format!("data-{}-placeholder", self.code())
    }
}

impl PreferenceValue for Language {
    fn decode(raw: &str) -> Option<Self> {
        Self::from_code(raw)
    }

    fn encode(self) -> &'static str {
        self.code()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "language '{}' not supported", self.0)
    }
}

impl std::error::Error for UnsupportedLanguage {}

pub struct LanguageState {
    current: Cell<Language>,
    store: PreferenceStore,
    storage_key: &'static str,
}

impl LanguageState {
    pub fn new(store: PreferenceStore, config: &LanguageConfig) -> Self {
        let current = store.load(config.storage_key, config.default);
        Self {
            current: Cell::new(current),
            store,
            storage_key: config.storage_key,
        }
    }

    pub fn current(&self) -> Language {
        self.current.get()
    }

    pub fn switch_to(&self, code: &str) -> Result<Language, UnsupportedLanguage> {
        let Some(language) = Language::from_code(code) else {
            log_event(
                LogLevel::Warn,
                "language_unsupported",
                json!({ "requested": code, "current": self.current().code() }),
            );
            return Err(UnsupportedLanguage(code.to_string()));
        };

        self.current.set(language);
        self.store.save(self.storage_key, language);
        Ok(language)
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{Language, LanguageState};
    use crate::dom::{document, query_all};
    use crate::motion::{pulse, Motion};
    use gloo::events::EventListener;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, Element, HtmlElement};

    const SWITCH_SELECTOR: &str = ".language-btn";
    const ACTIVE_CLASS: &str = "active";

    pub fn refresh_text(document: &Document, language: Language) {
        let text_attribute = language.text_attribute();
        for element in query_all(document, &format!("[{text_attribute}]")) {
            if let Some(text) = element
                .get_attribute(&text_attribute)
                .filter(|text| !text.is_empty())
            {
                element.set_text_content(Some(&text));
            }
        }

        let placeholder_attribute = language.placeholder_attribute();
        for element in query_all(document, &format!("[{placeholder_attribute}]")) {
            if let Some(placeholder) = element
                .get_attribute(&placeholder_attribute)
                .filter(|text| !text.is_empty())
            {
                let _ = element.set_attribute("placeholder", &placeholder);
            }
        }
    }

    fn refresh_switches(document: &Document, language: Language) {
        for button in query_all(document, SWITCH_SELECTOR) {
            let classes = button.class_list();
            let _ = classes.remove_1(ACTIVE_CLASS);
            if button.get_attribute("data-lang").as_deref() == Some(language.code()) {
                let _ = classes.add_1(ACTIVE_CLASS);
            }
        }
    }

    pub struct LanguageController {
        state: Rc<LanguageState>,
        motion: Rc<dyn Motion>,
        listeners: RefCell<Vec<EventListener>>,
    }

    impl LanguageController {
        pub fn new(state: Rc<LanguageState>, motion: Rc<dyn Motion>) -> Rc<Self> {
            Rc::new(Self {
                state,
                motion,
                listeners: RefCell::new(Vec::new()),
            })
        }

        pub fn state(&self) -> Rc<LanguageState> {
            Rc::clone(&self.state)
        }

        pub fn init(self: &Rc<Self>) -> Result<(), JsValue> {
            let Some(document) = document() else {
                return Ok(());
            };
            let current = self.state.current();
            refresh_text(&document, current);
            refresh_switches(&document, current);

            let mut listeners = self.listeners.borrow_mut();
            for button in query_all(&document, SWITCH_SELECTOR) {
                let controller = Rc::downgrade(self);
                let target = button.clone();
                listeners.push(EventListener::new(&button, "click", move |_| {
                    let Some(controller) = controller.upgrade() else {
                        return;
                    };
                    if let Some(code) = target.get_attribute("data-lang") {
                        controller.switch_to(&code);
                    }
                    if let Some(element) = target.dyn_ref::<HtmlElement>() {
                        controller
                            .motion
                            .play(element, &pulse(300, &[1.0, 1.1, 1.0]), None);
                    }
                }));
            }
            Ok(())
        }

        /// Unsupported codes are logged by the state and leave the page untouched.
        pub fn switch_to(&self, code: &str) {
            let Ok(language) = self.state.switch_to(code) else {
                return;
            };
            if let Some(document) = document() {
                refresh_text(&document, language);
                refresh_switches(&document, language);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::AppConfig;
        use crate::motion::ImmediateMotion;
        use crate::preferences::PreferenceStore;
        use wasm_bindgen_test::*;

        wasm_bindgen_test_configure!(run_in_browser);

        fn mount(markup: &str) -> Element {
            let document = document().expect("document");
            let root = document.create_element("div").expect("create root");
            root.set_inner_html(markup);
            document
                .body()
                .expect("body")
                .append_child(&root)
                .expect("append root");
            root
        }

        #[wasm_bindgen_test]
        fn switching_rewrites_tagged_text_and_placeholders() {
            let root = mount(
                r#"<p id="lt-greeting" data-de="Hallo" data-en="Hello">Hallo</p>
                   <p id="lt-untagged" data-de="Nur Deutsch">Nur Deutsch</p>
                   <input id="lt-name" data-de-placeholder="Name eingeben" data-en-placeholder="Your name">
                   <button class="language-btn" data-lang="de"></button>
                   <button class="language-btn" data-lang="en"></button>"#,
            );
            let config = AppConfig::default();
            let state = Rc::new(LanguageState::new(PreferenceStore::in_memory(), &config.language));
            let controller = LanguageController::new(state, Rc::new(ImmediateMotion));
            controller.init().expect("init succeeds");

            controller.switch_to("en");
            controller.switch_to("en");
            let document = document().expect("document");
            let text = |id: &str| {
                document
                    .get_element_by_id(id)
                    .and_then(|element| element.text_content())
                    .unwrap_or_default()
            };
            assert_eq!(text("lt-greeting"), "Hello");
            assert_eq!(text("lt-untagged"), "Nur Deutsch");
            assert_eq!(
                document
                    .get_element_by_id("lt-name")
                    .and_then(|element| element.get_attribute("placeholder"))
                    .as_deref(),
                Some("Your name")
            );
            let active: Vec<_> = query_all(&document, ".language-btn.active")
                .into_iter()
                .filter_map(|button| button.get_attribute("data-lang"))
                .collect();
            assert!(active.iter().all(|code| code == "en"));

            controller.switch_to("fr");
            assert_eq!(controller.state().current(), Language::English);
            assert_eq!(text("lt-greeting"), "Hello");
            root.remove();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LanguageController;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::preferences::{MemoryStorage, StorageBackend};
    use std::rc::Rc;

    fn state_with(raw: Option<&str>) -> (LanguageState, PreferenceStore) {
        let config = AppConfig::default();
        let backend: Rc<dyn StorageBackend> = match raw {
            Some(value) => Rc::new(MemoryStorage::with_entry(config.language.storage_key, value)),
            None => Rc::new(MemoryStorage::default()),
        };
        let store = PreferenceStore::new(backend);
        (LanguageState::new(store.clone(), &config.language), store)
    }

    #[test]
    fn attribute_names_follow_locale_code() {
        assert_eq!(Language::English.text_attribute(), "data-en");
        assert_eq!(Language::German.placeholder_attribute(), "data-de-placeholder");
    }

    #[test]
    fn stored_supported_language_is_restored() {
        let (state, _) = state_with(Some("en"));
        assert_eq!(state.current(), Language::English);
    }

    #[test]
    fn stored_unsupported_language_is_rejected_at_read() {
        let (state, _) = state_with(Some("fr"));
        assert_eq!(state.current(), Language::German);
    }

    #[test]
    fn switch_persists_and_repeats_idempotently() {
        let (state, store) = state_with(None);

        assert_eq!(state.switch_to("en"), Ok(Language::English));
        assert_eq!(state.switch_to("en"), Ok(Language::English));
        assert_eq!(store.get("language", Some(&["de", "en"]), "de"), "en");
    }

    #[test]
    fn unsupported_switch_keeps_previous_state() {
        let (state, store) = state_with(Some("en"));

        let err = state.switch_to("fr").expect_err("fr is not supported");
        assert_eq!(err.to_string(), "language 'fr' not supported");
        assert_eq!(state.current(), Language::English);
        assert_eq!(store.get("language", None, ""), "en");
    }
}
