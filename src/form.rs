use crate::language::Language;

/// Localized strings shown while a contact message is "sent".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormCopy {
    pub sending: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub close: &'static str,
}

impl FormCopy {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::German => Self {
                sending: "Wird gesendet...",
                title: "Nachricht gesendet!",
                body: "Vielen Dank für Ihre Nachricht. Ich werde mich bald bei Ihnen melden.",
                close: "Schließen",
            },
            Language::English => Self {
                sending: "Sending...",
                title: "Message sent!",
                body: "Thank you for your message. I will get back to you soon.",
                close: "Close",
            },
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::FormCopy;
    use crate::config::FormConfig;
    use crate::dom::document;
    use crate::language::LanguageState;
    use crate::logging::{log_event, LogLevel};
    use crate::motion::{fade_out, pulse, Motion, Tween, TweenProperty};
    use gloo::events::{EventListener, EventListenerOptions};
    use gloo::timers::future::TimeoutFuture;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement};

    const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;
    const OVERLAY_CLASS: &str = "success-overlay";
    const BACKDROP_CLASSES: &str =
        "fixed inset-0 z-50 flex items-center justify-center bg-black bg-opacity-50";
    const CARD_CLASSES: &str =
        "success-card bg-white dark:bg-gray-800 rounded-xl p-8 max-w-md mx-4 text-center";
    const OVERLAY_IN_MS: u32 = 400;
    const OVERLAY_OUT_MS: u32 = 300;

    fn overlay_in() -> Tween {
        Tween::new(OVERLAY_IN_MS)
            .track(TweenProperty::Scale, &[0.9, 1.0])
            .track(TweenProperty::Opacity, &[0.0, 1.0])
    }

    fn child(
        document: &Document,
        parent: &Element,
        tag: &str,
        class: &str,
        text: &str,
    ) -> Result<Element, JsValue> {
        let element = document.create_element(tag)?;
        element.set_class_name(class);
        element.set_text_content(Some(text));
        parent.append_child(&element)?;
        Ok(element)
    }

    /// Close listener of the overlay currently on screen.
    type OverlaySlot = Rc<RefCell<Option<EventListener>>>;

    fn show_overlay(
        copy: FormCopy,
        motion: Rc<dyn Motion>,
        slot: &OverlaySlot,
    ) -> Result<(), JsValue> {
        let Some(document) = document() else {
            return Ok(());
        };
        let Some(body) = document.body() else {
            return Ok(());
        };
        if let Some(stale) = document.query_selector(&format!(".{OVERLAY_CLASS}"))? {
            stale.remove();
        }
        slot.borrow_mut().take();

        let overlay = document.create_element("div")?;
        overlay.set_class_name(BACKDROP_CLASSES);
        overlay.class_list().add_1(OVERLAY_CLASS)?;
        let card: HtmlElement = document.create_element("div")?.dyn_into()?;
        card.set_class_name(CARD_CLASSES);
        overlay.append_child(&card)?;
        child(&document, &card, "div", "text-6xl mb-4", "\u{2705}")?;
        child(&document, &card, "h3", "text-2xl font-bold mb-4 gradient-text", copy.title)?;
        child(&document, &card, "p", "text-gray-600 dark:text-gray-300 mb-6", copy.body)?;
        child(
            &document,
            &card,
            "button",
            "btn-gradient px-6 py-2 rounded-lg text-white font-semibold",
            copy.close,
        )?;
        body.append_child(&overlay)?;
        motion.play(&card, &overlay_in(), None);

        let closing = Cell::new(false);
        let backdrop = overlay.clone();
        let owner: Weak<RefCell<Option<EventListener>>> = Rc::downgrade(slot);
        let listener = EventListener::new(&overlay, "click", move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let on_backdrop = target == backdrop;
            if !(on_backdrop || target.tag_name() == "BUTTON") || closing.replace(true) {
                return;
            }
            let (doomed, owner) = (backdrop.clone(), owner.clone());
            motion.play(
                &card,
                &fade_out(OVERLAY_OUT_MS),
                Some(Box::new(move || {
                    doomed.remove();
                    if let Some(slot) = owner.upgrade() {
                        slot.borrow_mut().take();
                    }
                })),
            );
        });
        *slot.borrow_mut() = Some(listener);
        Ok(())
    }

    /// Simulated contact submission: nothing leaves the browser.
    pub struct FormController {
        config: FormConfig,
        language: Rc<LanguageState>,
        motion: Rc<dyn Motion>,
        submit: Option<EventListener>,
        overlay: OverlaySlot,
    }

    impl FormController {
        pub fn new(config: FormConfig, language: Rc<LanguageState>, motion: Rc<dyn Motion>) -> Self {
            Self {
                config,
                language,
                motion,
                submit: None,
                overlay: Rc::new(RefCell::new(None)),
            }
        }

        pub fn init(&mut self) -> Result<(), JsValue> {
            let Some(form) = document()
                .and_then(|d| d.query_selector("form").ok().flatten())
                .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
            else {
                return Ok(());
            };

            let (config, language, motion, overlay) = (
                self.config.clone(),
                Rc::clone(&self.language),
                Rc::clone(&self.motion),
                Rc::clone(&self.overlay),
            );
            let target = form.clone();
            self.submit = Some(EventListener::new_with_options(
                &form,
                "submit",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.prevent_default();
                    submit(&target, &config, &language, &motion, &overlay);
                },
            ));
            Ok(())
        }
    }

    fn submit(
        form: &HtmlFormElement,
        config: &FormConfig,
        language: &LanguageState,
        motion: &Rc<dyn Motion>,
        overlay: &OverlaySlot,
    ) {
        let Some(button) = form
            .query_selector(SUBMIT_SELECTOR)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        else {
            return;
        };
        if button.disabled() {
            return;
        }

        let copy = FormCopy::for_language(language.current());
        let original = button.text_content().unwrap_or_default();
        button.set_text_content(Some(copy.sending));
        button.set_disabled(true);

        let (form, pressed, motion_after, delay_ms) =
            (form.clone(), button.clone(), Rc::clone(motion), config.submit_delay_ms);
        let overlay = Rc::clone(overlay);
        let finish = move || {
            wasm_bindgen_futures::spawn_local(async move {
                TimeoutFuture::new(delay_ms).await;
                if let Err(err) = show_overlay(copy, motion_after, &overlay) {
                    log_event(
                        LogLevel::Error,
                        "form_overlay_failed",
                        json!({ "error": format!("{err:?}") }),
                    );
                }
                form.reset();
                pressed.set_text_content(Some(&original));
                pressed.set_disabled(false);
            });
        };
        motion.play(
            &button,
            &pulse(config.press_duration_ms, &[1.0, 0.95, 1.0]),
            Some(Box::new(finish)),
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::AppConfig;
        use crate::motion::ImmediateMotion;
        use crate::preferences::PreferenceStore;
        use wasm_bindgen_test::*;
        use web_sys::HtmlInputElement;

        wasm_bindgen_test_configure!(run_in_browser);

        #[wasm_bindgen_test]
        async fn submission_shows_overlay_and_clears_fields() {
            let document = document().expect("document");
            let root = document.create_element("div").expect("create root");
            root.set_inner_html(
                r#"<form id="fc-form">
                     <input id="fc-name" name="name">
                     <button type="submit">Senden</button>
                   </form>"#,
            );
            document.body().expect("body").append_child(&root).expect("append root");

            let mut config = AppConfig::default();
            config.form.submit_delay_ms = 20;
            let language = Rc::new(LanguageState::new(
                PreferenceStore::in_memory(),
                &config.language,
            ));
            let mut controller =
                FormController::new(config.form, language, Rc::new(ImmediateMotion));
            controller.init().expect("init succeeds");

            let input: HtmlInputElement = document
                .get_element_by_id("fc-name")
                .expect("input")
                .dyn_into()
                .expect("input element");
            input.set_value("Ada");
            let form: HtmlFormElement = document
                .get_element_by_id("fc-form")
                .expect("form")
                .dyn_into()
                .expect("form element");
            form.request_submit().expect("submit dispatched");

            let button: HtmlButtonElement = form
                .query_selector(SUBMIT_SELECTOR)
                .expect("query")
                .expect("button")
                .dyn_into()
                .expect("button element");
            assert!(button.disabled());
            assert_eq!(button.text_content().as_deref(), Some("Wird gesendet..."));

            TimeoutFuture::new(80).await;

            let overlay = document
                .query_selector(&format!(".{OVERLAY_CLASS}"))
                .expect("query")
                .expect("overlay shown");
            assert!(overlay
                .text_content()
                .unwrap_or_default()
                .contains("Nachricht gesendet!"));
            assert_eq!(input.value(), "");
            assert!(!button.disabled());
            assert_eq!(button.text_content().as_deref(), Some("Senden"));
            assert!(controller.overlay.borrow().is_some());

            let close: HtmlElement = overlay
                .query_selector("button")
                .expect("query")
                .expect("close button")
                .dyn_into()
                .expect("html element");
            close.click();
            assert!(document
                .query_selector(&format!(".{OVERLAY_CLASS}"))
                .expect("query")
                .is_none());
            assert!(controller.overlay.borrow().is_none());

            root.remove();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::FormController;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_follows_current_language() {
        let german = FormCopy::for_language(Language::German);
        let english = FormCopy::for_language(Language::English);

        assert_eq!(german.sending, "Wird gesendet...");
        assert_eq!(german.close, "Schließen");
        assert_eq!(english.title, "Message sent!");
        assert_eq!(english.close, "Close");
    }

    #[test]
    fn every_language_has_complete_copy() {
        for language in crate::language::SUPPORTED_LANGUAGES {
            let copy = FormCopy::for_language(language);
            assert!(!copy.sending.is_empty());
            assert!(!copy.title.is_empty());
            assert!(!copy.body.is_empty());
            assert!(!copy.close.is_empty());
        }
    }
}
