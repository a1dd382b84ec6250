/// Words on a hero button that send the visitor to the tools section,
/// in either language. Anything else scrolls to the footer.
const TOOLS_KEYWORDS: [&str; 2] = ["tools", "erkunden"];
const TOOLS_SECTION: &str = "#tools";
const FALLBACK_SECTION: &str = "#footer";

pub fn hero_target(label: &str) -> &'static str {
    let label = label.to_lowercase();
    if TOOLS_KEYWORDS.iter().any(|keyword| label.contains(keyword)) {
        TOOLS_SECTION
    } else {
        FALLBACK_SECTION
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

/// Square ripple covering the button's longest side, centered on the click.
pub fn ripple_geometry(
    button_origin: (f64, f64),
    button_size: (f64, f64),
    click: (f64, f64),
) -> RippleGeometry {
    let size = button_size.0.max(button_size.1);
    RippleGeometry {
        size,
        left: click.0 - button_origin.0 - size / 2.0,
        top: click.1 - button_origin.1 - size / 2.0,
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{hero_target, ripple_geometry};
    use crate::config::InteractionConfig;
    use crate::device::DeviceProfile;
    use crate::dom::{document, html_elements};
    use crate::motion::{Motion, Tween, TweenProperty};
    use gloo::events::EventListener;
    use gloo::timers::callback::Timeout;
    use std::rc::Rc;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{
        Document, HtmlElement, MouseEvent, ScrollBehavior, ScrollIntoViewOptions,
        ScrollLogicalPosition,
    };

    const BUTTON_SELECTOR: &str = ".btn-gradient";
    const HERO_BUTTON_SELECTOR: &str = ".hero-content button";
    const RIPPLE_STYLE_ID: &str = "ripple-style";
    const RIPPLE_CSS: &str = "
.ripple {
  position: absolute;
  border-radius: 50%;
  background: rgba(255, 255, 255, 0.6);
  transform: scale(0);
  animation: ripple-animation 0.6s linear;
  pointer-events: none;
}
@keyframes ripple-animation {
  to {
    transform: scale(4);
    opacity: 0;
  }
}
";

    pub fn smooth_scroll_to(selector: &str) {
        let Some(target) = document().and_then(|d| d.query_selector(selector).ok().flatten())
        else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn ensure_ripple_style(document: &Document) -> Result<(), JsValue> {
        if document.get_element_by_id(RIPPLE_STYLE_ID).is_some() {
            return Ok(());
        }
        let Some(head) = document.head() else {
            return Ok(());
        };
        let style = document.create_element("style")?;
        style.set_id(RIPPLE_STYLE_ID);
        style.set_text_content(Some(RIPPLE_CSS));
        head.append_child(&style)?;
        Ok(())
    }

    fn spawn_ripple(
        document: &Document,
        button: &HtmlElement,
        event: &MouseEvent,
        lifetime_ms: u32,
    ) -> Result<(), JsValue> {
        let rect = button.get_bounding_client_rect();
        let geometry = ripple_geometry(
            (rect.left(), rect.top()),
            (rect.width(), rect.height()),
            (f64::from(event.client_x()), f64::from(event.client_y())),
        );

        let ripple: HtmlElement = document.create_element("span")?.dyn_into()?;
        let style = ripple.style();
        style.set_property("width", &format!("{}px", geometry.size))?;
        style.set_property("height", &format!("{}px", geometry.size))?;
        style.set_property("left", &format!("{}px", geometry.left))?;
        style.set_property("top", &format!("{}px", geometry.top))?;
        ripple.class_list().add_1("ripple")?;

        let button_style = button.style();
        button_style.set_property("position", "relative")?;
        button_style.set_property("overflow", "hidden")?;
        button.append_child(&ripple)?;

        Timeout::new(lifetime_ms, move || ripple.remove()).forget();
        Ok(())
    }

    pub struct InteractionController {
        config: InteractionConfig,
        device: DeviceProfile,
        motion: Rc<dyn Motion>,
        listeners: Vec<EventListener>,
    }

    impl InteractionController {
        pub fn new(config: InteractionConfig, device: DeviceProfile, motion: Rc<dyn Motion>) -> Self {
            Self {
                config,
                device,
                motion,
                listeners: Vec::new(),
            }
        }

        pub fn init(&mut self) -> Result<(), JsValue> {
            let Some(document) = document() else {
                return Ok(());
            };
            ensure_ripple_style(&document)?;

            if self.device.pointer_effects_enabled() {
                self.bind_hovers(&document);
            }
            self.bind_ripples(&document);
            self.bind_hero_buttons(&document);
            Ok(())
        }

        fn hover_tween(&self, scale: f64) -> Tween {
            Tween::new(self.config.hover_duration_ms)
                .track(TweenProperty::Scale, &[scale])
                .cosmetic()
        }

        fn bind_hovers(&mut self, document: &Document) {
            for button in html_elements(document, BUTTON_SELECTOR) {
                let (motion, target, tween) =
                    (Rc::clone(&self.motion), button.clone(), self.hover_tween(self.config.hover_scale));
                self.listeners.push(EventListener::new(&button, "mouseenter", move |_| {
                    motion.play(&target, &tween, None);
                }));

                let (motion, target, tween) =
                    (Rc::clone(&self.motion), button.clone(), self.hover_tween(1.0));
                self.listeners.push(EventListener::new(&button, "mouseleave", move |_| {
                    motion.play(&target, &tween, None);
                }));
            }
        }

        fn bind_ripples(&mut self, document: &Document) {
            for button in html_elements(document, BUTTON_SELECTOR) {
                let target = button.clone();
                let owner = document.clone();
                let lifetime_ms = self.config.ripple_lifetime_ms;
                self.listeners.push(EventListener::new(&button, "click", move |event| {
                    if let Some(event) = event.dyn_ref::<MouseEvent>() {
                        let _ = spawn_ripple(&owner, &target, event, lifetime_ms);
                    }
                }));
            }
        }

        fn bind_hero_buttons(&mut self, document: &Document) {
            for button in html_elements(document, HERO_BUTTON_SELECTOR) {
                let label_source = button.clone();
                self.listeners.push(EventListener::new(&button, "click", move |_| {
                    let label = label_source.text_content().unwrap_or_default();
                    smooth_scroll_to(hero_target(&label));
                }));
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{smooth_scroll_to, InteractionController};
