use crate::config::TiltConfig;

const SETTLE_EPSILON: f64 = 0.01;

/// Rotation `(x, y)` in degrees for a pointer at `offset` inside a box of
/// `size`. Pointer above center tilts the card back (negative X rotation
/// flipped), pointer right of center turns it right.
pub fn tilt_angles(offset: (f64, f64), size: (f64, f64), max_degrees: f64) -> (f64, f64) {
    let (center_x, center_y) = (size.0 / 2.0, size.1 / 2.0);
    if center_x <= 0.0 || center_y <= 0.0 {
        return (0.0, 0.0);
    }

    let rotate_x = (offset.1 - center_y) / center_y * -max_degrees;
    let rotate_y = (offset.0 - center_x) / center_x * max_degrees;
    (rotate_x, rotate_y)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltState {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl TiltState {
    pub fn is_flat(&self) -> bool {
        self.rotate_x == 0.0 && self.rotate_y == 0.0
    }

    /// One frame of easing back toward flat. Snaps to zero once both axes
    /// are within a hundredth of a degree.
    pub fn ease_back(&mut self, config: &TiltConfig) {
        self.rotate_x -= self.rotate_x * config.ease_back;
        self.rotate_y -= self.rotate_y * config.ease_back;
        if self.rotate_x.abs() < SETTLE_EPSILON && self.rotate_y.abs() < SETTLE_EPSILON {
            *self = Self::default();
        }
    }

    pub fn transform(&self, config: &TiltConfig) -> String {
        format!(
            "perspective({}px) rotateX({:.3}deg) rotateY({:.3}deg)",
            config.perspective_px, self.rotate_x, self.rotate_y
        )
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{tilt_angles, TiltState};
    use crate::config::TiltConfig;
    use crate::device::DeviceProfile;
    use crate::dom::{document, html_elements};
    use gloo::events::{EventListener, EventListenerOptions};
    use gloo::render::{request_animation_frame, AnimationFrame};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlElement, MouseEvent, TouchEvent};

    const TILT_SELECTOR: &str = ".card-hover";
    const TILT_CLASS: &str = "tilt";
    const TILT_PROPERTIES: [&str; 3] = ["transform", "--tilt-rotate-x", "--tilt-rotate-y"];

    struct TiltCard {
        element: HtmlElement,
        config: TiltConfig,
        state: Cell<TiltState>,
        frame: RefCell<Option<AnimationFrame>>,
    }

    impl TiltCard {
        fn point_at(&self, client_x: f64, client_y: f64) {
            self.frame.borrow_mut().take();
            let rect = self.element.get_bounding_client_rect();
            let (rotate_x, rotate_y) = tilt_angles(
                (client_x - rect.left(), client_y - rect.top()),
                (rect.width(), rect.height()),
                self.config.max_degrees,
            );
            self.state.set(TiltState { rotate_x, rotate_y });
            self.render();
            let _ = self.element.class_list().add_1(TILT_CLASS);
        }

        fn render(&self) {
            let state = self.state.get();
            let style = self.element.style();
            let _ = style.set_property("--tilt-rotate-x", &format!("{:.3}deg", state.rotate_x));
            let _ = style.set_property("--tilt-rotate-y", &format!("{:.3}deg", state.rotate_y));
            let _ = style.set_property("transform", &state.transform(&self.config));
        }

        fn release(self: &Rc<Self>) {
            self.schedule_ease();
        }

        fn schedule_ease(self: &Rc<Self>) {
            let card = Rc::clone(self);
            let handle = request_animation_frame(move |_| card.ease_frame());
            *self.frame.borrow_mut() = Some(handle);
        }

        fn ease_frame(self: &Rc<Self>) {
            self.frame.borrow_mut().take();
            let mut state = self.state.get();
            state.ease_back(&self.config);
            self.state.set(state);

            if state.is_flat() {
                self.clear();
            } else {
                self.render();
                self.schedule_ease();
            }
        }

        /// Drops every inline property tilting added.
        fn clear(&self) {
            let style = self.element.style();
            for property in TILT_PROPERTIES {
                let _ = style.remove_property(property);
            }
            let _ = self.element.class_list().remove_1(TILT_CLASS);
        }
    }

    pub struct TiltBinding {
        cards: Vec<Rc<TiltCard>>,
        listeners: Vec<EventListener>,
    }

    impl TiltBinding {
        /// `None` on coarse-pointer or narrow devices, or when no card exists.
        pub fn attach(config: &TiltConfig, device: &DeviceProfile) -> Option<Self> {
            if !device.pointer_effects_enabled() {
                return None;
            }
            let document = document()?;
            let elements = html_elements(&document, TILT_SELECTOR);
            if elements.is_empty() {
                return None;
            }

            let mut binding = Self {
                cards: Vec::with_capacity(elements.len()),
                listeners: Vec::new(),
            };
            for element in elements {
                let card = Rc::new(TiltCard {
                    element,
                    config: config.clone(),
                    state: Cell::new(TiltState::default()),
                    frame: RefCell::new(None),
                });
                binding.bind_pointer(&card);
                if device.touch_capable {
                    binding.bind_touch(&card);
                }
                binding.cards.push(card);
            }
            Some(binding)
        }

        fn bind_pointer(&mut self, card: &Rc<TiltCard>) {
            let target = card.element.clone();

            let entered = Rc::downgrade(card);
            self.listeners.push(EventListener::new(&target, "mouseenter", move |_| {
                if let Some(card) = entered.upgrade() {
                    let _ = card.element.style().set_property("z-index", "10");
                }
            }));

            let moved = Rc::downgrade(card);
            self.listeners.push(EventListener::new(&target, "mousemove", move |event| {
                let (Some(card), Some(event)) = (moved.upgrade(), event.dyn_ref::<MouseEvent>())
                else {
                    return;
                };
                card.point_at(f64::from(event.client_x()), f64::from(event.client_y()));
            }));

            let left = Rc::downgrade(card);
            self.listeners.push(EventListener::new(&target, "mouseleave", move |_| {
                if let Some(card) = left.upgrade() {
                    let _ = card.element.style().remove_property("z-index");
                    card.release();
                }
            }));
        }

        fn bind_touch(&mut self, card: &Rc<TiltCard>) {
            let target = card.element.clone();

            let started = Rc::downgrade(card);
            self.listeners.push(EventListener::new(&target, "touchstart", move |event| {
                if let (Some(card), Some(event)) = (started.upgrade(), event.dyn_ref::<TouchEvent>()) {
                    follow_touch(&card, event);
                }
            }));

            let moved = Rc::downgrade(card);
            self.listeners.push(EventListener::new_with_options(
                &target,
                "touchmove",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    if let (Some(card), Some(touch_event)) =
                        (moved.upgrade(), event.dyn_ref::<TouchEvent>())
                    {
                        event.prevent_default();
                        follow_touch(&card, touch_event);
                    }
                },
            ));

            let ended = Rc::downgrade(card);
            self.listeners.push(EventListener::new(&target, "touchend", move |_| {
                if let Some(card) = ended.upgrade() {
                    card.release();
                }
            }));
        }

        pub fn card_count(&self) -> usize {
            self.cards.len()
        }

        pub fn detach(&mut self) {
            self.listeners.clear();
            for card in self.cards.drain(..) {
                card.frame.borrow_mut().take();
                card.state.set(TiltState::default());
                card.clear();
                let _ = card.element.style().remove_property("z-index");
            }
        }
    }

    fn follow_touch(card: &TiltCard, event: &TouchEvent) {
        if let Some(touch) = event.touches().get(0) {
            card.point_at(f64::from(touch.client_x()), f64::from(touch.client_y()));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::AppConfig;
        use wasm_bindgen_test::*;
        use web_sys::{MouseEvent, MouseEventInit};

        wasm_bindgen_test_configure!(run_in_browser);

        fn mount_card() -> HtmlElement {
            let document = document().expect("document");
            let card: HtmlElement = document
                .create_element("div")
                .expect("create card")
                .dyn_into()
                .expect("html element");
            card.set_class_name("card-hover");
            card.set_attribute(
                "style",
                "position: fixed; top: 0; left: 0; width: 200px; height: 200px;",
            )
            .expect("style card");
            document.body().expect("body").append_child(&card).expect("append card");
            card
        }

        fn pointer(card: &HtmlElement, kind: &str, x: i32, y: i32) {
            let init = MouseEventInit::new();
            init.set_client_x(x);
            init.set_client_y(y);
            let event = MouseEvent::new_with_mouse_event_init_dict(kind, &init).expect("mouse event");
            card.dispatch_event(&event).expect("dispatch");
        }

        #[wasm_bindgen_test]
        fn detach_leaves_no_tilt_styling_behind() {
            let config = AppConfig::default();
            let device = DeviceProfile::classify((1440.0, 900.0), false, false, 0, 768.0);
            let card = mount_card();
            let mut binding = TiltBinding::attach(&config.tilt, &device).expect("card bound");

            pointer(&card, "mouseenter", 10, 10);
            pointer(&card, "mousemove", 10, 10);
            let style = card.style();
            assert!(card.class_list().contains(TILT_CLASS));
            assert_eq!(style.get_property_value("z-index").expect("z-index"), "10");
            assert!(!style.get_property_value("transform").expect("transform").is_empty());

            binding.detach();
            assert!(!card.class_list().contains(TILT_CLASS));
            for property in TILT_PROPERTIES.into_iter().chain(["z-index"]) {
                let value = style.get_property_value(property).expect(property);
                assert_eq!(value, "", "{property} left set");
            }

            card.remove();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::TiltBinding;
