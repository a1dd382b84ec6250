use crate::config::NavigationConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavChange {
    Hide,
    Show,
}

/// Scroll-driven visibility of the floating navigation bar.
#[derive(Clone, Debug)]
pub struct NavState {
    last_scroll_y: f64,
    visible: bool,
    threshold: f64,
}

impl NavState {
    pub fn new(initial_scroll_y: f64, config: &NavigationConfig) -> Self {
        Self {
            last_scroll_y: initial_scroll_y,
            visible: true,
            threshold: config.hide_threshold,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Feeds one scroll position. Returns a change only when visibility
    /// actually flips, so repeated scrolling in one direction is silent.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<NavChange> {
        let moving_down = scroll_y > self.last_scroll_y && scroll_y > self.threshold;
        self.last_scroll_y = scroll_y;

        match (moving_down, self.visible) {
            (true, true) => {
                self.visible = false;
                Some(NavChange::Hide)
            }
            (false, false) => {
                self.visible = true;
                Some(NavChange::Show)
            }
            _ => None,
        }
    }
}

impl NavChange {
    pub fn transform(self, config: &NavigationConfig) -> String {
        match self {
            Self::Hide => format!("translateX(-50%) translateY(-{}px)", config.hidden_offset_px),
            Self::Show => "translateX(-50%) translateY(0)".to_string(),
        }
    }

    pub fn opacity(self) -> &'static str {
        match self {
            Self::Hide => "0",
            Self::Show => "1",
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::NavState;
    use crate::config::NavigationConfig;
    use crate::dom::{document, query_all, query_html};
    use crate::interaction::smooth_scroll_to;
    use gloo::events::{EventListener, EventListenerOptions};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsValue;
    use web_sys::{window, HtmlElement};

    const NAV_SELECTOR: &str = ".floating-nav";
    const LINK_SELECTOR: &str = ".nav-link";

    pub struct NavigationController {
        config: NavigationConfig,
        listeners: Vec<EventListener>,
    }

    impl NavigationController {
        pub fn new(config: NavigationConfig) -> Self {
            Self {
                config,
                listeners: Vec::new(),
            }
        }

        pub fn init(&mut self) -> Result<(), JsValue> {
            if let Some(nav) = query_html(NAV_SELECTOR) {
                self.bind_auto_hide(nav)?;
            }
            self.bind_links();
            Ok(())
        }

        fn bind_auto_hide(&mut self, nav: HtmlElement) -> Result<(), JsValue> {
            let Some(window) = window() else {
                return Ok(());
            };
            let seconds = f64::from(self.config.transition_ms) / 1000.0;
            nav.style().set_property(
                "transition",
                &format!("transform {seconds}s ease-out, opacity {seconds}s ease-out"),
            )?;

            let state = Rc::new(RefCell::new(NavState::new(
                window.scroll_y().unwrap_or(0.0),
                &self.config,
            )));
            let config = self.config.clone();
            let source = window.clone();
            self.listeners.push(EventListener::new(&window, "scroll", move |_| {
                let scroll_y = source.scroll_y().unwrap_or(0.0);
                let Some(change) = state.borrow_mut().on_scroll(scroll_y) else {
                    return;
                };
                let style = nav.style();
                let _ = style.set_property("transform", &change.transform(&config));
                let _ = style.set_property("opacity", change.opacity());
            }));
            Ok(())
        }

        fn bind_links(&mut self) {
            let Some(document) = document() else {
                return;
            };
            for link in query_all(&document, LINK_SELECTOR) {
                let source = link.clone();
                self.listeners.push(EventListener::new_with_options(
                    &link,
                    "click",
                    EventListenerOptions::enable_prevent_default(),
                    move |event| {
                        event.prevent_default();
                        if let Some(target) = source.get_attribute("href") {
                            smooth_scroll_to(&target);
                        }
                    },
                ));
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::NavigationController;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn state() -> NavState {
        NavState::new(0.0, &AppConfig::default().navigation)
    }

    #[test]
    fn scrolling_down_past_threshold_hides_once() {
        let mut nav = state();

        assert_eq!(nav.on_scroll(50.0), None);
        assert_eq!(nav.on_scroll(150.0), Some(NavChange::Hide));
        assert_eq!(nav.on_scroll(300.0), None);
        assert_eq!(nav.on_scroll(450.0), None);
        assert!(!nav.is_visible());
    }

    #[test]
    fn scrolling_up_shows_once() {
        let mut nav = state();
        nav.on_scroll(400.0);

        assert_eq!(nav.on_scroll(350.0), Some(NavChange::Show));
        assert_eq!(nav.on_scroll(200.0), None);
        assert_eq!(nav.on_scroll(20.0), None);
        assert!(nav.is_visible());
    }

    #[test]
    fn toggles_at_most_once_per_direction_change() {
        let mut nav = state();
        let positions = [120.0, 200.0, 180.0, 170.0, 260.0, 400.0, 390.0, 500.0];

        let changes: Vec<_> = positions.iter().filter_map(|y| nav.on_scroll(*y)).collect();

        assert_eq!(
            changes,
            vec![
                NavChange::Hide,
                NavChange::Show,
                NavChange::Hide,
                NavChange::Show,
                NavChange::Hide,
            ]
        );
        assert!(changes.windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn hidden_transform_uses_configured_offset() {
        let config = AppConfig::default().navigation;

        assert_eq!(
            NavChange::Hide.transform(&config),
            "translateX(-50%) translateY(-100px)"
        );
        assert_eq!(NavChange::Show.transform(&config), "translateX(-50%) translateY(0)");
        assert_eq!(NavChange::Hide.opacity(), "0");
    }
}
