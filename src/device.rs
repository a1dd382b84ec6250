/// Capability snapshot taken once at startup and shared by every behaviour
/// that branches on touch or viewport width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceProfile {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub narrow: bool,
    pub touch_primary: bool,
    pub touch_capable: bool,
}

impl DeviceProfile {
    pub fn classify(
        viewport: (f64, f64),
        hover_none: bool,
        touch_events: bool,
        max_touch_points: i32,
        narrow_breakpoint: f64,
    ) -> Self {
        Self {
            viewport_width: viewport.0,
            viewport_height: viewport.1,
            narrow: viewport.0 < narrow_breakpoint,
            touch_primary: hover_none,
            touch_capable: touch_events || max_touch_points > 0,
        }
    }

    /// Glow, tilt and hover scaling only run with a precise pointer on a wide viewport.
    pub fn pointer_effects_enabled(&self) -> bool {
        !self.narrow && !self.touch_primary
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::DeviceProfile;
    use crate::config::DeviceConfig;
    use js_sys::Reflect;
    use wasm_bindgen::JsValue;
    use web_sys::window;

    pub fn viewport_size() -> (f64, f64) {
        let Some(win) = window() else {
            return (1280.0, 720.0);
        };

        let width = win
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(1280.0);
        let height = win
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(720.0);

        (width, height)
    }

    fn media_matches(query: &str) -> bool {
        window()
            .and_then(|w| w.match_media(query).ok().flatten())
            .map(|mq| mq.matches())
            .unwrap_or(false)
    }

    pub fn detect(config: &DeviceConfig) -> DeviceProfile {
        let touch_events = window()
            .map(|w| Reflect::has(&w, &JsValue::from_str("ontouchstart")).unwrap_or(false))
            .unwrap_or(false);
        let max_touch_points = window()
            .map(|w| w.navigator().max_touch_points())
            .unwrap_or(0);

        DeviceProfile::classify(
            viewport_size(),
            media_matches("(hover: none)"),
            touch_events,
            max_touch_points,
            config.narrow_breakpoint,
        )
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{detect, viewport_size};
