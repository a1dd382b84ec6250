#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenProperty {
    Opacity,
    TranslateY,
    Scale,
    WidthPercent,
}

impl TweenProperty {
    pub fn key(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::TranslateY => "translateY",
            Self::Scale => "scale",
            Self::WidthPercent => "width",
        }
    }

    /// CSS unit appended to keyframes that are not plain numbers.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::WidthPercent => Some("%"),
            _ => None,
        }
    }
}

/// What happens to a tween when no animation helper is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    ApplyEndState,
    Skip,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub property: TweenProperty,
    pub keyframes: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub tracks: Vec<Track>,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: &'static str,
    pub fallback: Fallback,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EndState {
    pub opacity: Option<f64>,
    pub transform: Option<String>,
    pub width: Option<String>,
}

impl Tween {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            tracks: Vec::new(),
            duration_ms,
            delay_ms: 0,
            easing: "easeOutQuart",
            fallback: Fallback::ApplyEndState,
        }
    }

    pub fn track(mut self, property: TweenProperty, keyframes: &[f64]) -> Self {
        self.tracks.push(Track {
            property,
            keyframes: keyframes.to_vec(),
        });
        self
    }

    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn cosmetic(mut self) -> Self {
        self.fallback = Fallback::Skip;
        self
    }

    fn last(&self, property: TweenProperty) -> Option<f64> {
        self.tracks
            .iter()
            .rev()
            .find(|track| track.property == property)
            .and_then(|track| track.keyframes.last().copied())
    }

    pub fn end_state(&self) -> EndState {
        let mut transforms = Vec::new();
        if let Some(offset) = self.last(TweenProperty::TranslateY) {
            transforms.push(format!("translateY({offset}px)"));
        }
        if let Some(scale) = self.last(TweenProperty::Scale) {
            transforms.push(format!("scale({scale})"));
        }

        EndState {
            opacity: self.last(TweenProperty::Opacity),
            transform: (!transforms.is_empty()).then(|| transforms.join(" ")),
            width: self
                .last(TweenProperty::WidthPercent)
                .map(|width| format!("{width}%")),
        }
    }
}

pub fn fade_in(duration_ms: u32, offset_px: f64) -> Tween {
    Tween::new(duration_ms)
        .track(TweenProperty::Opacity, &[0.0, 1.0])
        .track(TweenProperty::TranslateY, &[offset_px, 0.0])
}

pub fn fade_out(duration_ms: u32) -> Tween {
    Tween::new(duration_ms)
        .track(TweenProperty::Scale, &[1.0, 0.9])
        .track(TweenProperty::Opacity, &[1.0, 0.0])
}

/// Reveals an element left to right by growing its width.
pub fn typewriter(duration_ms: u32) -> Tween {
    Tween::new(duration_ms).track(TweenProperty::WidthPercent, &[0.0, 100.0])
}

pub fn pulse(duration_ms: u32, keyframes: &[f64]) -> Tween {
    Tween::new(duration_ms)
        .track(TweenProperty::Scale, keyframes)
        .cosmetic()
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{EndState, Fallback, Tween};
    use js_sys::{Array, Function, Object, Reflect};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};
    use web_sys::{window, HtmlElement};

    pub type Completion = Box<dyn FnOnce()>;

    /// Transition capability. The page may or may not ship the `anime`
    /// helper; behaviours are written against this trait either way.
    pub trait Motion {
        fn animated(&self) -> bool;
        fn play(&self, target: &HtmlElement, tween: &Tween, on_complete: Option<Completion>);
    }

    pub struct AnimeMotion {
        anime: Function,
    }

    pub struct ImmediateMotion;

    pub fn detect() -> Rc<dyn Motion> {
        let helper = window()
            .and_then(|w| Reflect::get(&w, &JsValue::from_str("anime")).ok())
            .and_then(|value| value.dyn_into::<Function>().ok());

        match helper {
            Some(anime) => Rc::new(AnimeMotion { anime }),
            None => Rc::new(ImmediateMotion),
        }
    }

    pub fn apply_end_state(target: &HtmlElement, end: &EndState) {
        let style = target.style();
        if let Some(opacity) = end.opacity {
            let _ = style.set_property("opacity", &opacity.to_string());
        }
        if let Some(transform) = end.transform.as_deref() {
            let _ = style.set_property("transform", transform);
        }
        if let Some(width) = end.width.as_deref() {
            let _ = style.set_property("width", width);
        }
    }

    fn settle(target: &HtmlElement, tween: &Tween, on_complete: Option<Completion>) {
        if tween.fallback == Fallback::ApplyEndState {
            apply_end_state(target, &tween.end_state());
        }
        if let Some(done) = on_complete {
            done();
        }
    }

    impl Motion for ImmediateMotion {
        fn animated(&self) -> bool {
            false
        }

        fn play(&self, target: &HtmlElement, tween: &Tween, on_complete: Option<Completion>) {
            settle(target, tween, on_complete);
        }
    }

    impl AnimeMotion {
        fn params(&self, target: &HtmlElement, tween: &Tween) -> Result<Object, JsValue> {
            let params = Object::new();
            Reflect::set(&params, &JsValue::from_str("targets"), target)?;
            for track in &tween.tracks {
                let unit = track.property.unit();
                let frame_value = |frame: f64| match unit {
                    Some(unit) => JsValue::from_str(&format!("{frame}{unit}")),
                    None => JsValue::from_f64(frame),
                };
                let value: JsValue = match track.keyframes.as_slice() {
                    [single] => frame_value(*single),
                    frames => frames
                        .iter()
                        .map(|frame| frame_value(*frame))
                        .collect::<Array>()
                        .into(),
                };
                Reflect::set(&params, &JsValue::from_str(track.property.key()), &value)?;
            }
            Reflect::set(
                &params,
                &JsValue::from_str("duration"),
                &JsValue::from_f64(f64::from(tween.duration_ms)),
            )?;
            Reflect::set(
                &params,
                &JsValue::from_str("delay"),
                &JsValue::from_f64(f64::from(tween.delay_ms)),
            )?;
            Reflect::set(
                &params,
                &JsValue::from_str("easing"),
                &JsValue::from_str(tween.easing),
            )?;
            Ok(params)
        }
    }

    impl Motion for AnimeMotion {
        fn animated(&self) -> bool {
            true
        }

        fn play(&self, target: &HtmlElement, tween: &Tween, on_complete: Option<Completion>) {
            let pending = Rc::new(RefCell::new(on_complete));

            let started = self.params(target, tween).and_then(|params| {
                if pending.borrow().is_some() {
                    let slot = Rc::clone(&pending);
                    let complete = Closure::once_into_js(move |_animation: JsValue| {
                        if let Some(done) = slot.borrow_mut().take() {
                            done();
                        }
                    });
                    Reflect::set(&params, &JsValue::from_str("complete"), &complete)?;
                }
                self.anime.call1(&JsValue::NULL, &params)
            });

            if started.is_err() {
                let done = pending.borrow_mut().take();
                settle(target, tween, done);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{detect, ImmediateMotion, Motion};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_settles_visible_and_in_place() {
        let end = fade_in(600, 30.0).end_state();

        assert_eq!(end.opacity, Some(1.0));
        assert_eq!(end.transform.as_deref(), Some("translateY(0px)"));
    }

    #[test]
    fn combined_transform_lists_translate_before_scale() {
        let tween = Tween::new(300)
            .track(TweenProperty::Scale, &[0.9, 1.0])
            .track(TweenProperty::TranslateY, &[10.0, -4.0]);

        assert_eq!(
            tween.end_state().transform.as_deref(),
            Some("translateY(-4px) scale(1)")
        );
    }

    #[test]
    fn pulse_is_skipped_without_helper() {
        let tween = pulse(300, &[1.0, 0.95, 1.05, 1.0]);

        assert_eq!(tween.fallback, Fallback::Skip);
        assert_eq!(tween.end_state().opacity, None);
    }

    #[test]
    fn typewriter_ends_at_full_width() {
        let tween = typewriter(3000);
        let end = tween.end_state();

        assert_eq!(end.width.as_deref(), Some("100%"));
        assert_eq!(end.transform, None);
        assert_eq!(tween.tracks[0].property.unit(), Some("%"));
    }

    #[test]
    fn fade_out_ends_transparent() {
        let end = fade_out(300).end_state();

        assert_eq!(end.opacity, Some(0.0));
        assert_eq!(end.transform.as_deref(), Some("scale(0.9)"));
    }
}
