use std::collections::HashSet;

/// Remembers which observed elements have already been revealed so a
/// transition never runs twice for the same element.
#[derive(Debug, Default)]
pub struct RevealTracker {
    revealed: HashSet<u32>,
}

impl RevealTracker {
    /// Returns `true` only the first time `id` crosses into view.
    pub fn reveal(&mut self, id: u32) -> bool {
        self.revealed.insert(id)
    }

    pub fn count(&self) -> usize {
        self.revealed.len()
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::RevealTracker;
    use crate::config::RevealConfig;
    use crate::dom::{query_all, query_html};
    use crate::motion::{fade_in, typewriter, Motion};
    use gloo::timers::callback::Timeout;
    use js_sys::Array;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};
    use web_sys::{
        window, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
        IntersectionObserverInit,
    };

    const REVEAL_SELECTOR: &str = ".reveal-on-scroll, .card-hover";
    const HERO_SELECTOR: &str = ".hero-content";
    const TYPEWRITER_SELECTOR: &str = ".typewriter";
    const REVEAL_ID_ATTRIBUTE: &str = "data-reveal-id";
    const REVEALED_CLASS: &str = "revealed";

    type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

    pub struct RevealWatcher {
        observer: IntersectionObserver,
        _callback: EntriesCallback,
        tracker: Rc<RefCell<RevealTracker>>,
    }

    impl RevealWatcher {
        /// Returns `None` when the page has nothing left to reveal. Elements
        /// revealed by an earlier watcher keep their `revealed` class and are
        /// not observed again.
        pub fn observe(config: &RevealConfig, motion: Rc<dyn Motion>) -> Result<Option<Self>, JsValue> {
            let Some(document) = window().and_then(|w| w.document()) else {
                return Ok(None);
            };
            let targets: Vec<_> = query_all(&document, REVEAL_SELECTOR)
                .into_iter()
                .filter(|target| !target.class_list().contains(REVEALED_CLASS))
                .collect();
            if targets.is_empty() {
                return Ok(None);
            }

            let tracker = Rc::new(RefCell::new(RevealTracker::default()));
            let tween = fade_in(config.duration_ms, config.offset_px);
            let callback_tracker = Rc::clone(&tracker);
            let callback: EntriesCallback = Closure::new(
                move |entries: Array, observer: IntersectionObserver| {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        if !entry.is_intersecting() {
                            continue;
                        }
                        let target = entry.target();
                        let Some(id) = target
                            .get_attribute(REVEAL_ID_ATTRIBUTE)
                            .and_then(|raw| raw.parse::<u32>().ok())
                        else {
                            continue;
                        };
                        if !callback_tracker.borrow_mut().reveal(id) {
                            continue;
                        }

                        observer.unobserve(&target);
                        let _ = target.class_list().add_1(REVEALED_CLASS);
                        if let Some(element) = target.dyn_ref::<HtmlElement>() {
                            motion.play(element, &tween, None);
                        }
                    }
                },
            );

            let options = IntersectionObserverInit::new();
            options.set_threshold(&JsValue::from_f64(config.threshold));
            options.set_root_margin(&config.root_margin);
            let observer = IntersectionObserver::new_with_options(
                callback.as_ref().unchecked_ref(),
                &options,
            )?;

            for (index, target) in targets.iter().enumerate() {
                target.set_attribute(REVEAL_ID_ATTRIBUTE, &index.to_string())?;
                observer.observe(target);
            }

            Ok(Some(Self {
                observer,
                _callback: callback,
                tracker,
            }))
        }

        pub fn revealed_count(&self) -> usize {
            self.tracker.borrow().count()
        }

        pub fn disconnect(&self) {
            self.observer.disconnect();
        }
    }

    /// Pending part of the hero intro. Dropping it cancels the typewriter.
    pub struct HeroIntro {
        _typewriter: Option<Timeout>,
    }

    pub fn play_hero_intro(config: &RevealConfig, motion: Rc<dyn Motion>) -> HeroIntro {
        if let Some(hero) = query_html(HERO_SELECTOR) {
            let tween = fade_in(config.hero_duration_ms, config.hero_offset_px)
                .delay(config.hero_delay_ms);
            motion.play(&hero, &tween, None);
        }

        let timer = query_html(TYPEWRITER_SELECTOR).map(|line| {
            let tween = typewriter(config.typewriter_duration_ms);
            Timeout::new(config.typewriter_delay_ms, move || {
                if motion.animated() {
                    let _ = line.style().set_property("width", "0");
                }
                motion.play(&line, &tween, None);
            })
        });
        HeroIntro { _typewriter: timer }
    }

}

#[cfg(target_arch = "wasm32")]
pub use web::{play_hero_intro, HeroIntro, RevealWatcher};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_element_reveals_at_most_once() {
        let mut tracker = RevealTracker::default();

        assert!(tracker.reveal(3));
        assert!(!tracker.reveal(3));
        assert!(!tracker.reveal(3));
        assert!(tracker.reveal(4));
        assert_eq!(tracker.count(), 2);
    }
}
