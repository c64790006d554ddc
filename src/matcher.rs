use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::media::MediaCondition;

/// Identifier for an active watch on a [`MediaMatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    pub(crate) fn next() -> WatchId {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        WatchId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Invoked with the new truth whenever a watched condition toggles.
pub type MatchListener = Rc<dyn Fn(bool)>;

/// The host facility that evaluates width conditions and reports truth
/// changes. This is the capability boundary of the library: conditions are
/// registered here and the host calls back whenever their truth flips.
pub trait MediaMatcher {
    /// Current truth of the condition.
    fn matches(&self, condition: &MediaCondition) -> bool;

    /// Starts delivering truth changes for `condition` to `listener`. The
    /// listener is not invoked for the current state, only for changes.
    fn watch(&self, condition: &MediaCondition, listener: MatchListener) -> WatchId;

    /// Stops a watch. Unknown ids are ignored.
    fn unwatch(&self, id: WatchId);
}

/// The degraded fallback when no live matching facility exists: every
/// condition is permanently non-matching and watches never fire. Registration
/// is accepted and discarded so nothing errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedMedia;

impl MediaMatcher for UnsupportedMedia {
    fn matches(&self, _condition: &MediaCondition) -> bool {
        false
    }

    fn watch(&self, _condition: &MediaCondition, _listener: MatchListener) -> WatchId {
        WatchId::next()
    }

    fn unwatch(&self, _id: WatchId) {}
}

struct Watch {
    id: WatchId,
    condition: MediaCondition,
    matched: Cell<bool>,
    listener: MatchListener,
}

/// A simulated host: a viewport with a current width.
///
/// [`Viewport::set_width`] re-evaluates every watched condition against the
/// new width and fires, in watch-registration order, each listener whose truth
/// toggled. Cloning the handle shares the same viewport.
#[derive(Clone)]
pub struct Viewport {
    state: Rc<ViewportState>,
}

struct ViewportState {
    width: Cell<f64>,
    watches: RefCell<Vec<Watch>>,
}

impl Viewport {
    pub fn new(width: f64) -> Viewport {
        Viewport {
            state: Rc::new(ViewportState {
                width: Cell::new(width),
                watches: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn width(&self) -> f64 {
        self.state.width.get()
    }

    /// Moves the viewport to `width` and notifies every watch whose truth
    /// toggled. Toggles are decided against a snapshot, so listeners are free
    /// to add or remove watches while the notification pass runs.
    pub fn set_width(&self, width: f64) {
        self.state.width.set(width);

        let toggled: Vec<(MatchListener, bool)> = {
            let watches = self.state.watches.borrow();
            watches
                .iter()
                .filter_map(|watch| {
                    let now = watch.condition.matches_width(width);
                    if now == watch.matched.get() {
                        return None;
                    }
                    watch.matched.set(now);
                    Some((watch.listener.clone(), now))
                })
                .collect()
        };

        for (listener, matches) in toggled {
            listener(matches);
        }
    }
}

impl MediaMatcher for Viewport {
    fn matches(&self, condition: &MediaCondition) -> bool {
        condition.matches_width(self.state.width.get())
    }

    fn watch(&self, condition: &MediaCondition, listener: MatchListener) -> WatchId {
        let id = WatchId::next();
        self.state.watches.borrow_mut().push(Watch {
            id,
            condition: condition.clone(),
            matched: Cell::new(condition.matches_width(self.state.width.get())),
            listener,
        });
        id
    }

    fn unwatch(&self, id: WatchId) {
        self.state.watches.borrow_mut().retain(|watch| watch.id != id);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::{MediaMatcher, UnsupportedMedia, Viewport};
    use crate::media::{MediaCondition, WidthRange};

    #[test]
    fn fires_only_toggled_watches_in_registration_order() {
        let viewport = Viewport::new(500.0);
        let log: Rc<RefCell<Vec<(&str, bool)>>> = Rc::new(RefCell::new(Vec::new()));

        let narrow = MediaCondition::single(WidthRange::up_to(599.0), "px");
        let wide = MediaCondition::single(WidthRange::at_least(600.0), "px");
        let always = MediaCondition::single(WidthRange::new(0.0, f64::INFINITY), "px");

        for (name, condition) in [("narrow", narrow), ("wide", wide), ("always", always)] {
            let log = log.clone();
            viewport.watch(&condition, Rc::new(move |m| log.borrow_mut().push((name, m))));
        }

        viewport.set_width(800.0);
        assert_eq!(*log.borrow(), vec![("narrow", false), ("wide", true)]);

        // No toggle, no fire.
        log.borrow_mut().clear();
        viewport.set_width(900.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unwatch_stops_delivery() {
        let viewport = Viewport::new(500.0);
        let log: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));

        let condition = MediaCondition::single(WidthRange::up_to(599.0), "px");
        let id = viewport.watch(&condition, {
            let log = log.clone();
            Rc::new(move |m| log.borrow_mut().push(m))
        });

        viewport.unwatch(id);
        viewport.set_width(800.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unsupported_media_is_permanently_false() {
        let matcher = UnsupportedMedia;
        let condition = MediaCondition::single(WidthRange::new(0.0, f64::INFINITY), "px");
        assert!(!matcher.matches(&condition));
        // Watches are accepted and discarded.
        let id = matcher.watch(&condition, Rc::new(|_| panic!("must never fire")));
        matcher.unwatch(id);
    }
}
