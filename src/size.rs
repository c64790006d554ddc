use std::{
    cell::Cell,
    fmt,
    ops::Deref,
    rc::{Rc, Weak},
};

use crate::{
    change::ChangeNotifier,
    matcher::{MediaMatcher, WatchId},
    media::{MediaCondition, WidthRange},
    query::MediaQuery,
};

/// A size-range breakpoint: a [`MediaQuery`] (it derefs to one) that
/// additionally participates in registry-wide current-breakpoint tracking.
///
/// Whenever the host reports that the size now matches, it notifies the change
/// notifier with itself as the new current breakpoint. Unions never do this;
/// only sizes claim "current".
#[derive(Clone)]
pub struct Size {
    state: Rc<SizeState>,
}

struct SizeState {
    query: MediaQuery,
    range: WidthRange,
    change_watch: Cell<Option<WatchId>>,
}

impl Size {
    pub(crate) fn new(
        matcher: &Rc<dyn MediaMatcher>,
        notifier: &Rc<ChangeNotifier>,
        name: &str,
        range: WidthRange,
        unit: &str,
    ) -> Size {
        let condition = MediaCondition::single(range, unit);
        let query = MediaQuery::new(matcher.clone(), name, condition);
        let state = Rc::new(SizeState {
            query,
            range,
            change_watch: Cell::new(None),
        });
        let size = Size {
            state: state.clone(),
        };

        // A size that is matched from the start becomes current silently;
        // subscribers only hear about transitions.
        if size.is_matched() {
            notifier.set_current(&size);
        }

        let weak_state: Weak<SizeState> = Rc::downgrade(&state);
        let weak_notifier: Weak<ChangeNotifier> = Rc::downgrade(notifier);
        let watch = matcher.watch(
            size.condition(),
            Rc::new(move |matches| {
                if !matches {
                    return;
                }
                if let (Some(state), Some(notifier)) =
                    (weak_state.upgrade(), weak_notifier.upgrade())
                {
                    notifier.trigger(&Size { state });
                }
            }),
        );
        state.change_watch.set(Some(watch));

        size
    }

    /// Lower bound of the range, if it has one.
    pub fn min(&self) -> Option<f64> {
        self.state.range.min
    }

    /// Upper bound of the range; `f64::INFINITY` when open above.
    pub fn max(&self) -> f64 {
        self.state.range.max
    }

    pub(crate) fn range(&self) -> WidthRange {
        self.state.range
    }

    /// Detaches both host watches and clears the callback lists.
    pub(crate) fn destroy(&self) {
        if let Some(watch) = self.state.change_watch.take() {
            self.state.query.matcher().unwatch(watch);
        }
        self.state.query.destroy();
    }
}

impl Deref for Size {
    type Target = MediaQuery;

    fn deref(&self) -> &MediaQuery {
        &self.state.query
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for Size {}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size")
            .field("name", &self.name())
            .field("min", &self.state.range.min)
            .field("max", &self.state.range.max)
            .field("matched", &self.is_matched())
            .finish()
    }
}
