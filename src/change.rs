use std::cell::RefCell;

use crate::{
    callbacks::{Callbacks, Handler},
    size::Size,
};

/// Payload delivered to change subscribers.
#[derive(Clone, Debug)]
pub struct BreakpointChange {
    /// The breakpoint that just entered.
    pub current: Size,
    /// The previously current breakpoint, if any.
    pub previous: Option<Size>,
}

/// The handler type for change subscriptions.
pub type ChangeHandler = Handler<BreakpointChange>;

/// Tracks which size-range breakpoint is presently current and notifies
/// change subscribers. One notifier exists per registry.
#[derive(Default)]
pub struct ChangeNotifier {
    current: RefCell<Option<Size>>,
    callbacks: Callbacks<BreakpointChange>,
}

impl ChangeNotifier {
    pub fn new() -> ChangeNotifier {
        ChangeNotifier::default()
    }

    /// The most recently entered size-range breakpoint.
    pub fn current(&self) -> Option<Size> {
        self.current.borrow().clone()
    }

    /// Makes `size` current without notifying subscribers. Used when a size is
    /// already matched at construction time.
    pub(crate) fn set_current(&self, size: &Size) {
        *self.current.borrow_mut() = Some(size.clone());
    }

    /// Clears the current breakpoint without notifying subscribers. Part of
    /// the registry's define/dispose lifecycle.
    pub(crate) fn reset(&self) {
        self.current.borrow_mut().take();
    }

    /// Makes `next` current and fires every change subscriber once with
    /// `{current: next, previous}`.
    pub(crate) fn trigger(&self, next: &Size) {
        let previous = self.current.borrow_mut().replace(next.clone());
        self.callbacks.fire(&BreakpointChange {
            current: next.clone(),
            previous,
        });
    }

    /// Registers a change handler.
    pub fn on(&self, handler: ChangeHandler) {
        self.callbacks.add(handler, false);
    }

    /// Registers a change handler removed after its first invocation.
    pub fn one(&self, handler: ChangeHandler) {
        self.callbacks.add(handler, true);
    }

    /// Clears every change subscriber. Unsubscribing here is all-or-nothing;
    /// per-handler removal is deliberately not offered.
    pub fn off(&self) {
        self.callbacks.clear();
    }
}
