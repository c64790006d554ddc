use std::{
    cell::Cell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    callbacks::{Callbacks, Handler},
    matcher::{MediaMatcher, WatchId},
    media::MediaCondition,
};

/// Which callback list of a breakpoint condition a registration targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The condition's truth just became (or already is) true.
    Enter,
    /// The condition's truth just became false.
    Leave,
}

/// The handler type for enter/leave subscriptions. The argument is the
/// condition that fired.
pub type QueryHandler = Handler<MediaQuery>;

/// A named breakpoint condition: a width condition bound to a name, owning an
/// enter and a leave callback list.
///
/// The condition registers itself with the host matcher at construction; each
/// host-reported truth toggle updates the cached match state and fires the
/// matching list. Handles are cheap to clone and share one underlying
/// condition; equality is handle identity.
#[derive(Clone)]
pub struct MediaQuery {
    state: Rc<QueryState>,
}

pub(crate) struct QueryState {
    name: String,
    condition: MediaCondition,
    matched: Cell<bool>,
    alive: Cell<bool>,
    watch: Cell<Option<WatchId>>,
    matcher: Rc<dyn MediaMatcher>,
    enter: Callbacks<MediaQuery>,
    leave: Callbacks<MediaQuery>,
}

impl MediaQuery {
    pub(crate) fn new(
        matcher: Rc<dyn MediaMatcher>,
        name: impl Into<String>,
        condition: MediaCondition,
    ) -> MediaQuery {
        let state = Rc::new(QueryState {
            name: name.into(),
            matched: Cell::new(matcher.matches(&condition)),
            condition,
            alive: Cell::new(true),
            watch: Cell::new(None),
            matcher,
            enter: Callbacks::new(),
            leave: Callbacks::new(),
        });

        // The matcher must not keep the condition alive, so the listener holds
        // a weak reference.
        let weak: Weak<QueryState> = Rc::downgrade(&state);
        let watch = state.matcher.watch(
            &state.condition,
            Rc::new(move |matches| {
                if let Some(state) = weak.upgrade() {
                    MediaQuery { state }.toggled(matches);
                }
            }),
        );
        state.watch.set(Some(watch));

        MediaQuery { state }
    }

    fn toggled(&self, matches: bool) {
        self.state.matched.set(matches);
        let list = if matches {
            &self.state.enter
        } else {
            &self.state.leave
        };
        list.fire(self);
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The host-facing condition text, e.g.
    /// `(min-width: 768px) and (max-width: 991px)`.
    pub fn media(&self) -> String {
        self.state.condition.to_string()
    }

    pub(crate) fn condition(&self) -> &MediaCondition {
        &self.state.condition
    }

    pub(crate) fn matcher(&self) -> &Rc<dyn MediaMatcher> {
        &self.state.matcher
    }

    /// The cached truth from the host's last evaluation.
    pub fn is_matched(&self) -> bool {
        self.state.matched.get()
    }

    /// Registers a handler. Registering an `Enter` handler while the condition
    /// is currently matched fires that handler immediately, so late
    /// subscribers still observe an already-true state; `Leave` registration
    /// never fires immediately. A destroyed condition ignores registration.
    pub fn on(&self, kind: EventKind, handler: QueryHandler) {
        self.register(kind, handler, false);
    }

    /// Like [`MediaQuery::on`], but the handler is removed after its first
    /// invocation.
    pub fn one(&self, kind: EventKind, handler: QueryHandler) {
        self.register(kind, handler, true);
    }

    fn register(&self, kind: EventKind, handler: QueryHandler, one: bool) {
        if !self.state.alive.get() {
            return;
        }
        let list = self.list(kind);
        list.add(handler, one);
        if kind == EventKind::Enter && self.is_matched() {
            list.fire_last(self);
        }
    }

    /// Clears both callback lists.
    pub fn off(&self) {
        self.state.enter.clear();
        self.state.leave.clear();
    }

    /// Clears one callback list.
    pub fn off_event(&self, kind: EventKind) {
        self.list(kind).clear();
    }

    /// Removes every matching entry from one callback list.
    pub fn off_handler(&self, kind: EventKind, handler: &QueryHandler) {
        self.list(kind).remove(handler);
    }

    /// Detaches the host watch and clears both lists. A destroyed condition
    /// never fires again and cannot be reused.
    pub(crate) fn destroy(&self) {
        if !self.state.alive.get() {
            return;
        }
        self.state.alive.set(false);
        if let Some(watch) = self.state.watch.take() {
            self.state.matcher.unwatch(watch);
        }
        self.off();
    }

    fn list(&self, kind: EventKind) -> &Callbacks<MediaQuery> {
        match kind {
            EventKind::Enter => &self.state.enter,
            EventKind::Leave => &self.state.leave,
        }
    }
}

impl PartialEq for MediaQuery {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for MediaQuery {}

impl fmt::Debug for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaQuery")
            .field("name", &self.state.name)
            .field("media", &self.media())
            .field("matched", &self.state.matched.get())
            .finish()
    }
}
