use std::{
    cell::{Cell, RefCell},
    mem,
    rc::Rc,
};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    change::{ChangeHandler, ChangeNotifier},
    matcher::MediaMatcher,
    media::{MediaCondition, WidthRange},
    query::{EventKind, MediaQuery, QueryHandler},
    size::Size,
};

/// The unit used when [`DefineOptions`] doesn't supply one.
pub const DEFAULT_UNIT: &str = "px";

/// The default four-breakpoint table.
pub fn defaults() -> Vec<(&'static str, WidthRange)> {
    vec![
        // Extra small devices (phones)
        ("xs", WidthRange::new(0.0, 767.0)),
        // Small devices (tablets)
        ("sm", WidthRange::new(768.0, 991.0)),
        // Medium devices (desktops)
        ("md", WidthRange::new(992.0, 1199.0)),
        // Large devices (large desktops)
        ("lg", WidthRange::at_least(1200.0)),
    ]
}

/// Options for [`Breakpoints::define`].
#[derive(Clone, Debug, Default)]
pub struct DefineOptions {
    /// Display unit for condition text; defaults to [`DEFAULT_UNIT`].
    pub unit: Option<String>,
}

/// A subscription, resolved at the facade boundary.
pub enum Listener {
    /// An enter handler for a named size or a union.
    Enter(QueryHandler),
    /// A leave handler for a named size or a union.
    Leave(QueryHandler),
    /// A change handler; only meaningful with the `"change"` spec.
    Change(ChangeHandler),
}

/// What [`Breakpoints::off`] should detach.
pub enum Unsubscribe {
    /// Clear both the enter and leave lists. For `"change"`, clears every
    /// change subscriber.
    All,
    /// Clear one list.
    Event(EventKind),
    /// Remove matching handler entries from one list.
    Handler(EventKind, QueryHandler),
}

/// The registry: a named table of size-range breakpoints plus a cache of
/// union conditions and a change notifier.
///
/// Unlike a process-wide table, a registry is an ordinary value: create as
/// many as needed, each with its own matcher and its own notion of "current",
/// and dispose them deterministically.
pub struct Breakpoints {
    matcher: Rc<dyn MediaMatcher>,
    sizes: RefCell<IndexMap<String, Size>>,
    unions: RefCell<FxHashMap<String, MediaQuery>>,
    change: Rc<ChangeNotifier>,
    defined: Cell<bool>,
    unit: RefCell<String>,
}

impl Breakpoints {
    pub fn new(matcher: Rc<dyn MediaMatcher>) -> Breakpoints {
        Breakpoints {
            matcher,
            sizes: RefCell::new(IndexMap::new()),
            unions: RefCell::new(FxHashMap::default()),
            change: Rc::new(ChangeNotifier::new()),
            defined: Cell::new(false),
            unit: RefCell::new(DEFAULT_UNIT.to_string()),
        }
    }

    /// Defines the active breakpoint set, destroying any previous definition
    /// first. One size is created per entry, in iteration order.
    pub fn define<'a>(
        &self,
        table: impl IntoIterator<Item = (&'a str, WidthRange)>,
        options: DefineOptions,
    ) {
        if self.defined.get() {
            self.dispose();
        }
        *self.unit.borrow_mut() = options.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string());
        for (name, range) in table {
            self.set(name, range);
        }
        self.defined.set(true);
    }

    /// [`Breakpoints::define`] with the [`defaults`] table.
    pub fn define_defaults(&self) {
        self.define(defaults(), DefineOptions::default());
    }

    /// Destroys every size and cached union, detaching their host watches and
    /// listeners, and resets the current breakpoint.
    pub fn dispose(&self) {
        let sizes = mem::take(&mut *self.sizes.borrow_mut());
        for (_, size) in &sizes {
            size.destroy();
        }
        let unions = mem::take(&mut *self.unions.borrow_mut());
        for (_, union) in &unions {
            union.destroy();
        }
        self.change.reset();
        self.defined.set(false);
    }

    /// Creates (or re-creates) a named size. Re-defining a name destroys the
    /// previous instance first; the old handle receives no further callbacks.
    pub fn set(&self, name: &str, range: WidthRange) -> Size {
        if let Some(old) = self.get(name) {
            old.destroy();
        }
        let unit = self.unit.borrow().clone();
        let size = Size::new(&self.matcher, &self.change, name, range, &unit);
        self.sizes
            .borrow_mut()
            .insert(name.to_string(), size.clone());
        size
    }

    pub fn get(&self, name: &str) -> Option<Size> {
        self.sizes.borrow().get(name).cloned()
    }

    /// The union condition over a space-separated list of size names.
    ///
    /// Cached by the exact string: keys are order- and whitespace-sensitive,
    /// so `"sm lg"` and `"lg sm"` are distinct conditions. Names that don't
    /// resolve to an existing size are silently skipped.
    pub fn get_union(&self, names: &str) -> MediaQuery {
        if let Some(union) = self.unions.borrow().get(names) {
            return union.clone();
        }
        let union = self.build_union(names);
        self.unions
            .borrow_mut()
            .insert(names.to_string(), union.clone());
        union
    }

    fn build_union(&self, names: &str) -> MediaQuery {
        let mut ranges: SmallVec<[WidthRange; 2]> = SmallVec::new();
        for name in names.split_whitespace() {
            if let Some(size) = self.get(name) {
                ranges.push(size.range());
            }
        }
        let unit = self.unit.borrow().clone();
        let condition = MediaCondition::any_of(ranges, &unit);
        MediaQuery::new(self.matcher.clone(), names, condition)
    }

    /// Whether the named size currently matches; `None` for unknown names.
    pub fn is(&self, name: &str) -> Option<bool> {
        self.get(name).map(|size| size.is_matched())
    }

    /// All size names, in definition order.
    pub fn all(&self) -> Vec<String> {
        self.sizes.borrow().keys().cloned().collect()
    }

    /// The most recently entered size-range breakpoint.
    pub fn current(&self) -> Option<Size> {
        self.change.current()
    }

    /// Lower bound of the named size. `None` for unknown names and for sizes
    /// with no lower bound.
    pub fn get_min(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|size| size.min())
    }

    /// Upper bound of the named size; `None` for unknown names.
    pub fn get_max(&self, name: &str) -> Option<f64> {
        self.get(name).map(|size| size.max())
    }

    /// Condition text of the named size; `None` for unknown names.
    pub fn get_media(&self, name: &str) -> Option<String> {
        self.get(name).map(|size| size.media())
    }

    /// Routes a subscription by spec: the trimmed literal `"change"` goes to
    /// the change notifier, a spec containing a space goes to the union
    /// condition, anything else to the named size. Unknown names and
    /// mismatched listener kinds are silent no-ops.
    pub fn on(&self, spec: &str, listener: Listener) {
        self.subscribe(spec, listener, false);
    }

    /// Like [`Breakpoints::on`], but the handler is removed after its first
    /// invocation.
    pub fn one(&self, spec: &str, listener: Listener) {
        self.subscribe(spec, listener, true);
    }

    fn subscribe(&self, spec: &str, listener: Listener, one: bool) {
        let spec = spec.trim();

        if spec == "change" {
            if let Listener::Change(handler) = listener {
                if one {
                    self.change.one(handler);
                } else {
                    self.change.on(handler);
                }
            }
            return;
        }

        let (kind, handler) = match listener {
            Listener::Enter(handler) => (EventKind::Enter, handler),
            Listener::Leave(handler) => (EventKind::Leave, handler),
            Listener::Change(_) => return,
        };

        let query = if spec.contains(' ') {
            Some(self.get_union(spec))
        } else {
            self.get(spec).map(|size| (*size).clone())
        };
        let Some(query) = query else {
            return;
        };
        if one {
            query.one(kind, handler);
        } else {
            query.on(kind, handler);
        }
    }

    /// Routes an unsubscription the same way [`Breakpoints::on`] routes
    /// subscriptions. For `"change"`, every change subscriber is cleared
    /// regardless of `target` (all-or-nothing, see [`ChangeNotifier::off`]).
    pub fn off(&self, spec: &str, target: Unsubscribe) {
        let spec = spec.trim();

        if spec == "change" {
            self.change.off();
            return;
        }

        let query = if spec.contains(' ') {
            Some(self.get_union(spec))
        } else {
            self.get(spec).map(|size| (*size).clone())
        };
        let Some(query) = query else {
            return;
        };
        match target {
            Unsubscribe::All => query.off(),
            Unsubscribe::Event(kind) => query.off_event(kind),
            Unsubscribe::Handler(kind, handler) => query.off_handler(kind, &handler),
        }
    }
}

impl Drop for Breakpoints {
    fn drop(&mut self) {
        self.dispose();
    }
}
