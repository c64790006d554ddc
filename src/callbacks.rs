use std::{
    cell::RefCell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use smallvec::SmallVec;

/// A stable identifier for a registered callback entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    pub(crate) fn next() -> CallbackId {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        CallbackId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The handler type stored in a [`Callbacks`] list. Handlers close over any
/// registration-time data they need; the argument is the event payload.
pub type Handler<T> = Rc<dyn Fn(&T)>;

struct CallbackEntry<T> {
    id: CallbackId,
    handler: Handler<T>,
    one: bool,
}

impl<T> Clone for CallbackEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: self.handler.clone(),
            one: self.one,
        }
    }
}

/// An ordered list of callbacks with optional one-shot entries.
///
/// Firing snapshots the list first, so a handler can add, remove or clear
/// entries while the list is firing: removals take effect for entries that
/// haven't had their turn yet, and additions are only observed by the next
/// fire. A one-shot entry is unlinked just before its handler runs, so even a
/// re-entrant fire can't run it twice.
pub struct Callbacks<T> {
    list: RefCell<SmallVec<[CallbackEntry<T>; 2]>>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Callbacks<T> {
    pub fn new() -> Callbacks<T> {
        Callbacks {
            list: RefCell::new(SmallVec::new()),
        }
    }

    /// Appends an entry. The same handler can be added more than once; each
    /// add is a separate entry.
    pub fn add(&self, handler: Handler<T>, one: bool) -> CallbackId {
        let id = CallbackId::next();
        self.list.borrow_mut().push(CallbackEntry { id, handler, one });
        id
    }

    /// Removes every entry holding the same handler allocation. Removing a
    /// handler that was never added is a no-op.
    pub fn remove(&self, handler: &Handler<T>) {
        self.list
            .borrow_mut()
            .retain(|entry| !Rc::ptr_eq(&entry.handler, handler));
    }

    /// Discards all entries.
    pub fn clear(&self) {
        self.list.borrow_mut().clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    /// Invokes every live entry in insertion order with `arg`.
    pub fn fire(&self, arg: &T) {
        let snapshot: SmallVec<[CallbackEntry<T>; 2]> =
            self.list.borrow().iter().cloned().collect();

        for entry in snapshot {
            // An earlier handler in this pass may have removed this entry.
            let live = self.list.borrow().iter().any(|e| e.id == entry.id);
            if !live {
                continue;
            }
            if entry.one {
                self.remove_id(entry.id);
            }
            (entry.handler)(arg);
        }
    }

    /// Invokes only the most recently added entry, honoring its one-shot flag.
    /// Used for the immediate enter fire when a handler subscribes to an
    /// already-matched condition.
    pub fn fire_last(&self, arg: &T) {
        let entry = self.list.borrow().last().cloned();
        let Some(entry) = entry else {
            return;
        };
        if entry.one {
            self.remove_id(entry.id);
        }
        (entry.handler)(arg);
    }

    fn remove_id(&self, id: CallbackId) {
        self.list.borrow_mut().retain(|entry| entry.id != id);
    }
}
