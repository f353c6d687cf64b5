//! # In-Memory Collaborators
//!
//! Single-threaded implementations of the collaborator ports, used by the
//! test suites and the scenario CLI:
//! - [`MemoryStore`]: reducer-driven store with time-travel support
//! - [`MemoryHistory`]: entry stack with push/replace/back/forward
//!
//! Neither is meant to replace a real store or browser history.

mod history;
mod store;

pub use history::MemoryHistory;
pub use store::MemoryStore;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::ports::Subscription;

/// Ordered callback registry shared by both collaborators.
///
/// Fan-out iterates a snapshot, but skips any entry removed while the
/// fan-out is in progress, so a cancelled callback never runs again.
pub(crate) struct Registry<L> {
    entries: Rc<RefCell<BTreeMap<u64, L>>>,
    next_id: Cell<u64>,
}

impl<L: Clone + 'static> Registry<L> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn register(&self, listener: L) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id.saturating_add(1));
        self.entries.borrow_mut().insert(id, listener);

        let entries: Weak<RefCell<BTreeMap<u64, L>>> = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().remove(&id);
            }
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn for_each(&self, mut call: impl FnMut(&L)) {
        let snapshot: Vec<(u64, L)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, listener.clone()))
            .collect();

        for (id, listener) in snapshot {
            let still_registered = self.entries.borrow().contains_key(&id);
            if still_registered {
                call(&listener);
            }
        }
    }
}
