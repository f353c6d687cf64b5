//! In-memory navigation source.

use super::Registry;
use crate::ports::{NavigationListener, NavigationSource, Subscription};
use crate::primitives::ENTRY_KEY_PREFIX;
use crate::{ActionKind, Location};
use std::cell::{Cell, RefCell};
use std::fmt;

#[derive(Debug)]
struct Entries {
    stack: Vec<Location>,
    index: usize,
    action: ActionKind,
    next_key: u64,
}

impl Entries {
    fn keyed(&mut self, location: Location) -> Location {
        let key = format!("{}{}", ENTRY_KEY_PREFIX, self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        location.with_key(key)
    }

    fn current(&self) -> Location {
        self.stack.get(self.index).cloned().unwrap_or_default()
    }
}

/// Navigation source backed by a vector of entries.
///
/// The current location is updated before listeners run.
pub struct MemoryHistory {
    entries: RefCell<Entries>,
    listeners: Registry<NavigationListener>,
    pushes: Cell<usize>,
}

impl MemoryHistory {
    /// Start with a single entry, reached by `POP`.
    pub fn new(initial: Location) -> Self {
        let mut entries = Entries {
            stack: Vec::new(),
            index: 0,
            action: ActionKind::Pop,
            next_key: 0,
        };
        let first = entries.keyed(initial);
        entries.stack.push(first);

        Self {
            entries: RefCell::new(entries),
            listeners: Registry::new(),
            pushes: Cell::new(0),
        }
    }

    pub fn location(&self) -> Location {
        self.entries.borrow().current()
    }

    pub fn action(&self) -> ActionKind {
        self.entries.borrow().action
    }

    /// Add an entry after the current one, discarding forward entries.
    pub fn push(&self, location: Location) {
        self.pushes.set(self.pushes.get().saturating_add(1));
        let current = {
            let mut entries = self.entries.borrow_mut();
            let keyed = entries.keyed(location);
            let keep = entries.index + 1;
            entries.stack.truncate(keep);
            entries.stack.push(keyed);
            entries.index = keep;
            entries.action = ActionKind::Push;
            entries.current()
        };
        self.notify(&current, ActionKind::Push);
    }

    /// Overwrite the current entry.
    pub fn replace(&self, location: Location) {
        let current = {
            let mut entries = self.entries.borrow_mut();
            let keyed = entries.keyed(location);
            let index = entries.index;
            entries.stack[index] = keyed;
            entries.action = ActionKind::Replace;
            entries.current()
        };
        self.notify(&current, ActionKind::Replace);
    }

    /// Move `delta` entries; returns `false` without notifying when the
    /// target is out of range.
    pub fn go(&self, delta: isize) -> bool {
        let current = {
            let mut entries = self.entries.borrow_mut();
            let Some(target) = entries.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= entries.stack.len() || delta == 0 {
                return false;
            }
            entries.index = target;
            entries.action = ActionKind::Pop;
            entries.current()
        };
        self.notify(&current, ActionKind::Pop);
        true
    }

    pub fn go_back(&self) -> bool {
        self.go(-1)
    }

    pub fn go_forward(&self) -> bool {
        self.go(1)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<Location> {
        self.entries.borrow().stack.clone()
    }

    /// Index of the current entry.
    pub fn index(&self) -> usize {
        self.entries.borrow().index
    }

    /// Number of `push` calls since creation.
    pub fn push_count(&self) -> usize {
        self.pushes.get()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listen(&self, listener: NavigationListener) -> Subscription {
        self.listeners.register(listener)
    }

    fn notify(&self, location: &Location, action: ActionKind) {
        self.listeners.for_each(|listener| listener(location, action));
    }
}

impl NavigationSource for MemoryHistory {
    fn location(&self) -> Location {
        MemoryHistory::location(self)
    }

    fn action(&self) -> ActionKind {
        MemoryHistory::action(self)
    }

    fn listen(&self, listener: NavigationListener) -> Subscription {
        MemoryHistory::listen(self, listener)
    }

    fn push(&self, location: Location) {
        MemoryHistory::push(self, location);
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("MemoryHistory")
            .field("index", &entries.index)
            .field("len", &entries.stack.len())
            .field("action", &entries.action)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
