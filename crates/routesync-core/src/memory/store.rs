//! Reducer-driven in-memory store.

use super::Registry;
use crate::ports::{Listener, RouterSlice, Store, Subscription};
use crate::RouterAction;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type BoxedReducer<S, A> = Box<dyn Fn(&Rc<S>, &A) -> Rc<S>>;

/// Store holding `Rc<S>` and folding actions of type `A` through a reducer.
///
/// Every state produced by a dispatch is recorded so that earlier states can
/// be restored with [`MemoryStore::replace_state`], the way a time-travel
/// debugger would.
pub struct MemoryStore<S, A> {
    state: RefCell<Rc<S>>,
    reducer: BoxedReducer<S, A>,
    listeners: Registry<Listener>,
    recorded: RefCell<Vec<Rc<S>>>,
    dispatches: Cell<usize>,
}

impl<S: 'static, A: 'static> MemoryStore<S, A> {
    /// Create a store at `initial`.
    pub fn new(initial: S, reducer: impl Fn(&Rc<S>, &A) -> Rc<S> + 'static) -> Self {
        let initial = Rc::new(initial);
        Self {
            state: RefCell::new(Rc::clone(&initial)),
            reducer: Box::new(reducer),
            listeners: Registry::new(),
            recorded: RefCell::new(vec![initial]),
            dispatches: Cell::new(0),
        }
    }

    /// Current state.
    pub fn state(&self) -> Rc<S> {
        Rc::clone(&self.state.borrow())
    }

    /// Register a change listener.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.register(listener)
    }

    /// Fold an application action and notify listeners.
    pub fn dispatch_action(&self, action: A) {
        let current = self.state();
        let next = (self.reducer)(&current, &action);
        self.dispatches.set(self.dispatches.get().saturating_add(1));

        if !Rc::ptr_eq(&current, &next) {
            self.recorded.borrow_mut().push(Rc::clone(&next));
        }
        *self.state.borrow_mut() = next;

        self.notify();
    }

    /// Overwrite the state without running the reducer, then notify.
    ///
    /// This is the out-of-band mutation path used for time travel.
    pub fn replace_state(&self, state: Rc<S>) {
        *self.state.borrow_mut() = state;
        self.notify();
    }

    /// State recorded at `index`; index 0 is the initial state.
    pub fn recorded_state(&self, index: usize) -> Option<Rc<S>> {
        self.recorded.borrow().get(index).cloned()
    }

    /// Number of recorded states.
    pub fn recorded_len(&self) -> usize {
        self.recorded.borrow().len()
    }

    /// Number of dispatches since creation.
    pub fn dispatch_count(&self) -> usize {
        self.dispatches.get()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&self) {
        self.listeners.for_each(|listener| listener());
    }
}

impl<S, A> Store for MemoryStore<S, A>
where
    S: RouterSlice + 'static,
    A: From<RouterAction> + 'static,
{
    type State = S;

    fn state(&self) -> Rc<S> {
        MemoryStore::state(self)
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        MemoryStore::subscribe(self, listener)
    }

    fn dispatch(&self, action: RouterAction) {
        self.dispatch_action(A::from(action));
    }
}

impl<S, A> fmt::Debug for MemoryStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("listeners", &self.listeners.len())
            .field("recorded", &self.recorded.borrow().len())
            .field("dispatches", &self.dispatches.get())
            .finish()
    }
}
