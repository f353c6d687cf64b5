//! # Collaborator Ports
//!
//! Traits for the external collaborators the engine is wired to:
//! - [`Store`]: canonical application state with synchronous notification
//! - [`NavigationSource`]: current location plus listen/push
//! - [`RouterSlice`]: access to the engine-owned slice of application state
//!
//! Both collaborators hand back a [`Subscription`] when a callback is
//! registered. Dropping or cancelling it detaches the callback.
//!
//! ## Delivery Model
//!
//! Callbacks are delivered synchronously on one thread and never interleave.
//! The traits therefore take `&self` and the callback types are `Rc`-based
//! and `!Send`.

use crate::{ActionKind, Location, RouterAction, RouterState};
use std::fmt;
use std::rc::Rc;

/// Store change callback.
pub type Listener = Rc<dyn Fn()>;

/// Navigation event callback, receiving the new location and how it was reached.
pub type NavigationListener = Rc<dyn Fn(&Location, ActionKind)>;

// =============================================================================
// SUBSCRIPTION HANDLE
// =============================================================================

/// Handle that detaches a registered callback.
///
/// Cancelling is idempotent, and dropping the handle cancels it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a detach function.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Detach the callback. Subsequent calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// True until the handle has been cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Application states that carry a [`RouterState`] slice.
pub trait RouterSlice {
    fn router(&self) -> &RouterState;
}

impl RouterSlice for RouterState {
    fn router(&self) -> &RouterState {
        self
    }
}

/// Centralized application store.
pub trait Store {
    /// Application state type.
    type State: RouterSlice;

    /// Current state.
    fn state(&self) -> Rc<Self::State>;

    /// Register a listener. It must fire synchronously, once per dispatch,
    /// after the state has been updated.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Fold an engine action into the state.
    fn dispatch(&self, action: RouterAction);
}

// =============================================================================
// NAVIGATION SOURCE
// =============================================================================

/// Location-tracking mechanism with back/forward/push/replace semantics.
pub trait NavigationSource {
    /// Current location.
    fn location(&self) -> Location;

    /// How the current location was reached.
    fn action(&self) -> ActionKind;

    /// Register a listener for location changes. The source's `location()`
    /// must already report the new value when the listener runs.
    fn listen(&self, listener: NavigationListener) -> Subscription;

    /// Navigate to `location` as a new entry.
    fn push(&self, location: Location);
}
