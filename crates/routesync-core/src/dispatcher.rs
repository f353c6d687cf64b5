//! # Location Change Dispatcher
//!
//! Navigation-source listener that folds every external navigation event
//! into the store as exactly one [`RouterAction::LocationChange`].
//!
//! Events caused by the divergence detector's corrective push are
//! suppressed: the store already holds that location.

use crate::guard::ReentrancyGuard;
use crate::ports::Store;
use crate::routes::{RouteMatcher, select_exact};
use crate::{ActionKind, Location, LocationChangePayload, RouterAction};
use std::rc::Rc;

/// Dispatches canonical change actions for navigation events.
pub struct LocationChangeDispatcher<S> {
    store: Rc<S>,
    guard: ReentrancyGuard,
    matcher: Option<Rc<dyn RouteMatcher>>,
}

impl<S: Store> LocationChangeDispatcher<S> {
    #[must_use]
    pub fn new(
        store: Rc<S>,
        guard: ReentrancyGuard,
        matcher: Option<Rc<dyn RouteMatcher>>,
    ) -> Self {
        Self {
            store,
            guard,
            matcher,
        }
    }

    /// Handle one navigation event.
    pub fn handle(&self, location: &Location, action: ActionKind) {
        if self.guard.take_echo() {
            tracing::trace!(location = %location, "Suppressed echo of corrective push");
            return;
        }
        self.dispatch(self.payload(location, action));
    }

    /// Dispatch the activation handshake, bypassing the guard.
    pub fn handle_initial(&self, location: &Location, action: ActionKind) {
        self.dispatch(self.payload(location, action).first_rendering());
    }

    fn payload(&self, location: &Location, action: ActionKind) -> LocationChangePayload {
        let payload = LocationChangePayload::new(location.clone(), action);
        match &self.matcher {
            Some(matcher) => {
                let matched = matcher.match_routes(&location.pathname);
                let exact = select_exact(&matched);
                payload.with_routes(matched, exact)
            }
            None => payload,
        }
    }

    fn dispatch(&self, payload: LocationChangePayload) {
        tracing::debug!(
            location = %payload.location,
            action = %payload.action,
            first = payload.is_first_rendering,
            "Dispatching location change"
        );
        self.store.dispatch(RouterAction::LocationChange(payload));
    }
}
