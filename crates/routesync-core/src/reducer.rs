//! # Router Reducer
//!
//! Reference reducer folding [`RouterAction`] into a [`RouterState`] slice.
//!
//! Reducer contract:
//! - The activation handshake (`isFirstRendering`) at the slice's current
//!   location returns the same `Rc`, so subscribers comparing by reference
//!   see no change.
//! - A change that leaves the slice value-equal also returns the same `Rc`.
//! - Otherwise location, action and route-matching results are replaced.

use crate::ports::NavigationSource;
use crate::{RouterAction, RouterState};
use std::rc::Rc;

/// Initial slice taken from a navigation source's current position.
#[must_use]
pub fn initial_router_state<N: NavigationSource + ?Sized>(source: &N) -> RouterState {
    RouterState::new(source.location(), source.action())
}

/// Fold `action` into `state`.
#[must_use]
pub fn router_reducer(state: &Rc<RouterState>, action: &RouterAction) -> Rc<RouterState> {
    let RouterAction::LocationChange(payload) = action;

    if payload.is_first_rendering && payload.location.same_place(&state.location) {
        return Rc::clone(state);
    }

    let next = RouterState {
        location: payload.location.clone(),
        action: payload.action,
        matched_routes: payload.matched_routes.clone(),
        route_match: payload.route_match.clone(),
    };

    if next == **state {
        Rc::clone(state)
    } else {
        Rc::new(next)
    }
}

impl RouterState {
    /// Apply `action` to an owned slice, for application reducers that
    /// embed the slice by value.
    pub fn apply(&mut self, action: &RouterAction) {
        let current = Rc::new(std::mem::take(self));
        let next = router_reducer(&current, action);
        *self = Rc::unwrap_or_clone(next);
    }
}
