//! # Divergence Detector
//!
//! Store listener that resynchronizes the navigation source after the store
//! location changed without a navigation event (time travel).
//!
//! On divergence the detector arms the guard and pushes the store location.
//! It never dispatches to the store.

use crate::guard::ReentrancyGuard;
use crate::ports::{NavigationSource, RouterSlice, Store};
use std::rc::Rc;

/// Compares the store-held location with the navigation source on every
/// store notification.
pub struct DivergenceDetector<S, N> {
    store: Rc<S>,
    source: Rc<N>,
    guard: ReentrancyGuard,
}

impl<S, N> DivergenceDetector<S, N>
where
    S: Store,
    N: NavigationSource,
{
    #[must_use]
    pub fn new(store: Rc<S>, source: Rc<N>, guard: ReentrancyGuard) -> Self {
        Self {
            store,
            source,
            guard,
        }
    }

    /// Run one divergence check.
    ///
    /// Only pathname, search and hash are compared. The corrective push
    /// carries those three fields and nothing else, so auxiliary state held
    /// in the store's location is not forwarded.
    pub fn check(&self) {
        let target = {
            let state = self.store.state();
            let in_store = &state.router().location;
            let in_source = self.source.location();

            if in_store.same_place(&in_source) {
                return;
            }

            tracing::debug!(
                store = %in_store,
                navigation = %in_source,
                "Store location diverged; resynchronizing navigation source"
            );
            in_store.place()
        };

        self.guard.arm();
        self.source.push(target);
    }
}
