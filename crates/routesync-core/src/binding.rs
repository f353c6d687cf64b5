//! # Router Binding (Lifecycle)
//!
//! Wires the divergence detector and the location change dispatcher to
//! their collaborators.
//!
//! ## States
//!
//! ```text
//!                 activate()
//!  RouterBinding ────────────▶ ActiveBinding
//!   (Inactive)   ◀──────────── (Active)
//!                deactivate()
//! ```
//!
//! Activation order is fixed:
//! 1. fresh guard
//! 2. detector subscribed to the store
//! 3. dispatcher attached to the navigation source
//! 4. synthetic initial dispatch with `isFirstRendering`
//!
//! Dropping an `ActiveBinding` deactivates it.

use crate::detector::DivergenceDetector;
use crate::dispatcher::LocationChangeDispatcher;
use crate::guard::{EchoState, ReentrancyGuard};
use crate::ports::{NavigationSource, Store, Subscription};
use crate::routes::RouteMatcher;
use crate::{ActionKind, Location, SyncError};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// INACTIVE BINDING
// =============================================================================

/// Inactive binding: collaborators to be wired on activation.
pub struct RouterBinding<S, N> {
    store: Option<Rc<S>>,
    source: Option<Rc<N>>,
    matcher: Option<Rc<dyn RouteMatcher>>,
}

impl<S, N> Default for RouterBinding<S, N> {
    fn default() -> Self {
        Self {
            store: None,
            source: None,
            matcher: None,
        }
    }
}

impl<S, N> Clone for RouterBinding<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            source: self.source.clone(),
            matcher: self.matcher.clone(),
        }
    }
}

impl<S, N> RouterBinding<S, N>
where
    S: Store + 'static,
    N: NavigationSource + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn store(mut self, store: Rc<S>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn navigation_source(mut self, source: Rc<N>) -> Self {
        self.source = Some(source);
        self
    }

    /// Enable route matching on every dispatched location change.
    #[must_use]
    pub fn route_matcher(mut self, matcher: Rc<dyn RouteMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Wire everything up and perform the initial dispatch.
    ///
    /// Fails without side effects if the store or the navigation source was
    /// never provided.
    pub fn activate(self) -> Result<ActiveBinding<S, N>, SyncError> {
        let store = self.store.clone().ok_or(SyncError::MissingStore)?;
        let source = self.source.clone().ok_or(SyncError::MissingNavigationSource)?;

        let guard = ReentrancyGuard::new();
        let live = Rc::new(Cell::new(true));

        let detector = DivergenceDetector::new(Rc::clone(&store), Rc::clone(&source), guard.clone());
        let detector_live = Rc::clone(&live);
        let store_subscription = store.subscribe(Rc::new(move || {
            if detector_live.get() {
                detector.check();
            }
        }));

        let dispatcher = Rc::new(LocationChangeDispatcher::new(
            Rc::clone(&store),
            guard.clone(),
            self.matcher.clone(),
        ));
        let listener = Rc::clone(&dispatcher);
        let dispatcher_live = Rc::clone(&live);
        let navigation_subscription =
            source.listen(Rc::new(move |location: &Location, action: ActionKind| {
                if dispatcher_live.get() {
                    listener.handle(location, action);
                }
            }));

        let initial = source.location();
        tracing::info!(
            location = %initial,
            route_matching = self.matcher.is_some(),
            "Router binding activated"
        );
        dispatcher.handle_initial(&initial, source.action());

        Ok(ActiveBinding {
            binding: self,
            guard,
            live,
            store_subscription,
            navigation_subscription,
        })
    }
}

// =============================================================================
// ACTIVE BINDING
// =============================================================================

/// Active binding. Holds both subscriptions and the activation's guard.
pub struct ActiveBinding<S, N> {
    binding: RouterBinding<S, N>,
    guard: ReentrancyGuard,
    live: Rc<Cell<bool>>,
    store_subscription: Subscription,
    navigation_subscription: Subscription,
}

impl<S, N> ActiveBinding<S, N> {
    /// True until deactivated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.live.get()
    }

    /// State of this activation's reentrancy guard.
    #[must_use]
    pub fn guard_state(&self) -> EchoState {
        self.guard.state()
    }

    /// Tear down and hand back the inactive binding for reactivation.
    #[must_use]
    pub fn deactivate(mut self) -> RouterBinding<S, N> {
        self.teardown();
        self.binding.clone()
    }

    fn teardown(&mut self) {
        if !self.live.replace(false) {
            return;
        }
        self.navigation_subscription.cancel();
        self.store_subscription.cancel();
        tracing::info!("Router binding deactivated");
    }
}

impl<S, N> Drop for ActiveBinding<S, N> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S, N> fmt::Debug for ActiveBinding<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveBinding")
            .field("active", &self.is_active())
            .field("guard", &self.guard.state())
            .field("route_matching", &self.binding.matcher.is_some())
            .finish()
    }
}
