//! # Synchronization Tier Tests (T0-T4)
//!
//! If ANY tier fails, the binding is INVALID.
//!
//! ## Tiers
//! - T0: Initial Handshake
//! - T1: Forward Flow (navigation source -> store)
//! - T2: Time Travel (store -> navigation source)
//! - T3: Teardown Safety
//! - T4: Route Matching

use routesync_core::{
    ActionKind, ActiveBinding, ConfigRouteMatcher, EchoState, Location, MemoryHistory,
    MemoryStore, RouteConfig, RouterAction, RouterBinding, RouterSlice, RouterState,
    initial_router_state, router_reducer,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// HARNESS
// =============================================================================

/// Application state embedding the router slice next to unrelated data.
#[derive(Debug, Clone, PartialEq)]
struct AppState {
    router: Rc<RouterState>,
    visits: u32,
}

impl RouterSlice for AppState {
    fn router(&self) -> &RouterState {
        &self.router
    }
}

#[derive(Debug, Clone)]
enum AppAction {
    Router(RouterAction),
    Visit,
}

impl From<RouterAction> for AppAction {
    fn from(action: RouterAction) -> Self {
        Self::Router(action)
    }
}

type Log = Rc<RefCell<Vec<RouterAction>>>;
type AppStore = MemoryStore<AppState, AppAction>;

fn app_reducer(log: Log) -> impl Fn(&Rc<AppState>, &AppAction) -> Rc<AppState> {
    move |state: &Rc<AppState>, action: &AppAction| match action {
        AppAction::Router(action) => {
            log.borrow_mut().push(action.clone());
            let router = router_reducer(&state.router, action);
            if Rc::ptr_eq(&router, &state.router) {
                Rc::clone(state)
            } else {
                Rc::new(AppState {
                    router,
                    visits: state.visits,
                })
            }
        }
        AppAction::Visit => Rc::new(AppState {
            router: Rc::clone(&state.router),
            visits: state.visits + 1,
        }),
    }
}

struct Harness {
    store: Rc<AppStore>,
    history: Rc<MemoryHistory>,
    log: Log,
}

impl Harness {
    /// Store starts at the navigation source's location, the usual setup.
    fn at(path: &str) -> Self {
        let history = Rc::new(MemoryHistory::new(Location::parse(path)));
        let router = Rc::new(initial_router_state(history.as_ref()));
        Self::with_router(history, router)
    }

    fn with_router(history: Rc<MemoryHistory>, router: Rc<RouterState>) -> Self {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let store = Rc::new(MemoryStore::new(
            AppState { router, visits: 0 },
            app_reducer(Rc::clone(&log)),
        ));
        Self {
            store,
            history,
            log,
        }
    }

    fn binding(&self) -> RouterBinding<AppStore, MemoryHistory> {
        RouterBinding::new()
            .store(Rc::clone(&self.store))
            .navigation_source(Rc::clone(&self.history))
    }

    fn activate(&self) -> ActiveBinding<AppStore, MemoryHistory> {
        self.binding().activate().expect("activate")
    }

    fn dispatched(&self) -> Vec<RouterAction> {
        self.log.borrow().clone()
    }

    fn store_location(&self) -> Location {
        self.store.state().router().location.clone()
    }

    fn assert_in_sync(&self) {
        assert!(
            self.store_location().same_place(&self.history.location()),
            "store {} vs navigation source {}",
            self.store_location(),
            self.history.location()
        );
    }
}

// =============================================================================
// TIER T0: INITIAL HANDSHAKE
// =============================================================================

mod t0_initial_handshake {
    use super::*;

    /// T0.1: Activation dispatches exactly one first-rendering action.
    #[test]
    fn activation_dispatches_once_with_marker() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        let dispatched = harness.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert!(dispatched[0].payload().is_first_rendering);
    }

    /// T0.2: Initial dispatch wire shape for `/` reached by POP.
    #[test]
    fn initial_dispatch_wire_shape() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        let mut value = serde_json::to_value(&harness.dispatched()[0]).expect("json");
        // entry keys are an implementation detail of the in-memory source
        if let Some(location) = value["payload"]["location"].as_object_mut() {
            location.remove("key");
        }
        assert_eq!(
            value,
            json!({
                "type": "@@router/LOCATION_CHANGE",
                "payload": {
                    "location": {"pathname": "/", "search": "", "hash": ""},
                    "action": "POP",
                    "isFirstRendering": true
                }
            })
        );
    }

    /// T0.3: Handshake at the store's own location leaves the state reference untouched.
    #[test]
    fn handshake_is_referential_no_op() {
        let harness = Harness::at("/start?x=1");
        let before = harness.store.state();
        let _active = harness.activate();
        let after = harness.store.state();

        assert!(Rc::ptr_eq(&before, &after));
    }

    /// T0.4: Handshake primes a store that starts elsewhere.
    #[test]
    fn handshake_primes_store() {
        let history = Rc::new(MemoryHistory::new(Location::parse("/deep/link#section")));
        let harness = Harness::with_router(history, Rc::new(RouterState::default()));
        let _active = harness.activate();

        harness.assert_in_sync();
        assert_eq!(harness.history.push_count(), 0);
    }

    /// T0.5: Handshake is dispatched even if an echo was pending in a previous activation.
    #[test]
    fn handshake_ignores_stale_guard() {
        let harness = Harness::at("/");
        let first = harness.activate();
        let binding = first.deactivate();

        let second = binding.activate().expect("reactivate");
        assert_eq!(second.guard_state(), EchoState::Idle);
        let first_renderings = harness
            .dispatched()
            .iter()
            .filter(|a| a.payload().is_first_rendering)
            .count();
        assert_eq!(first_renderings, 2);
    }
}

// =============================================================================
// TIER T1: FORWARD FLOW
// =============================================================================

mod t1_forward_flow {
    use super::*;

    /// T1.1: External push dispatches one action without the first-rendering marker.
    #[test]
    fn push_dispatches_once() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        harness
            .history
            .push(Location::parse("/path/to/somewhere?query=test"));

        let dispatched = harness.dispatched();
        assert_eq!(dispatched.len(), 2);
        let payload = dispatched[1].payload();
        assert_eq!(payload.location.pathname, "/path/to/somewhere");
        assert_eq!(payload.location.search, "?query=test");
        assert_eq!(payload.location.hash, "");
        assert_eq!(payload.action, ActionKind::Push);
        assert!(!payload.is_first_rendering);

        let value = serde_json::to_value(&dispatched[1]).expect("json");
        assert!(value["payload"].get("isFirstRendering").is_none());

        let state = harness.store.state();
        assert_eq!(state.router().action, ActionKind::Push);
        harness.assert_in_sync();
    }

    /// T1.2: Action kinds pass through unmodified.
    #[test]
    fn action_kinds_pass_through() {
        let harness = Harness::at("/a");
        let _active = harness.activate();

        harness.history.push(Location::new("/b"));
        harness.history.replace(Location::new("/c"));
        harness.history.go_back();
        harness.history.go_forward();

        let kinds: Vec<ActionKind> = harness
            .dispatched()
            .iter()
            .skip(1)
            .map(|a| a.payload().action)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Push,
                ActionKind::Replace,
                ActionKind::Pop,
                ActionKind::Pop
            ]
        );
        harness.assert_in_sync();
    }

    /// T1.3: Navigation never triggers a corrective push.
    #[test]
    fn forward_flow_never_pushes_back() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        for page in 0..5 {
            harness.history.push(Location::new(format!("/page/{page}")));
        }

        assert_eq!(harness.history.push_count(), 5);
        assert_eq!(harness.dispatched().len(), 6);
    }

    /// T1.4: Redelivering an identical event leaves the state untouched.
    #[test]
    fn identical_events_are_idempotent() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        harness.history.replace(Location::new("/same"));
        let event = harness.dispatched().pop().expect("replace dispatched");
        let after_first = harness.store.state();
        let recorded = harness.store.recorded_len();

        harness.store.dispatch_action(AppAction::Router(event.clone()));
        harness.store.dispatch_action(AppAction::Router(event));
        let after_second = harness.store.state();

        assert!(Rc::ptr_eq(&after_first, &after_second));
        assert_eq!(harness.store.recorded_len(), recorded);
        assert_eq!(harness.history.push_count(), 0);
        harness.assert_in_sync();
    }

    /// T1.5: Unrelated store traffic does not disturb the navigation source.
    #[test]
    fn unrelated_dispatch_is_ignored() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        harness.store.dispatch_action(AppAction::Visit);
        harness.store.dispatch_action(AppAction::Visit);

        assert_eq!(harness.store.state().visits, 2);
        assert_eq!(harness.history.push_count(), 0);
    }
}

// =============================================================================
// TIER T2: TIME TRAVEL
// =============================================================================

mod t2_time_travel {
    use super::*;

    /// T2.1: Restoring an earlier state pushes once and dispatches nothing.
    #[test]
    fn travel_pushes_once_without_dispatch() {
        let harness = Harness::at("/");
        let active = harness.activate();

        harness.history.push(Location::new("/a"));
        harness.history.push(Location::parse("/b?tab=2#top"));
        let dispatches_before = harness.store.dispatch_count();

        let at_a = harness.store.recorded_state(1).expect("recorded");
        assert_eq!(at_a.router().location.pathname, "/a");
        harness.store.replace_state(at_a);

        assert_eq!(harness.history.push_count(), 3);
        assert_eq!(harness.store.dispatch_count(), dispatches_before);
        assert_eq!(harness.history.location().pathname, "/a");
        assert_eq!(active.guard_state(), EchoState::Idle);
        harness.assert_in_sync();
    }

    /// T2.2: After a correction, the next external event dispatches normally.
    #[test]
    fn guard_clears_after_echo() {
        let harness = Harness::at("/");
        let _active = harness.activate();

        harness.history.push(Location::new("/a"));
        harness.history.push(Location::new("/b"));
        let initial = harness.store.recorded_state(0).expect("recorded");
        harness.store.replace_state(initial);

        let before = harness.dispatched().len();
        harness.history.push(Location::new("/c"));
        assert_eq!(harness.dispatched().len(), before + 1);
        assert_eq!(harness.store_location().pathname, "/c");
    }

    /// T2.3: Travelling to a state at the current location does nothing.
    #[test]
    fn travel_to_same_place_is_silent() {
        let harness = Harness::at("/");
        let active = harness.activate();

        harness.history.push(Location::new("/a"));
        let current = harness.store.state();
        harness.store.replace_state(Rc::new(AppState {
            router: Rc::clone(&current.router),
            visits: 99,
        }));

        assert_eq!(harness.history.push_count(), 1);
        assert_eq!(active.guard_state(), EchoState::Idle);
    }

    /// T2.4: Only pathname, search and hash are compared.
    #[test]
    fn auxiliary_state_does_not_count_as_divergence() {
        let harness = Harness::at("/a");
        let _active = harness.activate();

        let mut router = (*harness.store.state().router).clone();
        router.location.state = Some(json!({"scroll": 120}));
        router.location.key = Some("elsewhere".to_string());
        harness.store.replace_state(Rc::new(AppState {
            router: Rc::new(router),
            visits: 0,
        }));

        assert_eq!(harness.history.push_count(), 0);
    }

    /// T2.5: Known surprising behaviour: the corrective push drops auxiliary state.
    #[test]
    fn corrective_push_drops_auxiliary_state() {
        let harness = Harness::at("/a");
        let _active = harness.activate();

        let mut router = (*harness.store.state().router).clone();
        router.location = Location::new("/b").with_state(json!({"modal": true}));
        harness.store.replace_state(Rc::new(AppState {
            router: Rc::new(router),
            visits: 0,
        }));

        let location = harness.history.location();
        assert_eq!(location.pathname, "/b");
        assert!(location.state.is_none());
        // store keeps its own copy untouched
        assert_eq!(
            harness.store_location().state,
            Some(json!({"modal": true}))
        );
    }
}

// =============================================================================
// TIER T3: TEARDOWN SAFETY
// =============================================================================

mod t3_teardown {
    use super::*;

    /// T3.1: No dispatch after deactivation.
    #[test]
    fn navigation_after_teardown_is_ignored() {
        let harness = Harness::at("/");
        let active = harness.activate();
        let _inactive = active.deactivate();

        harness.history.push(Location::new("/later"));
        assert_eq!(harness.dispatched().len(), 1);
    }

    /// T3.2: No corrective push after deactivation.
    #[test]
    fn time_travel_after_teardown_is_ignored() {
        let harness = Harness::at("/");
        let active = harness.activate();
        harness.history.push(Location::new("/a"));
        drop(active);

        let initial = harness.store.recorded_state(0).expect("recorded");
        harness.store.replace_state(initial);
        assert_eq!(harness.history.push_count(), 1);
        assert_eq!(harness.history.location().pathname, "/a");
    }

    /// T3.3: Deactivating from inside a store fan-out stops the detector.
    #[test]
    fn teardown_during_fan_out() {
        let harness = Harness::at("/");
        let slot: Rc<RefCell<Option<ActiveBinding<AppStore, MemoryHistory>>>> =
            Rc::new(RefCell::new(None));

        let killer = Rc::clone(&slot);
        let _earlier = harness.store.subscribe(Rc::new(move || {
            if let Some(active) = killer.borrow_mut().take() {
                drop(active);
            }
        }));

        *slot.borrow_mut() = Some(harness.activate());
        let pushes = harness.history.push_count();

        let diverged = Rc::new(AppState {
            router: Rc::new(RouterState::new(Location::new("/elsewhere"), ActionKind::Push)),
            visits: 0,
        });
        harness.store.replace_state(diverged);

        assert_eq!(harness.history.push_count(), pushes);
        assert!(slot.borrow().is_none());
    }

    /// T3.4: Reactivation works with a fresh guard.
    #[test]
    fn reactivation_resumes_sync() {
        let harness = Harness::at("/");
        let binding = harness.activate().deactivate();
        harness.history.push(Location::new("/offline"));

        let _active = binding.activate().expect("reactivate");
        harness.assert_in_sync();

        harness.history.push(Location::new("/online"));
        assert_eq!(harness.store_location().pathname, "/online");
    }
}

// =============================================================================
// TIER T4: ROUTE MATCHING
// =============================================================================

mod t4_route_matching {
    use super::*;

    fn routes() -> Vec<RouteConfig> {
        vec![RouteConfig::new("/").named("root").with_routes(vec![
            RouteConfig::new("/test").exact().named("test"),
            RouteConfig::new("/users/:id").named("user"),
        ])]
    }

    fn matched_harness() -> (Harness, ActiveBinding<AppStore, MemoryHistory>) {
        let harness = Harness::at("/");
        let matcher = ConfigRouteMatcher::new(&routes()).expect("compile");
        let active = harness
            .binding()
            .route_matcher(Rc::new(matcher))
            .activate()
            .expect("activate");
        (harness, active)
    }

    /// T4.1: Exact match is selected and stored.
    #[test]
    fn exact_match_selected() {
        let (harness, _active) = matched_harness();
        harness.history.push(Location::new("/test"));

        let state = harness.store.state();
        let router = state.router();
        let exact = router.route_match.as_ref().expect("match");
        assert_eq!(exact.path, "/test");
        assert_eq!(exact.url, "/test");
        assert!(exact.is_exact);
        assert_eq!(router.matched_routes.as_ref().map(Vec::len), Some(2));
    }

    /// T4.2: No exact match leaves `match` empty but keeps the branch.
    #[test]
    fn no_exact_match_is_none() {
        let (harness, _active) = matched_harness();
        harness.history.push(Location::new("/users/42/settings"));

        let state = harness.store.state();
        let router = state.router();
        assert!(router.route_match.is_none());
        let branch = router.matched_routes.as_ref().expect("branch");
        assert_eq!(branch.len(), 2);
        assert_eq!(
            branch[1].route_match.params.get("id").map(String::as_str),
            Some("42")
        );
    }

    /// T4.3: The handshake carries route matching too.
    #[test]
    fn handshake_is_matched() {
        let (harness, _active) = matched_harness();
        let dispatched = harness.dispatched();
        let payload = dispatched[0].payload();
        assert!(payload.is_first_rendering);
        assert_eq!(
            payload.route_match.as_ref().map(|m| m.path.as_str()),
            Some("/")
        );
    }

    /// T4.4: Without a matcher, route fields are omitted.
    #[test]
    fn no_matcher_no_route_fields() {
        let harness = Harness::at("/");
        let _active = harness.activate();
        harness.history.push(Location::new("/test"));

        for action in harness.dispatched() {
            assert!(action.payload().matched_routes.is_none());
            assert!(action.payload().route_match.is_none());
        }
    }
}
