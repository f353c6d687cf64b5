//! # routesync-core
//!
//! Keeps a navigation source and a centralized application store mutually
//! consistent - THE LOGIC.
//!
//! ## Data Flow
//!
//! ```text
//!  normal:       NavigationSource ──▶ LocationChangeDispatcher ──▶ Store
//!  time travel:  Store ──▶ DivergenceDetector ──▶ NavigationSource.push
//!                            │                          │
//!                            └── arms guard ──▶ echo suppressed by dispatcher
//! ```
//!
//! The [`ReentrancyGuard`] is the only coordination primitive between the
//! two paths. It is sound because every callback is delivered synchronously
//! on a single thread.
//!
//! ## Architectural Constraints
//!
//! - No async, no threads, no network
//! - Collaborators are injected explicitly through [`RouterBinding`]
//! - Route matching is optional and pluggable through [`RouteMatcher`]

// =============================================================================
// MODULES
// =============================================================================

pub mod action;
pub mod binding;
pub mod detector;
pub mod dispatcher;
pub mod guard;
pub mod memory;
pub mod ports;
pub mod primitives;
pub mod reducer;
pub mod routes;
pub mod selectors;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ActionKind, Location, RouterState, SyncError};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use action::{LocationChangePayload, RouterAction, on_location_changed};
pub use binding::{ActiveBinding, RouterBinding};
pub use detector::DivergenceDetector;
pub use dispatcher::LocationChangeDispatcher;
pub use guard::{EchoState, ReentrancyGuard};
pub use ports::{Listener, NavigationListener, NavigationSource, RouterSlice, Store, Subscription};
pub use primitives::LOCATION_CHANGE;
pub use reducer::{initial_router_state, router_reducer};

// =============================================================================
// RE-EXPORTS: Routing & Selectors
// =============================================================================

pub use routes::{
    ConfigRouteMatcher, Match, MatchOptions, MatchedRoute, PathPattern, RouteConfig, RouteMatcher,
    match_path, match_routes, select_exact,
};
pub use selectors::{MatchSelector, get_action, get_hash, get_location, get_router, get_search};

// =============================================================================
// RE-EXPORTS: In-Memory Collaborators
// =============================================================================

pub use memory::{MemoryHistory, MemoryStore};
