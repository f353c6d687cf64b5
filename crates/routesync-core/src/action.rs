//! # Canonical Actions
//!
//! The single action shape the engine dispatches to fold a navigation event
//! into store state.
//!
//! Wire shape:
//!
//! ```text
//! { "type": "@@router/LOCATION_CHANGE",
//!   "payload": { "location": {..}, "action": "PUSH",
//!                "matchedRoutes"?: [..], "match"?: {..},
//!                "isFirstRendering"?: true } }
//! ```

use crate::primitives::LOCATION_CHANGE;
use crate::routes::{Match, MatchedRoute};
use crate::{ActionKind, Location};
use serde::{Deserialize, Serialize};

/// Actions produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RouterAction {
    /// The navigation source moved to a new location.
    #[serde(rename = "@@router/LOCATION_CHANGE")]
    LocationChange(LocationChangePayload),
}

impl RouterAction {
    /// Wire `type` of this action.
    #[must_use]
    pub const fn action_type(&self) -> &'static str {
        match self {
            Self::LocationChange(_) => LOCATION_CHANGE,
        }
    }

    /// Payload of a location change.
    #[must_use]
    pub const fn payload(&self) -> &LocationChangePayload {
        match self {
            Self::LocationChange(payload) => payload,
        }
    }
}

impl From<LocationChangePayload> for RouterAction {
    fn from(payload: LocationChangePayload) -> Self {
        Self::LocationChange(payload)
    }
}

/// Payload of [`RouterAction::LocationChange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationChangePayload {
    pub location: Location,
    pub action: ActionKind,
    /// Matched branch; present only when a route matcher is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_routes: Option<Vec<MatchedRoute>>,
    /// First exact match of the branch.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub route_match: Option<Match>,
    /// Set once per activation, on the synthetic initial dispatch.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_first_rendering: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LocationChangePayload {
    #[must_use]
    pub fn new(location: Location, action: ActionKind) -> Self {
        Self {
            location,
            action,
            matched_routes: None,
            route_match: None,
            is_first_rendering: false,
        }
    }

    /// Attach route-matching results.
    #[must_use]
    pub fn with_routes(mut self, matched_routes: Vec<MatchedRoute>, route_match: Option<Match>) -> Self {
        self.matched_routes = Some(matched_routes);
        self.route_match = route_match;
        self
    }

    /// Mark as the activation handshake.
    #[must_use]
    pub fn first_rendering(mut self) -> Self {
        self.is_first_rendering = true;
        self
    }
}

/// Build a location change action.
#[must_use]
pub fn on_location_changed(location: Location, action: ActionKind) -> RouterAction {
    RouterAction::LocationChange(LocationChangePayload::new(location, action))
}
