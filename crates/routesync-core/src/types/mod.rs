//! # Core Type Definitions
//!
//! This module contains the shared data model of the synchronization engine:
//! - Navigational position (`Location`, `ActionKind`)
//! - The store-owned slice (`RouterState`)
//! - Error types (`SyncError`)
//!
//! ## Equality
//!
//! `Location` derives full structural equality, which the reducer uses to
//! detect no-op updates. Divergence detection uses `Location::same_place`,
//! which looks at `pathname`, `search` and `hash` only.

use crate::primitives::PATH_DELIMITER;
use crate::routes::{Match, MatchedRoute};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// LOCATION
// =============================================================================

/// A navigational position.
///
/// `state` and `key` are opaque auxiliary data owned by the navigation
/// source. They travel with the location but never take part in divergence
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Path component, always starting with `/` for absolute locations.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    #[serde(default)]
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    #[serde(default)]
    pub hash: String,
    /// Opaque per-entry state carried by the navigation source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    /// Entry key assigned by the navigation source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Location {
    /// Create a location with the given pathname and empty search/hash.
    #[must_use]
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }

    /// Parse a full path such as `/a/b?x=1#top` into its components.
    ///
    /// A missing `?` or `#` prefix on a non-empty part is added, so the
    /// result always renders back through [`Location::to_path`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(idx) => (&path[..idx], &path[idx..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let pathname = if pathname.is_empty() {
            PATH_DELIMITER.to_string()
        } else {
            pathname.to_string()
        };

        Self {
            pathname,
            search: normalize_prefixed(search, '?'),
            hash: normalize_prefixed(hash, '#'),
            state: None,
            key: None,
        }
    }

    /// Set the query string.
    #[must_use]
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.search = normalize_prefixed(search.as_ref(), '?');
        self
    }

    /// Set the fragment.
    #[must_use]
    pub fn with_hash(mut self, hash: impl AsRef<str>) -> Self {
        self.hash = normalize_prefixed(hash.as_ref(), '#');
        self
    }

    /// Attach opaque navigation state.
    #[must_use]
    pub fn with_state(mut self, state: serde_json::Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Attach an entry key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// True when both locations agree on pathname, search and hash.
    ///
    /// Auxiliary `state` and `key` are ignored.
    #[must_use]
    pub fn same_place(&self, other: &Self) -> bool {
        self.pathname == other.pathname && self.search == other.search && self.hash == other.hash
    }

    /// Copy of this location without auxiliary data.
    #[must_use]
    pub fn place(&self) -> Self {
        Self {
            pathname: self.pathname.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
            state: None,
            key: None,
        }
    }

    /// Render pathname, search and hash back into a single path.
    #[must_use]
    pub fn to_path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn normalize_prefixed(part: &str, prefix: char) -> String {
    if part.is_empty() || (part.len() == prefix.len_utf8() && part.starts_with(prefix)) {
        String::new()
    } else if part.starts_with(prefix) {
        part.to_string()
    } else {
        format!("{prefix}{part}")
    }
}

// =============================================================================
// ACTION KIND
// =============================================================================

/// How the navigation source arrived at its current location.
///
/// Mirrors the navigation source's own vocabulary and is passed through
/// unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    /// A new entry was pushed.
    Push,
    /// Initial load, or a move through existing entries.
    #[default]
    Pop,
    /// The current entry was replaced.
    Replace,
}

impl ActionKind {
    /// Upper-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUSH" => Ok(Self::Push),
            "POP" => Ok(Self::Pop),
            "REPLACE" => Ok(Self::Replace),
            other => Err(SyncError::ConfigError(format!(
                "Unknown navigation action: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// ROUTER STATE (store-owned slice)
// =============================================================================

/// The slice of application state owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterState {
    /// Location the store believes is current.
    pub location: Location,
    /// Action that produced `location`.
    pub action: ActionKind,
    /// Matched branch from the last route-matched location change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_routes: Option<Vec<MatchedRoute>>,
    /// First exact match of `matched_routes`.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub route_match: Option<Match>,
}

impl RouterState {
    /// Create a slice at the given location.
    #[must_use]
    pub fn new(location: Location, action: ActionKind) -> Self {
        Self {
            location,
            action,
            matched_routes: None,
            route_match: None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in routesync.
///
/// - Divergence between store and navigation source is NOT an error
/// - An unmatched pathname is NOT an error
/// - The engine never retries; every failure is a wiring or input problem
#[derive(Debug, Error)]
pub enum SyncError {
    /// Activation was attempted without a store reference.
    #[error("Store reference could not be resolved at activation")]
    MissingStore,

    /// Activation was attempted without a navigation source.
    #[error("Navigation source could not be resolved at activation")]
    MissingNavigationSource,

    /// A route pattern could not be compiled.
    #[error("Invalid route pattern: {0}")]
    InvalidRoutePattern(String),

    /// A route table is nested deeper than the supported maximum.
    #[error("Route table nesting exceeds maximum depth of {0}")]
    RouteTableTooDeep(usize),

    /// A scenario or route configuration is malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
