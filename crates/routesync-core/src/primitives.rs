//! # Innate Primitives
//!
//! Hardcoded constants shared by the synchronization engine.
//!
//! These values are part of the produced contract: stores and reducers
//! written against routesync match on them, so they never change at runtime.

/// Canonical action type for a folded navigation event.
///
/// Every action the engine dispatches carries this type.
pub const LOCATION_CHANGE: &str = "@@router/LOCATION_CHANGE";

/// Path separator used by route patterns and pathnames.
pub const PATH_DELIMITER: char = '/';

/// Pathname of the root route.
///
/// A root pattern reports this url even when it matched the empty prefix.
pub const ROOT_PATH: &str = "/";

/// Maximum nesting depth of a route table.
///
/// - All route matching must be computationally bounded.
/// - Tables nested deeper than this are rejected when the matcher is built.
pub const MAX_ROUTE_DEPTH: usize = 32;

/// Maximum length of a route pattern, in bytes.
///
/// Route tables are loaded from user-supplied files.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum size of the compiled regex behind a route pattern (1 MiB).
pub const MAX_PATTERN_REGEX_SIZE: usize = 1 << 20;

/// Prefix of the keys the in-memory navigation source assigns to entries.
pub const ENTRY_KEY_PREFIX: &str = "entry-";
