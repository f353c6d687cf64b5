//! # Scenario Configuration
//!
//! TOML files driving the CLI.
//!
//! ## Scenario File
//!
//! ```toml
//! initial = "/"
//!
//! [[routes]]
//! path = "/users/:id"
//! exact = true
//!
//! [[steps]]
//! op = "push"
//! path = "/users/1?tab=posts"
//! expect = "/users/1?tab=posts"
//!
//! [[steps]]
//! op = "jump"
//! index = 0
//! ```
//!
//! ## Route File
//!
//! A bare `[[routes]]` table, same shape as in a scenario.

use routesync_core::primitives::PATH_DELIMITER;
use routesync_core::{ConfigRouteMatcher, RouteConfig, SyncError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a scenario or route file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SCENARIO
// =============================================================================

/// A scripted session: starting location, optional route table and steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Location the navigation source starts at.
    #[serde(default = "default_initial")]
    pub initial: String,
    /// Route table; matching is enabled when non-empty.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_initial() -> String {
    PATH_DELIMITER.to_string()
}

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    /// Navigate to a new entry.
    Push {
        path: String,
        #[serde(default)]
        state: Option<serde_json::Value>,
        #[serde(default)]
        expect: Option<String>,
    },
    /// Overwrite the current entry.
    Replace {
        path: String,
        #[serde(default)]
        state: Option<serde_json::Value>,
        #[serde(default)]
        expect: Option<String>,
    },
    Back {
        #[serde(default)]
        expect: Option<String>,
    },
    Forward {
        #[serde(default)]
        expect: Option<String>,
    },
    /// Restore the N-th recorded store state, the way a time-travel
    /// debugger would.
    Jump {
        index: usize,
        #[serde(default)]
        expect: Option<String>,
    },
    Deactivate,
    Activate,
}

impl Step {
    /// Path the store is expected to hold after this step.
    pub fn expect(&self) -> Option<&str> {
        match self {
            Self::Push { expect, .. }
            | Self::Replace { expect, .. }
            | Self::Back { expect }
            | Self::Forward { expect }
            | Self::Jump { expect, .. } => expect.as_deref(),
            Self::Deactivate | Self::Activate => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push { path, .. } => write!(f, "push {}", path),
            Self::Replace { path, .. } => write!(f, "replace {}", path),
            Self::Back { .. } => f.write_str("back"),
            Self::Forward { .. } => f.write_str("forward"),
            Self::Jump { index, .. } => write!(f, "jump {}", index),
            Self::Deactivate => f.write_str("deactivate"),
            Self::Activate => f.write_str("activate"),
        }
    }
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = read_config_file(path)?;
        let scenario = Self::from_toml(&text)?;
        tracing::debug!(
            path = %path.display(),
            steps = scenario.steps.len(),
            routes = scenario.routes.len(),
            "Scenario loaded"
        );
        Ok(scenario)
    }

    /// Parse and validate scenario text.
    pub fn from_toml(text: &str) -> Result<Self, SyncError> {
        let scenario: Self = toml::from_str(text)
            .map_err(|e| SyncError::ConfigError(format!("Invalid scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check paths and compile the route table.
    pub fn validate(&self) -> Result<(), SyncError> {
        check_path("initial", &self.initial)?;

        for (index, step) in self.steps.iter().enumerate() {
            let field = format!("steps[{}]", index);
            match step {
                Step::Push { path, .. } | Step::Replace { path, .. } => check_path(&field, path)?,
                _ => {}
            }
            if let Some(expect) = step.expect() {
                check_path(&format!("{}.expect", field), expect)?;
            }
        }

        self.matcher().map(|_| ())
    }

    /// Matcher for the route table, if one is configured.
    pub fn matcher(&self) -> Result<Option<ConfigRouteMatcher>, SyncError> {
        if self.routes.is_empty() {
            return Ok(None);
        }
        ConfigRouteMatcher::new(&self.routes).map(Some)
    }
}

// =============================================================================
// ROUTE FILE
// =============================================================================

/// A standalone route table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteFile {
    pub routes: Vec<RouteConfig>,
}

impl RouteFile {
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = read_config_file(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, SyncError> {
        toml::from_str(text)
            .map_err(|e| SyncError::ConfigError(format!("Invalid route file: {}", e)))
    }

    /// Compile the table.
    pub fn matcher(&self) -> Result<ConfigRouteMatcher, SyncError> {
        ConfigRouteMatcher::new(&self.routes)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn check_path(field: &str, path: &str) -> Result<(), SyncError> {
    if path.starts_with(PATH_DELIMITER) {
        Ok(())
    } else {
        Err(SyncError::ConfigError(format!(
            "{}: path '{}' must start with '{}'",
            field, path, PATH_DELIMITER
        )))
    }
}

/// Resolve, size-check and read a configuration file.
fn read_config_file(path: &Path) -> Result<String, SyncError> {
    let canonical = validate_file_path(path)?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| SyncError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(SyncError::ConfigError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    std::fs::read_to_string(&canonical)
        .map_err(|e| SyncError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

fn validate_file_path(path: &Path) -> Result<PathBuf, SyncError> {
    let canonical = path.canonicalize().map_err(|e| {
        SyncError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SyncError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}
