//! Path pattern compilation.
//!
//! Patterns follow the classic path-to-regexp dialect used by route-config
//! tables:
//!
//! - `/users` literal segments
//! - `/users/:id` named parameters, `/:lang?` optional parameters
//! - `/files/*` trailing splat, captured under the key `0`
//!
//! A compiled pattern captures the matched url prefix as group 1 and each
//! parameter in declaration order after it.

use crate::SyncError;
use crate::primitives::{
    MAX_PATTERN_LENGTH, MAX_PATTERN_REGEX_SIZE, PATH_DELIMITER, ROOT_PATH,
};
use crate::routes::Match;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flags controlling how a pattern matches a pathname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchOptions {
    /// The whole pathname must be consumed.
    #[serde(default)]
    pub exact: bool,
    /// A trailing slash is significant.
    #[serde(default)]
    pub strict: bool,
    /// Literal segments compare case-sensitively.
    #[serde(default)]
    pub sensitive: bool,
}

/// A pattern compiled into a regular expression.
#[derive(Debug, Clone)]
pub struct PathPattern {
    path: String,
    options: MatchOptions,
    regex: Regex,
    keys: Vec<String>,
}

impl PathPattern {
    /// Compile `path` with the given options.
    pub fn compile(path: &str, options: MatchOptions) -> Result<Self, SyncError> {
        if path.len() > MAX_PATTERN_LENGTH {
            return Err(SyncError::InvalidRoutePattern(format!(
                "pattern length {} exceeds maximum of {} bytes",
                path.len(),
                MAX_PATTERN_LENGTH
            )));
        }
        if !path.starts_with(PATH_DELIMITER) {
            return Err(SyncError::InvalidRoutePattern(format!(
                "'{}' must start with '{}'",
                path, PATH_DELIMITER
            )));
        }

        let ends_with_delimiter = path.ends_with(PATH_DELIMITER);
        let body = if !options.strict && ends_with_delimiter {
            &path[..path.len() - 1]
        } else {
            path
        };

        let mut source = String::from(if options.sensitive { "^(" } else { "(?i)^(" });
        let mut keys = Vec::new();

        let segments: Vec<&str> = body.split(PATH_DELIMITER).skip(1).collect();
        let last = segments.len().saturating_sub(1);
        for (index, segment) in segments.iter().enumerate() {
            if let Some(name) = segment.strip_prefix(':') {
                let (name, optional) = match name.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (name, false),
                };
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(SyncError::InvalidRoutePattern(format!(
                        "'{}' has an invalid parameter name '{}'",
                        path, segment
                    )));
                }
                keys.push(name.to_string());
                if optional {
                    source.push_str("(?:/([^/]+?))?");
                } else {
                    source.push_str("/([^/]+?)");
                }
            } else if *segment == "*" {
                if index != last {
                    return Err(SyncError::InvalidRoutePattern(format!(
                        "'{}' may only use '*' as the final segment",
                        path
                    )));
                }
                keys.push(keys.iter().filter(|k| is_index_key(k)).count().to_string());
                source.push_str("/(.*)");
            } else {
                source.push(PATH_DELIMITER);
                source.push_str(&regex::escape(segment));
            }
        }

        if !options.strict {
            source.push_str("(?:/$)?");
        }
        source.push(')');

        if options.exact {
            source.push('$');
        } else if !(options.strict && ends_with_delimiter) {
            source.push_str("(?:/|$)");
        }

        let regex = RegexBuilder::new(&source)
            .size_limit(MAX_PATTERN_REGEX_SIZE)
            .build()
            .map_err(|e| SyncError::InvalidRoutePattern(format!("'{}': {}", path, e)))?;

        Ok(Self {
            path: path.to_string(),
            options,
            regex,
            keys,
        })
    }

    /// Match `pathname` against this pattern.
    #[must_use]
    pub fn matches(&self, pathname: &str) -> Option<Match> {
        let captures = self.regex.captures(pathname)?;
        let url = captures.get(1).map_or("", |m| m.as_str());
        let is_exact = pathname == url;

        if self.options.exact && !is_exact {
            return None;
        }

        let params: BTreeMap<String, String> = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(i, key)| {
                captures
                    .get(i + 2)
                    .map(|value| (key.clone(), value.as_str().to_string()))
            })
            .collect();

        let url = if self.path == ROOT_PATH && url.is_empty() {
            ROOT_PATH.to_string()
        } else {
            url.to_string()
        };

        Some(Match {
            path: self.path.clone(),
            url,
            is_exact,
            params,
        })
    }
}

fn is_index_key(key: &str) -> bool {
    key.chars().all(|c| c.is_ascii_digit())
}

/// Match `pathname` against a pattern compiled on the fly.
pub fn match_path(
    pathname: &str,
    path: &str,
    options: MatchOptions,
) -> Result<Option<Match>, SyncError> {
    Ok(PathPattern::compile(path, options)?.matches(pathname))
}
