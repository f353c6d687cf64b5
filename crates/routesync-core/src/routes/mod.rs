//! # Route Matching
//!
//! Optional route-matching capability for the location change dispatcher.
//!
//! The dispatcher only sees the [`RouteMatcher`] trait. This module also
//! ships a route-config implementation:
//! - [`RouteConfig`] describes a nested route table (loadable from TOML)
//! - [`match_routes`] walks a table and returns the matched branch
//! - [`ConfigRouteMatcher`] precompiles a table once and implements the trait
//!
//! ## Branch Semantics
//!
//! At every level the first matching route wins, and matching descends into
//! its children. A route without a path inherits its parent's match, or the
//! root match at the top level.

mod pattern;

pub use pattern::{MatchOptions, PathPattern, match_path};

use crate::SyncError;
use crate::primitives::{MAX_ROUTE_DEPTH, ROOT_PATH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// MATCH TYPES
// =============================================================================

/// Result of matching a pattern against a pathname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// The pattern that matched.
    pub path: String,
    /// The matched portion of the pathname.
    pub url: String,
    /// True when the pattern consumed the whole pathname.
    pub is_exact: bool,
    /// Extracted parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Match {
    /// Match used for pathless routes at the top level.
    #[must_use]
    pub fn root(pathname: &str) -> Self {
        Self {
            path: ROOT_PATH.to_string(),
            url: ROOT_PATH.to_string(),
            is_exact: pathname == ROOT_PATH,
            params: BTreeMap::new(),
        }
    }
}

/// One element of a matched branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRoute {
    /// The matched route, without its children.
    pub route: RouteConfig,
    /// How it matched.
    #[serde(rename = "match")]
    pub route_match: Match,
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// A node in a nested route table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Pattern; `None` makes the route inherit its parent's match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Optional identifier, useful for lookups by the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exact: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sensitive: bool,
    /// Child routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteConfig>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RouteConfig {
    /// Route matching `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Route without a path (always matches within its parent).
    #[must_use]
    pub fn pathless() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: Vec<RouteConfig>) -> Self {
        self.routes = routes;
        self
    }

    /// The matching flags of this route.
    #[must_use]
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            exact: self.exact,
            strict: self.strict,
            sensitive: self.sensitive,
        }
    }

    /// Pattern to match with; an empty path counts as no path.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| !path.is_empty())
    }

    /// Copy of this route without children.
    #[must_use]
    pub fn leaf(&self) -> Self {
        Self {
            routes: Vec::new(),
            ..self.clone()
        }
    }
}

// =============================================================================
// ROUTE MATCHER TRAIT
// =============================================================================

/// Pluggable route-matching strategy.
///
/// The route table is bound when the matcher is built; the dispatcher only
/// supplies the pathname. Returns the matched branch in order, outermost
/// first.
pub trait RouteMatcher {
    fn match_routes(&self, pathname: &str) -> Vec<MatchedRoute>;
}

impl<F> RouteMatcher for F
where
    F: Fn(&str) -> Vec<MatchedRoute>,
{
    fn match_routes(&self, pathname: &str) -> Vec<MatchedRoute> {
        self(pathname)
    }
}

/// First branch element whose match is exact.
#[must_use]
pub fn select_exact(matches: &[MatchedRoute]) -> Option<Match> {
    matches
        .iter()
        .find(|candidate| candidate.route_match.is_exact)
        .map(|candidate| candidate.route_match.clone())
}

// =============================================================================
// AD-HOC MATCHING
// =============================================================================

/// Match `pathname` against a route table, compiling patterns as it goes.
///
/// Prefer [`ConfigRouteMatcher`] when the same table is matched repeatedly.
pub fn match_routes(
    routes: &[RouteConfig],
    pathname: &str,
) -> Result<Vec<MatchedRoute>, SyncError> {
    let mut branch = Vec::new();
    walk_config(routes, pathname, 0, &mut branch)?;
    Ok(branch)
}

fn walk_config(
    routes: &[RouteConfig],
    pathname: &str,
    depth: usize,
    branch: &mut Vec<MatchedRoute>,
) -> Result<(), SyncError> {
    if depth >= MAX_ROUTE_DEPTH {
        return Err(SyncError::RouteTableTooDeep(MAX_ROUTE_DEPTH));
    }

    for route in routes {
        let matched = match route.pattern() {
            Some(path) => match_path(pathname, path, route.options())?,
            None => inherited_match(branch, pathname),
        };

        if let Some(route_match) = matched {
            branch.push(MatchedRoute {
                route: route.leaf(),
                route_match,
            });
            return walk_config(&route.routes, pathname, depth + 1, branch);
        }
    }
    Ok(())
}

fn inherited_match(branch: &[MatchedRoute], pathname: &str) -> Option<Match> {
    Some(
        branch
            .last()
            .map(|parent| parent.route_match.clone())
            .unwrap_or_else(|| Match::root(pathname)),
    )
}

// =============================================================================
// PRECOMPILED MATCHER
// =============================================================================

#[derive(Debug, Clone)]
struct CompiledRoute {
    config: RouteConfig,
    pattern: Option<PathPattern>,
    children: Vec<CompiledRoute>,
}

/// Route matcher over a precompiled route table.
#[derive(Debug, Clone)]
pub struct ConfigRouteMatcher {
    routes: Vec<CompiledRoute>,
}

impl ConfigRouteMatcher {
    /// Compile every pattern in `routes`.
    ///
    /// Fails on the first invalid pattern or when the table is nested deeper
    /// than [`MAX_ROUTE_DEPTH`].
    pub fn new(routes: &[RouteConfig]) -> Result<Self, SyncError> {
        Ok(Self {
            routes: compile_level(routes, 0)?,
        })
    }

    /// Number of routes in the table, children included.
    #[must_use]
    pub fn route_count(&self) -> usize {
        fn count(routes: &[CompiledRoute]) -> usize {
            routes.iter().map(|r| 1 + count(&r.children)).sum()
        }
        count(&self.routes)
    }
}

fn compile_level(routes: &[RouteConfig], depth: usize) -> Result<Vec<CompiledRoute>, SyncError> {
    if depth >= MAX_ROUTE_DEPTH {
        return Err(SyncError::RouteTableTooDeep(MAX_ROUTE_DEPTH));
    }

    routes
        .iter()
        .map(|route| -> Result<CompiledRoute, SyncError> {
            let pattern = route
                .pattern()
                .map(|path| PathPattern::compile(path, route.options()))
                .transpose()?;
            Ok(CompiledRoute {
                config: route.leaf(),
                pattern,
                children: compile_level(&route.routes, depth + 1)?,
            })
        })
        .collect()
}

impl RouteMatcher for ConfigRouteMatcher {
    fn match_routes(&self, pathname: &str) -> Vec<MatchedRoute> {
        let mut branch = Vec::new();
        let mut level = self.routes.as_slice();

        'levels: loop {
            for route in level {
                let matched = match &route.pattern {
                    Some(pattern) => pattern.matches(pathname),
                    None => inherited_match(&branch, pathname),
                };
                if let Some(route_match) = matched {
                    branch.push(MatchedRoute {
                        route: route.config.clone(),
                        route_match,
                    });
                    level = route.children.as_slice();
                    continue 'levels;
                }
            }
            break;
        }
        branch
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<RouteConfig> {
        vec![
            RouteConfig::new("/").exact().named("home"),
            RouteConfig::new("/users").named("users").with_routes(vec![
                RouteConfig::new("/users/:id").exact().named("user"),
                RouteConfig::new("/users/:id/posts").named("posts"),
            ]),
            RouteConfig::new("/test").named("test"),
        ]
    }

    fn names(branch: &[MatchedRoute]) -> Vec<String> {
        branch
            .iter()
            .filter_map(|m| m.route.name.clone())
            .collect()
    }

    #[test]
    fn first_match_per_level_wins() {
        let branch = match_routes(&table(), "/users/42").expect("match");
        assert_eq!(names(&branch), vec!["users", "user"]);
        assert!(!branch[0].route_match.is_exact);
        assert!(branch[1].route_match.is_exact);
    }

    #[test]
    fn child_routes_are_stripped_from_branch() {
        let branch = match_routes(&table(), "/users").expect("match");
        assert!(branch[0].route.routes.is_empty());
    }

    #[test]
    fn unmatched_pathname_yields_empty_branch() {
        let branch = match_routes(&table(), "/nowhere").expect("match");
        assert!(branch.is_empty());
        assert!(select_exact(&branch).is_none());
    }

    #[test]
    fn pathless_route_inherits_parent_match() {
        let routes = vec![RouteConfig::new("/app").with_routes(vec![
            RouteConfig::pathless().named("layout"),
        ])];
        let branch = match_routes(&routes, "/app").expect("match");
        assert_eq!(branch.len(), 2);
        assert_eq!(branch[1].route_match, branch[0].route_match);
    }

    #[test]
    fn pathless_top_level_route_uses_root_match() {
        let routes = vec![RouteConfig::pathless().named("shell")];
        let branch = match_routes(&routes, "/").expect("match");
        assert_eq!(branch[0].route_match, Match::root("/"));
        assert!(branch[0].route_match.is_exact);

        let nested = match_routes(&routes, "/deep").expect("match");
        assert!(!nested[0].route_match.is_exact);
    }

    #[test]
    fn empty_path_is_pathless() {
        let routes = vec![RouteConfig::new("").named("shell").with_routes(vec![
            RouteConfig::new("").named("layout"),
        ])];

        let branch = match_routes(&routes, "/x").expect("match");
        assert_eq!(names(&branch), vec!["shell", "layout"]);
        assert_eq!(branch[0].route_match, Match::root("/x"));
        assert!(!branch[0].route_match.is_exact);
        assert_eq!(branch[1].route_match, branch[0].route_match);

        let matcher = ConfigRouteMatcher::new(&routes).expect("compile");
        assert_eq!(matcher.match_routes("/x"), branch);
    }

    #[test]
    fn select_exact_picks_first_exact() {
        let branch = match_routes(&table(), "/test").expect("match");
        let selected = select_exact(&branch).expect("exact");
        assert_eq!(selected.path, "/test");
        assert_eq!(selected.url, "/test");
    }

    #[test]
    fn compiled_matcher_agrees_with_ad_hoc_walk() {
        let matcher = ConfigRouteMatcher::new(&table()).expect("compile");
        for pathname in ["/", "/users", "/users/7", "/users/7/posts", "/test", "/x"] {
            assert_eq!(
                matcher.match_routes(pathname),
                match_routes(&table(), pathname).expect("match"),
                "pathname {pathname}"
            );
        }
        assert_eq!(matcher.route_count(), 5);
    }

    #[test]
    fn invalid_pattern_fails_at_build_time() {
        let routes = vec![RouteConfig::new("/ok").with_routes(vec![RouteConfig::new("bad")])];
        assert!(matches!(
            ConfigRouteMatcher::new(&routes),
            Err(SyncError::InvalidRoutePattern(_))
        ));
    }

    #[test]
    fn overly_deep_table_is_rejected() {
        let mut route = RouteConfig::new("/leaf");
        for _ in 0..MAX_ROUTE_DEPTH {
            route = RouteConfig::new("/").with_routes(vec![route]);
        }
        assert!(matches!(
            ConfigRouteMatcher::new(&[route]),
            Err(SyncError::RouteTableTooDeep(MAX_ROUTE_DEPTH))
        ));
    }

    #[test]
    fn closures_are_matchers() {
        let matcher = |pathname: &str| -> Vec<MatchedRoute> {
            vec![MatchedRoute {
                route: RouteConfig::new(pathname),
                route_match: Match::root(pathname),
            }]
        };
        assert_eq!(matcher.match_routes("/").len(), 1);
    }

    #[test]
    fn route_table_loads_from_json_shape() {
        let routes: Vec<RouteConfig> = serde_json::from_str(
            r#"[{"path": "/a", "exact": true, "routes": [{"path": "/a/:b"}]}]"#,
        )
        .expect("parse");
        assert!(routes[0].exact);
        assert_eq!(routes[0].routes[0].path.as_deref(), Some("/a/:b"));
    }
}
