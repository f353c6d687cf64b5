//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{RouteFile, Scenario};
use crate::replay::{ReplayReport, StepReport, replay};
use routesync_core::{MatchedRoute, RouteMatcher, RouterAction, SyncError, select_exact};
use std::fmt::Write as _;
use std::path::Path;

// =============================================================================
// REPLAY COMMAND
// =============================================================================

/// Replay a scenario and print every dispatch and correction.
pub fn cmd_replay(path: &Path, json_mode: bool) -> Result<(), SyncError> {
    let scenario = Scenario::load(path)?;
    let report = replay(&scenario)?;

    if json_mode {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    print!("{}", render_replay(&report));
    Ok(())
}

/// Human-readable replay transcript.
pub fn render_replay(report: &ReplayReport) -> String {
    let mut out = String::new();
    out.push_str("routesync Replay\n");
    out.push_str("================\n");

    for step in &report.steps {
        render_step(&mut out, step);
    }

    out.push('\n');
    let _ = writeln!(out, "Dispatches:        {}", report.total_dispatches());
    let _ = writeln!(out, "Corrective pushes: {}", report.total_corrective_pushes());
    let _ = writeln!(out, "Final location:    {}", report.final_state.location);
    out
}

fn render_step(out: &mut String, step: &StepReport) {
    let _ = writeln!(out, "[{}] {}", step.index, step.step);
    for action in &step.dispatched {
        let _ = writeln!(out, "    dispatch {}", describe_action(action));
    }
    if step.corrective_pushes > 0 {
        let _ = writeln!(
            out,
            "    corrective push x{} -> {}",
            step.corrective_pushes, step.navigation_location
        );
    }
    let sync = match (step.active, step.in_sync) {
        (false, _) => "inactive",
        (true, true) => "in sync",
        (true, false) => "DIVERGED",
    };
    let _ = writeln!(
        out,
        "    store {} | navigation {} | {}",
        step.store_location, step.navigation_location, sync
    );
}

fn describe_action(action: &RouterAction) -> String {
    let payload = action.payload();
    let mut line = format!(
        "{} {} {}",
        action.action_type(),
        payload.action,
        payload.location
    );
    if let Some(route_match) = &payload.route_match {
        let _ = write!(line, " match={}", route_match.path);
    }
    if payload.is_first_rendering {
        line.push_str(" (first rendering)");
    }
    line
}

// =============================================================================
// MATCH COMMAND
// =============================================================================

/// Match a pathname against a route file.
pub fn cmd_match(routes: &Path, pathname: &str, json_mode: bool) -> Result<(), SyncError> {
    let matcher = RouteFile::load(routes)?.matcher()?;
    let branch = matcher.match_routes(pathname);
    let exact = select_exact(&branch);

    tracing::debug!(
        pathname,
        routes = matcher.route_count(),
        matched = branch.len(),
        "Route table matched"
    );

    if json_mode {
        let output = serde_json::json!({
            "pathname": pathname,
            "matchedRoutes": branch,
            "match": exact,
        });
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    print!("{}", render_branch(pathname, &branch));
    Ok(())
}

/// Human-readable matched branch.
pub fn render_branch(pathname: &str, branch: &[MatchedRoute]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pathname: {}", pathname);

    if branch.is_empty() {
        out.push_str("No route matched\n");
        return out;
    }

    for (depth, matched) in branch.iter().enumerate() {
        let route_match = &matched.route_match;
        let label = matched
            .route
            .name
            .as_deref()
            .or(matched.route.path.as_deref())
            .unwrap_or("(pathless)");
        let _ = write!(
            out,
            "{:indent$}{} url={} exact={}",
            "",
            label,
            route_match.url,
            route_match.is_exact,
            indent = depth * 2
        );
        for (key, value) in &route_match.params {
            let _ = write!(out, " {}={}", key, value);
        }
        out.push('\n');
    }

    match select_exact(branch) {
        Some(exact) => {
            let _ = writeln!(out, "Match: {}", exact.path);
        }
        None => out.push_str("Match: none\n"),
    }
    out
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a scenario file.
pub fn cmd_check(path: &Path, json_mode: bool) -> Result<(), SyncError> {
    let scenario = Scenario::load(path)?;
    let route_count = scenario
        .matcher()?
        .map(|matcher| matcher.route_count())
        .unwrap_or(0);

    if json_mode {
        let output = serde_json::json!({
            "valid": true,
            "initial": scenario.initial,
            "steps": scenario.steps.len(),
            "routes": route_count,
        });
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    println!("Scenario OK");
    println!("  Initial: {}", scenario.initial);
    println!("  Steps:   {}", scenario.steps.len());
    println!("  Routes:  {}", route_count);
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SyncError> {
    serde_json::to_string_pretty(value).map_err(|e| SyncError::SerializationError(e.to_string()))
}
