//! # Scenario Replay
//!
//! Runs a [`Scenario`] against the in-memory store and history with a live
//! router binding, and reports what each step caused on both sides.
//!
//! Step 0 of every report is the activation handshake.

use crate::config::{Scenario, Step};
use routesync_core::{
    ActiveBinding, Location, MemoryHistory, MemoryStore, RouterAction, RouterBinding,
    RouterState, SyncError, initial_router_state, router_reducer,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

type RouterStore = MemoryStore<RouterState, RouterAction>;
type DispatchLog = Rc<RefCell<Vec<RouterAction>>>;

// =============================================================================
// REPORTS
// =============================================================================

/// Effect of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: String,
    /// Actions that reached the store during the step.
    pub dispatched: Vec<RouterAction>,
    /// Pushes issued by the divergence detector during the step.
    pub corrective_pushes: usize,
    pub store_location: String,
    pub navigation_location: String,
    pub in_sync: bool,
    pub active: bool,
}

/// Full replay outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub final_state: RouterState,
}

impl ReplayReport {
    pub fn total_dispatches(&self) -> usize {
        self.steps.iter().map(|s| s.dispatched.len()).sum()
    }

    pub fn total_corrective_pushes(&self) -> usize {
        self.steps.iter().map(|s| s.corrective_pushes).sum()
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay every step of `scenario`.
///
/// Fails on an out-of-range `jump` or on a step whose `expect` does not
/// match the store's location afterwards.
pub fn replay(scenario: &Scenario) -> Result<ReplayReport, SyncError> {
    let mut session = Session::start(scenario)?;
    let mut steps = vec![session.handshake()?];

    for (offset, step) in scenario.steps.iter().enumerate() {
        let report = session.run(offset + 1, step)?;

        match step.expect() {
            Some(expected)
                if !Location::parse(expected).same_place(&session.store.state().location) =>
            {
                return Err(SyncError::ConfigError(format!(
                    "steps[{}] ({}): expected store at '{}', found '{}'",
                    offset, step, expected, report.store_location
                )));
            }
            _ => {}
        }
        steps.push(report);
    }

    tracing::info!(
        steps = steps.len(),
        dispatched = steps.iter().map(|s| s.dispatched.len()).sum::<usize>(),
        "Scenario replayed"
    );

    Ok(ReplayReport {
        steps,
        final_state: (*session.store.state()).clone(),
    })
}

struct Session {
    store: Rc<RouterStore>,
    history: Rc<MemoryHistory>,
    log: DispatchLog,
    binding: RouterBinding<RouterStore, MemoryHistory>,
    active: Option<ActiveBinding<RouterStore, MemoryHistory>>,
}

impl Session {
    fn start(scenario: &Scenario) -> Result<Self, SyncError> {
        let history = Rc::new(MemoryHistory::new(Location::parse(&scenario.initial)));
        let log: DispatchLog = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&log);
        let store = Rc::new(MemoryStore::new(
            initial_router_state(history.as_ref()),
            move |state: &Rc<RouterState>, action: &RouterAction| {
                sink.borrow_mut().push(action.clone());
                router_reducer(state, action)
            },
        ));

        let mut binding = RouterBinding::new()
            .store(Rc::clone(&store))
            .navigation_source(Rc::clone(&history));
        if let Some(matcher) = scenario.matcher()? {
            binding = binding.route_matcher(Rc::new(matcher));
        }

        Ok(Self {
            store,
            history,
            log,
            binding,
            active: None,
        })
    }

    fn handshake(&mut self) -> Result<StepReport, SyncError> {
        self.run(0, &Step::Activate)
    }

    fn run(&mut self, index: usize, step: &Step) -> Result<StepReport, SyncError> {
        let logged = self.log.borrow().len();
        let pushes = self.history.push_count();

        match step {
            Step::Push { path, state, .. } => {
                self.history.push(step_location(path, state.as_ref()));
            }
            Step::Replace { path, state, .. } => {
                self.history.replace(step_location(path, state.as_ref()));
            }
            Step::Back { .. } => {
                if !self.history.go_back() {
                    tracing::warn!(step = index, "No earlier entry, back ignored");
                }
            }
            Step::Forward { .. } => {
                if !self.history.go_forward() {
                    tracing::warn!(step = index, "No later entry, forward ignored");
                }
            }
            Step::Jump { index: target, .. } => {
                let state = self.store.recorded_state(*target).ok_or_else(|| {
                    SyncError::ConfigError(format!(
                        "jump {}: only {} states recorded",
                        target,
                        self.store.recorded_len()
                    ))
                })?;
                self.store.replace_state(state);
            }
            Step::Deactivate => match self.active.take() {
                Some(active) => drop(active),
                None => tracing::warn!(step = index, "Binding already inactive"),
            },
            Step::Activate => {
                if self.active.is_some() {
                    tracing::warn!(step = index, "Binding already active");
                } else {
                    self.active = Some(self.binding.clone().activate()?);
                }
            }
        }

        let dispatched: Vec<RouterAction> = self.log.borrow()[logged..].to_vec();
        let explicit = usize::from(matches!(step, Step::Push { .. }));
        let corrective_pushes = self
            .history
            .push_count()
            .saturating_sub(pushes)
            .saturating_sub(explicit);

        let report = self.snapshot(index, step, dispatched, corrective_pushes);
        tracing::debug!(
            step = index,
            op = %report.step,
            dispatched = report.dispatched.len(),
            corrective_pushes = report.corrective_pushes,
            in_sync = report.in_sync,
            "Step replayed"
        );
        Ok(report)
    }

    fn snapshot(
        &self,
        index: usize,
        step: &Step,
        dispatched: Vec<RouterAction>,
        corrective_pushes: usize,
    ) -> StepReport {
        let state = self.store.state();
        let navigation = self.history.location();
        StepReport {
            index,
            step: step.to_string(),
            dispatched,
            corrective_pushes,
            store_location: state.location.to_path(),
            navigation_location: navigation.to_path(),
            in_sync: state.location.same_place(&navigation),
            active: self.active.is_some(),
        }
    }
}

fn step_location(path: &str, state: Option<&serde_json::Value>) -> Location {
    let location = Location::parse(path);
    match state {
        Some(state) => location.with_state(state.clone()),
        None => location,
    }
}
