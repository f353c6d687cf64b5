//! # Reentrancy Guard
//!
//! Distinguishes navigation events that originate outside the engine from
//! the echo of the divergence detector's own corrective push.
//!
//! The guard is an explicit two-state machine rather than a bare flag:
//!
//! ```text
//!            arm()                    take_echo()
//!   Idle ─────────────▶ AwaitingEcho ─────────────▶ Idle
//! ```
//!
//! Sharing it through `Rc<Cell<_>>` is sound only because callbacks are
//! delivered synchronously on a single thread.

use std::cell::Cell;
use std::rc::Rc;

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoState {
    /// Next navigation event is external and must be dispatched.
    #[default]
    Idle,
    /// Next navigation event is the echo of a corrective push.
    AwaitingEcho,
}

/// Shared reentrancy token.
///
/// Clones share the same state. A fresh guard is allocated per activation.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    state: Rc<Cell<EchoState>>,
}

impl ReentrancyGuard {
    /// Create an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect the echo of a corrective push.
    pub fn arm(&self) {
        self.state.set(EchoState::AwaitingEcho);
    }

    /// Consume a pending echo.
    ///
    /// Returns `true` if the guard was armed; the guard is idle afterwards
    /// either way.
    pub fn take_echo(&self) -> bool {
        self.state.replace(EchoState::Idle) == EchoState::AwaitingEcho
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EchoState {
        self.state.get()
    }
}
