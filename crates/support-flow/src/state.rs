//! Flow state machine — explicit states and legal transition guards.
//!
//! Gives the controller a typed state model so that:
//! 1. Every transition is auditable and logged.
//! 2. Skipped stages are caught as `IllegalTransition` rather than
//!    silently producing a half-populated result.
//!
//! The graph has exactly one branch, at intake:
//! ```text
//! Intake → Resolved                                          (self-service)
//! Intake → Routing → MeetingCreated → Summarized → Recorded  (escalated)
//! ```

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The set of flow states.
///
/// Every run starts at `Intake` and terminates at either `Resolved`
/// (self-service) or `Recorded` (escalated, swarm complete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// Extracting a structured ticket from the raw message.
    Intake,
    /// Mapping the ticket to a primary expert and backups.
    Routing,
    /// Swarm room allocated, invitees assembled.
    MeetingCreated,
    /// Transcript converted into structured notes.
    Summarized,
    /// Resolution handed to the knowledge sink — terminal state.
    Recorded,
    /// Self-service resolution at intake — terminal state.
    Resolved,
}

impl FlowState {
    /// Whether this is a terminal state (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Recorded)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intake => write!(f, "Intake"),
            Self::Routing => write!(f, "Routing"),
            Self::MeetingCreated => write!(f, "MeetingCreated"),
            Self::Summarized => write!(f, "Summarized"),
            Self::Recorded => write!(f, "Recorded"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

/// Legal transitions between flow states. The escalated path is strictly
/// sequential — no stage may be skipped.
fn is_legal_transition(from: FlowState, to: FlowState) -> bool {
    use FlowState::*;

    matches!(
        (from, to),
        (Intake, Resolved)
            | (Intake, Routing)
            | (Routing, MeetingCreated)
            | (MeetingCreated, Summarized)
            | (Summarized, Recorded)
    )
}

/// A single recorded state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: FlowState,
    pub to: FlowState,
    /// Milliseconds since the state machine was created.
    pub elapsed_ms: u64,
    /// Optional context about why this transition happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an illegal transition is attempted.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: FlowState,
    pub to: FlowState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal state transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Tracks the current state, enforces legal transitions, and keeps a
/// complete transition log for diagnostics.
pub struct FlowStateMachine {
    current: FlowState,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl FlowStateMachine {
    /// Create a new state machine starting at `Intake`.
    pub fn new() -> Self {
        Self {
            current: FlowState::Intake,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> FlowState {
        self.current
    }

    /// Attempt to advance to the next state.
    pub fn advance(&mut self, to: FlowState, reason: Option<&str>) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        let record = TransitionRecord {
            from: self.current,
            to,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        };

        tracing::debug!(from = %self.current, to = %to, "flow transition");

        self.transitions.push(record);
        self.current = to;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// The full transition log.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// One-line history summary for logging.
    pub fn summary(&self) -> String {
        let mut path = vec![FlowState::Intake.to_string()];
        path.extend(self.transitions.iter().map(|t| t.to.to_string()));
        format!(
            "{} ({}ms)",
            path.join(" → "),
            self.created_at.elapsed().as_millis()
        )
    }
}

impl Default for FlowStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
