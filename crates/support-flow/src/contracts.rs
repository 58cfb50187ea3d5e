//! Typed contracts flowing between pipeline stages.
//!
//! Every LLM-backed stage coerces untrusted completion output into one of
//! these structs before the flow controller consumes it. Malformed output
//! never surfaces as an error — each contract carries a documented fallback
//! constructor so its stage degrades independently (fail toward human
//! escalation, never toward a stalled flow).
//!
//! Wire format is camelCase JSON; the prompts ask the model for the same
//! keys, so one serde shape covers both the model boundary and the caller
//! boundary.

use serde::{Deserialize, Serialize};

/// Maximum clarifying questions kept on a ticket.
pub const MAX_CLARIFYING_QUESTIONS: usize = 3;

/// Characters of the raw message kept as the fallback ticket summary.
pub const FALLBACK_SUMMARY_CHARS: usize = 120;

/// Always-valid routing fallback: generic platform oncall.
pub const FALLBACK_PRIMARY_EXPERT: &str = "sap-basis-core";
/// Backup for the routing fallback.
pub const FALLBACK_BACKUP_EXPERT: &str = "sap-hana-high-availability-oncall";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw incident report handed to the flow. Created once per invocation,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportMessage {
    /// Unstructured text from the customer or reporting system.
    pub message: String,
    /// Optional caller-supplied context forwarded to the intake prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Request redaction of identifying details in generated notes.
    #[serde(default)]
    pub info_down: bool,
}

impl SupportMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            customer_metadata: None,
            info_down: false,
        }
    }

    pub fn with_info_down(mut self, info_down: bool) -> Self {
        self.info_down = info_down;
        self
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// Incident severity, P1 highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "p1")]
    P1,
    #[serde(alias = "p2")]
    P2,
    #[serde(alias = "p3")]
    P3,
    #[serde(alias = "p4")]
    P4,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P1 => write!(f, "P1"),
            Self::P2 => write!(f, "P2"),
            Self::P3 => write!(f, "P3"),
            Self::P4 => write!(f, "P4"),
        }
    }
}

/// Structured representation of a support request extracted from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub summary: String,
    pub severity: Severity,
    pub needs_escalation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
}

impl Ticket {
    /// Conservative fallback when intake extraction fails: keep a truncated
    /// echo of the raw message and escalate to a human.
    pub fn fallback_for(message: &str) -> Self {
        Self {
            summary: truncate_chars(message, FALLBACK_SUMMARY_CHARS),
            severity: Severity::P3,
            needs_escalation: true,
            product: None,
            clarifying_questions: Vec::new(),
        }
    }

    /// Enforce the clarifying-question bound after extraction.
    pub fn normalize(&mut self) {
        if self.clarifying_questions.len() > MAX_CLARIFYING_QUESTIONS {
            self.clarifying_questions.truncate(MAX_CLARIFYING_QUESTIONS);
        }
    }
}

/// Char-boundary-safe prefix truncation.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// One entry in the read-only expert directory. Static configuration,
/// loaded once at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertDirectoryEntry {
    pub id: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Routing decision: which expert owns the swarm, plus backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertRouting {
    pub primary_expert: String,
    #[serde(default)]
    pub backup_experts: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

impl ExpertRouting {
    /// Deliberately generic, always-valid routing used when the model's
    /// choice cannot be parsed or names an unknown expert.
    pub fn fallback() -> Self {
        Self {
            primary_expert: FALLBACK_PRIMARY_EXPERT.into(),
            backup_experts: vec![FALLBACK_BACKUP_EXPERT.into()],
            rationale: "fallback routing".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Meeting / notes
// ---------------------------------------------------------------------------

/// Ad hoc multi-expert collaboration session for a specific ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmRoom {
    /// Unique per invocation (random token in the path).
    pub meeting_link: String,
    /// Primary first, then backups, order preserved.
    pub invitees: Vec<String>,
    /// Human-readable relative hint; calendar resolution happens downstream.
    pub suggested_time: String,
}

/// Structured meeting notes produced from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantNotes {
    pub summary: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl AssistantNotes {
    pub fn fallback() -> Self {
        Self {
            summary: "unable to parse meeting summary".into(),
            decisions: Vec::new(),
            action_items: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Final flow output. The optional fields are populated only when the
/// ticket escalated; their absence is a valid terminal outcome
/// (self-service resolution), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportFlowResult {
    pub ticket: Ticket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_routing: Option<ExpertRouting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_room: Option<SwarmRoom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_notes: Option<AssistantNotes>,
}

impl SupportFlowResult {
    /// Terminal self-service outcome: only the ticket is populated.
    pub fn resolved(ticket: Ticket) -> Self {
        Self {
            ticket,
            expert_routing: None,
            swarm_room: None,
            assistant_notes: None,
        }
    }

    pub fn is_escalated(&self) -> bool {
        self.expert_routing.is_some()
    }
}
