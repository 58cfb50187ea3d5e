//! Escalation policy: the single branch point of the flow.
//!
//! Pure and total over `Ticket` — no I/O, no panics. The bias is
//! fail-safe: only a P3 ticket the model positively marked as not needing
//! escalation resolves at intake. A low-severity P4 still escalates,
//! because "low severity" is not an assertion that the issue is resolved.

use crate::contracts::{Severity, Ticket};

/// The only severity considered safely self-serviceable.
pub const SELF_SERVICE_SEVERITY: Severity = Severity::P3;

/// Whether the flow stops at intake (self-service resolution).
///
/// Returns `true` iff `needs_escalation` is false and the severity is
/// exactly [`SELF_SERVICE_SEVERITY`]; every other combination continues
/// to expert routing.
pub fn resolves_at_intake(ticket: &Ticket) -> bool {
    !ticket.needs_escalation && ticket.severity == SELF_SERVICE_SEVERITY
}
