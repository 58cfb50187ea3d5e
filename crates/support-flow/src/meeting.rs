//! Swarm room allocation: the one deterministic, non-LLM stage.
//!
//! Deterministic except for the random meeting token. Duplicate invitees
//! are a data error upstream and are passed through untouched.

use tracing::debug;
use uuid::Uuid;

use crate::contracts::{ExpertRouting, SwarmRoom, Ticket};

/// Relative hint only; calendar slot resolution is a downstream concern.
pub const SUGGESTED_TIME_HINT: &str = "within the next 30 minutes";

const MEETING_BASE_URL: &str = "https://meet.internal/swarm";

/// Allocate a swarm room for a routed ticket.
///
/// The meeting link carries a UUIDv4 token (16 random bytes), so link
/// collisions across invocations are negligible. Invitees are the primary
/// expert followed by the backups, order preserved.
pub fn create_room(ticket: &Ticket, routing: &ExpertRouting) -> SwarmRoom {
    let token = Uuid::new_v4().simple().to_string();

    let mut invitees = Vec::with_capacity(1 + routing.backup_experts.len());
    invitees.push(routing.primary_expert.clone());
    invitees.extend(routing.backup_experts.iter().cloned());

    debug!(
        severity = %ticket.severity,
        invitees = invitees.len(),
        "swarm room allocated"
    );

    SwarmRoom {
        meeting_link: format!("{MEETING_BASE_URL}/{token}"),
        invitees,
        suggested_time: SUGGESTED_TIME_HINT.to_string(),
    }
}
