//! System instructions for each LLM-backed stage.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever instruction content
//! changes, so logs can trace which prompt revision produced a response.

use crate::contracts::{ExpertDirectoryEntry, SupportMessage, Ticket};

/// Prompt version. Bump on any instruction content change.
pub const PROMPT_VERSION: &str = "1.0.0";

/// Intake instruction: coerce a raw incident report into a ticket.
pub const INTAKE_PREAMBLE: &str = "\
You are a support ticket triage assistant. Extract a structured ticket from \
the incident report below. Respond with ONLY a single JSON object, no prose:

{
  \"summary\": \"one-sentence summary of the problem\",
  \"severity\": \"P1\" | \"P2\" | \"P3\" | \"P4\",
  \"needsEscalation\": true | false,
  \"product\": \"affected product, if identifiable\",
  \"clarifyingQuestions\": [\"up to three questions for the reporter\"]
}

Severity guide: P1 = critical outage, P2 = major degradation, P3 = normal \
issue, P4 = minor / cosmetic. Set needsEscalation to false only when you \
are confident the reporter can resolve the issue themselves.";

/// Routing instruction: pick a primary expert and backups from a fixed list.
pub const ROUTING_PREAMBLE: &str = "\
You are a support routing assistant. Given a ticket and a directory of \
experts, choose the best primary expert and up to two backups. You MUST \
choose only from the expert ids listed in the request. Respond with ONLY a \
single JSON object, no prose:

{
  \"primaryExpert\": \"expert-id\",
  \"backupExperts\": [\"expert-id\", \"expert-id\"],
  \"rationale\": \"one sentence on why\"
}";

const SUMMARY_PREAMBLE: &str = "\
You are a meeting summarization assistant. Convert the transcript below \
into structured notes. Respond with ONLY a single JSON object, no prose:

{
  \"summary\": \"short summary of the meeting\",
  \"decisions\": [\"decisions that were made\"],
  \"actionItems\": [\"follow-up actions with owners where stated\"]
}";

/// Marker appended to the summary instruction when redaction is requested.
/// Tests assert on this exact text; keep it in sync with
/// `summary_instruction`.
pub const REDACTION_CLAUSE: &str = "\
Redaction mode is ON: do NOT include company names, customer names, or \
user identifiers in any field. Refer to participants by role only.";

/// Build the summarization instruction, embedding the redaction request
/// when `info_down` is set. This is a request to the model, not a local
/// guarantee — no redaction pass is applied to its output.
pub fn summary_instruction(info_down: bool) -> String {
    if info_down {
        format!("{SUMMARY_PREAMBLE}\n\n{REDACTION_CLAUSE}")
    } else {
        SUMMARY_PREAMBLE.to_string()
    }
}

/// User content for the intake call: the raw message plus any caller
/// metadata.
pub fn intake_request(msg: &SupportMessage) -> String {
    match &msg.customer_metadata {
        Some(meta) if !meta.is_empty() => {
            let meta_json = serde_json::to_string(meta).unwrap_or_default();
            format!("{}\n\nCustomer metadata: {meta_json}", msg.message)
        }
        _ => msg.message.clone(),
    }
}

/// User content for the routing call: ticket context plus the directory.
pub fn routing_request(ticket: &Ticket, directory: &[ExpertDirectoryEntry]) -> String {
    let experts: Vec<String> = directory
        .iter()
        .map(|e| format!("- {} (skills: {})", e.id, e.skills.join(", ")))
        .collect();
    format!(
        "Ticket: {}\nSeverity: {}\nProduct: {}\n\nExpert directory:\n{}",
        ticket.summary,
        ticket.severity,
        ticket.product.as_deref().unwrap_or("unknown"),
        experts.join("\n")
    )
}
