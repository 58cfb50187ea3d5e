//! Support flow orchestrator.
//!
//! Turns an unstructured incident report into a routed, time-boxed
//! resolution workflow: ticket intake → escalation policy → expert
//! routing → swarm room → summarization → knowledge capture. Every
//! LLM-backed stage defensively parses the completion output and falls
//! back to a conservative default rather than failing the flow.

pub mod config;
pub mod contracts;
pub mod directory;
pub mod errors;
pub mod extract;
pub mod flow;
pub mod gateway;
pub mod knowledge;
pub mod meeting;
pub mod policy;
pub mod prompts;
pub mod stages;
pub mod state;

pub use contracts::{
    AssistantNotes, ExpertDirectoryEntry, ExpertRouting, Severity, SupportFlowResult,
    SupportMessage, SwarmRoom, Ticket,
};
pub use errors::{FlowError, GatewayError, RetryCategory};
pub use flow::FlowController;
pub use gateway::{CompletionGateway, HttpGateway};
pub use knowledge::{JsonlKnowledgeSink, KnowledgeSink};
