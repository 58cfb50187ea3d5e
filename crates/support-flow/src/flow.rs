//! Flow controller: sequences the stages and applies the escalation
//! policy.
//!
//! This is the only component with branching logic. Each stage honors the
//! no-throw contract for content failures, so the controller needs no
//! global catch clause — the only errors that reach it are transport
//! failures and state-machine wiring bugs.

use std::sync::Arc;

use tracing::info;

use crate::config::FlowConfig;
use crate::contracts::{ExpertDirectoryEntry, SupportFlowResult, SupportMessage};
use crate::errors::FlowError;
use crate::gateway::CompletionGateway;
use crate::knowledge::{self, KnowledgeSink};
use crate::meeting;
use crate::policy;
use crate::stages::{IntakeStage, RoutingStage, SummarizeStage};
use crate::state::{FlowState, FlowStateMachine};

/// Orchestrates one support flow invocation.
///
/// Holds no mutable state across invocations — the expert directory is
/// immutable configuration — so a single controller can serve concurrent
/// flows behind an `Arc`.
pub struct FlowController {
    intake: IntakeStage,
    routing: RoutingStage,
    summarize: SummarizeStage,
    sink: Arc<dyn KnowledgeSink>,
}

impl FlowController {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        directory: Vec<ExpertDirectoryEntry>,
        sink: Arc<dyn KnowledgeSink>,
    ) -> Self {
        Self {
            intake: IntakeStage::new(Arc::clone(&gateway)),
            routing: RoutingStage::new(Arc::clone(&gateway), directory),
            summarize: SummarizeStage::new(gateway),
            sink,
        }
    }

    /// Convenience constructor pulling the directory from config.
    pub fn from_config(
        config: &FlowConfig,
        gateway: Arc<dyn CompletionGateway>,
        sink: Arc<dyn KnowledgeSink>,
    ) -> Self {
        Self::new(gateway, config.directory.clone(), sink)
    }

    /// Run one flow: intake, policy branch, then — if escalating —
    /// routing, room creation, summarization, and knowledge capture in
    /// strict sequence.
    ///
    /// The transcript is supplied by the caller (demo harness or API
    /// layer); it is only consumed on the escalated path. The knowledge
    /// write is dispatched fire-and-forget — the returned result does not
    /// wait on sink acknowledgement.
    pub async fn run(
        &self,
        msg: &SupportMessage,
        transcript: &str,
    ) -> Result<SupportFlowResult, FlowError> {
        let mut sm = FlowStateMachine::new();

        let ticket = self.intake.run(msg).await?;

        if policy::resolves_at_intake(&ticket) {
            sm.advance(FlowState::Resolved, Some("P3 without escalation"))?;
            info!(path = %sm.summary(), "support flow resolved at intake");
            return Ok(SupportFlowResult::resolved(ticket));
        }

        sm.advance(
            FlowState::Routing,
            Some(&format!("{} escalating", ticket.severity)),
        )?;
        let routing = self.routing.run(&ticket).await?;

        sm.advance(FlowState::MeetingCreated, None)?;
        let room = meeting::create_room(&ticket, &routing);

        sm.advance(FlowState::Summarized, None)?;
        let notes = self.summarize.run(transcript, msg.info_down).await?;

        sm.advance(FlowState::Recorded, None)?;
        knowledge::record_detached(
            Arc::clone(&self.sink),
            ticket.clone(),
            Some(notes.clone()),
        );

        info!(
            path = %sm.summary(),
            primary = %routing.primary_expert,
            "support flow escalated"
        );

        Ok(SupportFlowResult {
            ticket,
            expert_routing: Some(routing),
            swarm_room: Some(room),
            assistant_notes: Some(notes),
        })
    }
}
