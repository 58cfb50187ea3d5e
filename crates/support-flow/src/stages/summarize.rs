//! Meeting summarization: transcript → structured notes.

use std::sync::Arc;

use tracing::debug;

use crate::contracts::AssistantNotes;
use crate::errors::FlowError;
use crate::extract::extract_or;
use crate::gateway::CompletionGateway;
use crate::prompts;

/// Converts a transcript into summary / decisions / action items.
///
/// When `info_down` is set the redaction request is embedded in the
/// instruction text. That is a request to the model, not a guarantee —
/// no local redaction pass is applied to the output.
pub struct SummarizeStage {
    gateway: Arc<dyn CompletionGateway>,
}

impl SummarizeStage {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    pub async fn run(&self, transcript: &str, info_down: bool) -> Result<AssistantNotes, FlowError> {
        let instruction = prompts::summary_instruction(info_down);
        let raw = self.gateway.generate(&instruction, transcript).await?;

        let notes = extract_or(&raw, AssistantNotes::fallback());
        debug!(
            decisions = notes.decisions.len(),
            action_items = notes.action_items.len(),
            info_down,
            "transcript summarized"
        );
        Ok(notes)
    }
}
