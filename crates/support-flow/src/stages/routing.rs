//! Expert routing: ticket → primary expert + backups from the directory.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::contracts::{ExpertDirectoryEntry, ExpertRouting, Ticket};
use crate::directory;
use crate::errors::FlowError;
use crate::extract::extract_or_validated;
use crate::gateway::CompletionGateway;
use crate::prompts;

/// Maps a ticket to an expert routing decision.
///
/// The model is asked to choose only from the directory ids; a decoded
/// routing whose primary expert is not a directory member is rejected and
/// replaced by the fixed fallback, so `primary_expert` is always a known
/// id and the pipeline never stalls on a bad response.
pub struct RoutingStage {
    gateway: Arc<dyn CompletionGateway>,
    directory: Arc<Vec<ExpertDirectoryEntry>>,
}

impl RoutingStage {
    pub fn new(gateway: Arc<dyn CompletionGateway>, directory: Vec<ExpertDirectoryEntry>) -> Self {
        Self {
            gateway,
            directory: Arc::new(directory),
        }
    }

    pub async fn run(&self, ticket: &Ticket) -> Result<ExpertRouting, FlowError> {
        let request = prompts::routing_request(ticket, &self.directory);
        let raw = self
            .gateway
            .generate(prompts::ROUTING_PREAMBLE, &request)
            .await?;

        let routing = extract_or_validated(&raw, ExpertRouting::fallback(), |r: &ExpertRouting| {
            let known = directory::contains(&self.directory, &r.primary_expert);
            if !known {
                warn!(primary = %r.primary_expert, "model chose expert outside directory");
            }
            known
        });

        debug!(primary = %routing.primary_expert, backups = routing.backup_experts.len(), "ticket routed");
        Ok(routing)
    }
}
