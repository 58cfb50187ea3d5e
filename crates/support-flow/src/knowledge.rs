//! Knowledge capture: fire-and-forget recording of resolved tickets.
//!
//! The sink write must never block or fail the caller's response. Sink
//! errors are logged at `warn` and dropped — the flow result is already
//! on its way back to the caller when the write lands.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::contracts::{AssistantNotes, Ticket};
use crate::prompts::PROMPT_VERSION;

/// Append-only store for resolved tickets and their notes.
///
/// Contract: accepts a ticket and optional notes, reports success or
/// failure, and is only ever invoked detached from the caller's response.
#[async_trait]
pub trait KnowledgeSink: Send + Sync {
    async fn record(&self, ticket: &Ticket, notes: Option<&AssistantNotes>) -> anyhow::Result<()>;
}

/// One persisted knowledge entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRecord {
    pub recorded_at: DateTime<Utc>,
    pub prompt_version: String,
    pub ticket: Ticket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<AssistantNotes>,
}

impl KnowledgeRecord {
    pub fn new(ticket: Ticket, notes: Option<AssistantNotes>) -> Self {
        Self {
            recorded_at: Utc::now(),
            prompt_version: PROMPT_VERSION.to_string(),
            ticket,
            notes,
        }
    }
}

/// JSONL file sink: one record per line, append-only.
pub struct JsonlKnowledgeSink {
    path: PathBuf,
}

impl JsonlKnowledgeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl KnowledgeSink for JsonlKnowledgeSink {
    async fn record(&self, ticket: &Ticket, notes: Option<&AssistantNotes>) -> anyhow::Result<()> {
        let record = KnowledgeRecord::new(ticket.clone(), notes.cloned());
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Dispatch a sink write detached from the caller's response.
///
/// Returns the join handle so tests can await best-effort completion;
/// production callers drop it.
pub fn record_detached(
    sink: Arc<dyn KnowledgeSink>,
    ticket: Ticket,
    notes: Option<AssistantNotes>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match sink.record(&ticket, notes.as_ref()).await {
            Ok(()) => debug!(summary = %ticket.summary, "knowledge record written"),
            Err(e) => warn!(error = %e, "knowledge sink write failed"),
        }
    })
}
