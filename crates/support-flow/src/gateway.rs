//! Completion gateway: the only suspension point in the flow.
//!
//! The trait is deliberately minimal — any backend that can turn a system
//! instruction plus user content into raw text is substitutable, and the
//! orchestrator must not depend on response formatting beyond "a JSON
//! object may appear somewhere in the text".
//!
//! `HttpGateway` talks to an OpenAI-compatible `/chat/completions`
//! endpoint. Transport failures (connect, timeout, 5xx, 429) are retried
//! with exponential backoff up to the configured budget and then
//! propagated; content problems are never handled here — they belong to
//! [`crate::extract`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::errors::GatewayError;

const BACKOFF_BASE_MS: u64 = 250;
const COMPLETION_TEMPERATURE: f32 = 0.2;

/// Text-completion boundary used by every LLM-backed stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send a system instruction plus user content, return raw text.
    async fn generate(&self, system: &str, user: &str) -> Result<String, GatewayError>;
}

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// HttpGateway
// ---------------------------------------------------------------------------

/// Reqwest-backed gateway with per-call timeout, bounded transport
/// retries, and cooperative cancellation.
///
/// Process-wide lifecycle: build once at startup and share (`Arc`) across
/// concurrent flow invocations — the gateway holds no per-flow state.
pub struct HttpGateway {
    client: reqwest::Client,
    completions_url: String,
    model: String,
    api_key: Option<String>,
    max_transport_retries: u32,
    cancel: CancellationToken,
}

impl HttpGateway {
    pub fn new(config: &FlowConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                config.endpoint.url.trim_end_matches('/')
            ),
            model: config.endpoint.model.clone(),
            api_key: config.endpoint.api_key.clone(),
            max_transport_retries: config.max_transport_retries,
            cancel: CancellationToken::new(),
        })
    }

    /// Token an embedding server can use to abort in-flight calls (e.g.
    /// on client disconnect). Completed stage outputs are not rolled back.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn try_generate(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
        };

        let mut builder = self.client.post(&self.completions_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(GatewayError::Cancelled),
            result = builder.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyCompletion)?;
        Ok(choice.message.content)
    }
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let mut attempt: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(GatewayError::Cancelled);
            }

            match self.try_generate(system, user).await {
                Ok(text) => {
                    debug!(attempt, chars = text.len(), "completion received");
                    return Ok(text);
                }
                Err(e) if e.is_transport() && attempt < self.max_transport_retries => {
                    let backoff = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transport failure, retrying"
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => return Err(GatewayError::Cancelled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
