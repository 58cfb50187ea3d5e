//! Error taxonomy with retry classification.
//!
//! The core distinction: transport failures (network, timeout, 5xx) are
//! flow-level errors that may be retried with backoff; content failures
//! (malformed model output) never reach this module — they resolve to a
//! stage fallback inside [`crate::extract`] and are only logged.
//!
//! | Category  | Retriable |
//! |-----------|-----------|
//! | Transient | yes, with backoff |
//! | RateLimit | yes, with longer backoff |
//! | Cancelled | no |
//! | Fatal     | no |

use std::fmt;

use thiserror::Error;

use crate::state::IllegalTransition;

/// Classification used by callers to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Transient network / backend error — safe to retry with backoff.
    Transient,
    /// Backend rate limit — retry with longer backoff.
    RateLimit,
    /// Explicitly cancelled by the caller — terminal.
    Cancelled,
    /// Not retriable.
    Fatal,
}

impl RetryCategory {
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimit)
    }
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Transport-level failure talking to the completion backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request never completed: connect error, timeout, or body decode.
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("completion backend returned HTTP {status}")]
    Http { status: u16 },

    /// Backend answered 200 but with no choices to read.
    #[error("completion backend returned an empty response")]
    EmptyCompletion,

    /// The flow was cancelled while the call was in flight.
    #[error("cancelled while awaiting completion")]
    Cancelled,
}

impl GatewayError {
    /// Whether this failure is worth retrying at the transport layer.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status } => *status >= 500 || *status == 429,
            Self::EmptyCompletion | Self::Cancelled => false,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::Transport(_) => RetryCategory::Transient,
            Self::Http { status: 429 } => RetryCategory::RateLimit,
            Self::Http { status } if *status >= 500 => RetryCategory::Transient,
            Self::Http { .. } | Self::EmptyCompletion => RetryCategory::Fatal,
            Self::Cancelled => RetryCategory::Cancelled,
        }
    }
}

/// Unified error type for a flow invocation.
///
/// Parse failures are deliberately absent: they are recovered locally via
/// stage fallbacks and never surfaced to the caller as errors.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The completion gateway failed at the transport level after
    /// exhausting its retry budget.
    #[error("completion gateway: {0}")]
    Gateway(#[from] GatewayError),

    /// The controller attempted an illegal state transition. Indicates a
    /// wiring bug, not bad input.
    #[error("flow state machine: {0}")]
    State(#[from] IllegalTransition),

    /// Anything else (config load, IO at the boundary).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FlowError {
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::Gateway(e) => e.retry_category(),
            Self::State(_) => RetryCategory::Fatal,
            Self::Internal(_) => RetryCategory::Transient,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.retry_category().is_retriable()
    }
}
