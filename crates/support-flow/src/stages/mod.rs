//! LLM-backed pipeline stages.
//!
//! Each stage owns one gateway round-trip plus the defensive parse of its
//! result. Transport failures propagate; content failures degrade to the
//! stage's documented fallback. No stage mutates shared state.

pub mod intake;
pub mod routing;
pub mod summarize;

pub use intake::IntakeStage;
pub use routing::RoutingStage;
pub use summarize::SummarizeStage;
