//! CLI demo harness: run one support flow against a live completion
//! backend and print the result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use support_flow::config::FlowConfig;
use support_flow::contracts::SupportMessage;
use support_flow::flow::FlowController;
use support_flow::gateway::HttpGateway;
use support_flow::knowledge::JsonlKnowledgeSink;

#[derive(Parser)]
#[command(
    name = "support-flow",
    about = "Run a support flow against an OpenAI-compatible completion backend"
)]
struct Cli {
    /// Raw incident message.
    message: String,

    /// Transcript file consumed by the summarization stage when the
    /// ticket escalates.
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Request redaction of identifying details in generated notes.
    #[arg(long)]
    info_down: bool,

    /// Optional TOML config file (endpoint, directory, timeouts).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = FlowConfig::load(cli.config.as_deref())?;

    info!(
        endpoint = %config.endpoint.url,
        model = %config.endpoint.model,
        experts = config.directory.len(),
        "support flow starting"
    );

    let transcript = match &cli.transcript {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading transcript {}", path.display()))?,
        None => "(no transcript provided)".to_string(),
    };

    let gateway = Arc::new(HttpGateway::new(&config)?);
    let sink = Arc::new(JsonlKnowledgeSink::new(&config.knowledge_path));
    let controller = FlowController::from_config(&config, gateway, sink);

    let msg = SupportMessage::new(cli.message).with_info_down(cli.info_down);
    let result = controller.run(&msg, &transcript).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
