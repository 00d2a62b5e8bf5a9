//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::SessionController;
use council_domain::{DeletionConfirmationFlow, Role};
use council_infrastructure::{ConfigLoader, HttpCouncilGateway};
use council_presentation::{ChatRepl, Cli, ConsoleFormatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    config.validate().context("invalid configuration")?;

    if !config.ui.color {
        colored::control::set_override(false);
    }

    info!(base_url = %config.server.base_url, "starting llm-council");

    // === Dependency Injection ===
    let gateway = Arc::new(
        HttpCouncilGateway::with_timeout(
            &config.server.base_url,
            Duration::from_secs(config.server.timeout_secs),
        )
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = SessionController::new(gateway, tx).with_confirmation_flow(
        DeletionConfirmationFlow::new()
            .with_window(Duration::from_secs(config.ui.confirm_window_secs)),
    );

    // Chat mode (the default when no question is given)
    if cli.chat || cli.question.is_none() {
        let mut repl = ChatRepl::new(session, rx)
            .with_history_file(config.ui.history_file.map(PathBuf::from));
        repl.run().await?;
        return Ok(());
    }

    // Single question mode: fresh conversation, one exchange, print the reply
    let Some(question) = cli.question else {
        bail!("Question is required. Use --chat for interactive mode.");
    };

    session.new_conversation().await;
    session
        .send(&question, None)
        .await
        .context("failed to send question")?;

    while let Ok(event) = rx.try_recv() {
        if let council_application::UiEvent::Notice(notice) = event {
            eprintln!("{}", ConsoleFormatter::format_notice(&notice));
        }
    }

    match session.timeline().last() {
        Some(message) if message.role == Role::Assistant => {
            println!("{}", message.content);
        }
        _ => bail!("The council didn't answer."),
    }

    Ok(())
}
