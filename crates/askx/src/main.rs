//! Askx binary entry point.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use askx::config::Config;
use askx::engine::{Dispatcher, Orchestrator, QuestionPool, SessionStore, TokenLedger};
use askx::gateway::{
    self, ChannelNotifier, GatewayCommand, GatewayEvent, TelegramConfig, TelegramGateway,
};

// ============================================================================
// CLI Types
// ============================================================================

/// Askx - anonymous question and answer matching over chat
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "askx.yaml")]
    config: String,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config))?;

    let telegram = match config.telegram {
        Some(ref telegram) if telegram.enabled => telegram.clone(),
        Some(_) => bail!("telegram gateway is disabled in {}", cli.config),
        None => bail!(
            "no gateway configured; add a 'telegram' section with a bot_token to {}",
            cli.config
        ),
    };

    // Engine <-> gateway channels
    let (event_tx, event_rx) = mpsc::channel::<GatewayEvent>(100);
    let (command_tx, command_rx) = mpsc::channel::<GatewayCommand>(100);

    let notifier = Arc::new(ChannelNotifier::new(config.texts, command_tx.clone()));
    let pool = Arc::new(QuestionPool::new());
    let ledger = Arc::new(TokenLedger::new(config.engine.starting_balance));
    let store = SessionStore::new();
    let orchestrator = Orchestrator::new(
        config.engine,
        pool,
        ledger,
        store.clone(),
        notifier.clone(),
    );
    let dispatcher = Arc::new(Dispatcher::new(orchestrator, store, notifier));

    let telegram_gateway = TelegramGateway::new(TelegramConfig::new(telegram.bot_token));
    let gateway_handle = tokio::spawn(async move {
        telegram_gateway.start(event_tx, command_rx).await;
    });

    // Ctrl-C asks the gateway to stop; the event loop then ends on the
    // gateway's own Shutdown event.
    let shutdown_tx = command_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(GatewayCommand::Shutdown).await;
    });

    info!(config = %cli.config, "askx started");
    gateway::run_event_loop(event_rx, dispatcher).await;

    gateway_handle.await.context("gateway task failed")?;
    info!("askx stopped");
    Ok(())
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
