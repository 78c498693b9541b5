//! SocialSpark Daemon - Main Entry Point
//! Wires the Gemini/heuristic backends into a generation session and serves it over JSON-RPC

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use crate::config::{DaemonConfig, MoodBackend};
use socialspark_api_rpc::{RpcServer, RpcServerConfig};
use socialspark_core::application::{
    GenerationOrchestrator, GenerationSession, ProgressReporter, RetryPolicy, ThemeApplier,
};
use socialspark_core::port::id_provider::UuidProvider;
use socialspark_core::port::time_provider::SystemTimeProvider;
use socialspark_core::port::{InMemoryPresentation, MoodClassifier};
use socialspark_infra_gemini::{GeminiBackend, GeminiClient, GeminiConfig};
use socialspark_infra_vision::HeuristicMoodClassifier;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "socialspark=info";

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("SOCIALSPARK_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;
    info!("SocialSpark daemon v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::load().context("Failed to load configuration")?;
    info!(
        rpc_port = config.rpc_port,
        model = %config.gemini_model,
        mood_backend = ?config.mood_backend,
        auto_theme = config.auto_theme,
        "Configuration loaded"
    );

    // 3. Inference backends
    let api_key = config.api_key(|name| std::env::var(name).ok())?;
    let client = GeminiClient::new(
        GeminiConfig::new(api_key)
            .with_api_base(config.gemini_api_base.clone())
            .with_model(config.gemini_model.clone())
            .with_request_timeout(config.request_timeout()),
    )
    .context("Failed to create Gemini client")?;
    let gemini = Arc::new(GeminiBackend::new(client));

    let mood: Arc<dyn MoodClassifier> = match config.mood_backend {
        MoodBackend::Gemini => gemini.clone(),
        MoodBackend::Heuristic => Arc::new(HeuristicMoodClassifier::new()),
    };

    // 4. Setup dependencies (DI wiring)
    let orchestrator = GenerationOrchestrator::from_backends(
        gemini.clone(),
        gemini,
        mood,
        RetryPolicy::new(config.retry_max_attempts, config.retry_delay()),
        ProgressReporter::default(),
    );
    let session = Arc::new(GenerationSession::new(
        Arc::new(orchestrator),
        ThemeApplier::new(Box::new(InMemoryPresentation::new()), config.auto_theme),
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    ));

    // 5. Start JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, session)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Waiting for uploads...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
