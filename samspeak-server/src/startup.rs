// Server assembly and lifecycle

use crate::http::{create_router, ApiState};
use anyhow::Context;
use samspeak_core::config::{SamSpeakConfig, StoreBackend};
use samspeak_spk::{GoogleTtsEngine, TtsEngine};
use samspeak_storage::backend_from_config;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Wire the TTS engine and the hosted document store from configuration.
pub fn build_state(config: &SamSpeakConfig) -> anyhow::Result<ApiState> {
    if config.store.backend == StoreBackend::Http {
        anyhow::bail!("The server hosts the shared document itself; use the memory or file store");
    }

    let documents = backend_from_config(&config.store).context("Failed to open document store")?;
    info!("✅ Document store ready ({})", documents.name());

    let engine = GoogleTtsEngine::from_config(&config.tts).context("Failed to create TTS engine")?;
    let tts: Option<Arc<dyn TtsEngine>> = if engine.is_available() {
        info!("✅ TTS proxy ready ({})", engine.name());
        Some(Arc::new(engine))
    } else {
        warn!("⚠️  GOOGLE_CLOUD_API_KEY not set, /api/speak will answer 500");
        None
    };

    Ok(ApiState {
        tts,
        documents,
        static_dir: config.server.static_dir.clone(),
    })
}

/// Serve until Ctrl-C.
pub async fn run(config: SamSpeakConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let state = build_state(&config)?;
    let app = create_router(state, config.server.cors_permissive);

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("🌐 Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("✅ HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("👋 Sam Speak server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
