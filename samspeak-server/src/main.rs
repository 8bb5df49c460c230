// Sam Speak server: TTS proxy, shared pad document and the PWA bundle

use samspeak_core::SamSpeakConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("🚀 Starting Sam Speak...");

    let config = match std::env::var("SAMSPEAK_CONFIG") {
        Ok(path) => {
            info!("📋 Loading configuration from {}", path);
            SamSpeakConfig::from_file(&path)?
        }
        Err(_) => SamSpeakConfig::from_env(),
    };

    samspeak_server::run(config).await
}
