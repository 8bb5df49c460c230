// Sam Speak command line: edit pads, inspect the layout, speak, and run the server

use anyhow::Context;
use clap::{Parser, Subcommand};
use samspeak_core::config::{SamSpeakConfig, StoreBackend};
use samspeak_core::{Layout, PageView, MAX_PAD_INDEX};
use samspeak_spk::{NetworkStatus, SpeechDispatcher};
use samspeak_storage::{
    backend_from_config, AssetCache, LocalCache, PadSession, SessionRole, SharedPadStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "samspeak")]
#[command(about = "Sam Speak - tappable speech pads", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON or TOML)
    #[arg(long, short, global = true)]
    config: Option<String>,

    /// Shared document: a server URL (http://...) or a JSON file path
    #[arg(long, global = true)]
    store: Option<String>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Sam Speak server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },

    /// Pad operations
    #[command(subcommand)]
    Pads(PadsCommands),

    /// Show the derived grid for a page
    Layout {
        #[arg(long, short, default_value = "0")]
        page: usize,
    },

    /// Speak text through the proxy, or locally when offline
    Speak {
        text: String,

        /// Skip the proxy and use local synthesis
        #[arg(long)]
        offline: bool,
    },

    /// Cache the offline assets of a deployment and drop stale cache versions
    Precache {
        /// e.g. https://samspeak.example.com
        origin: String,
    },
}

#[derive(Subcommand)]
enum PadsCommands {
    /// List pads with their labels and colours
    List,

    /// Set a pad's text
    Set { index: usize, text: String },

    /// Add an empty pad after the highest index
    Add,

    /// Delete a pad
    Delete { index: usize },

    /// Move the pad at list position FROM to position TO
    Move { from: usize, to: usize },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref(), cli.store.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            samspeak_server::run(config).await?;
        }
        Commands::Pads(cmd) => handle_pads_command(&config, cmd).await?,
        Commands::Layout { page } => show_layout(&config, page).await?,
        Commands::Speak { text, offline } => speak(&config, &text, offline).await?,
        Commands::Precache { origin } => precache(&config, &origin).await?,
    }

    Ok(())
}

fn load_config(path: Option<&str>, store: Option<&str>) -> anyhow::Result<SamSpeakConfig> {
    let mut config = match path {
        Some(path) => SamSpeakConfig::from_file(path)?,
        None => SamSpeakConfig::from_env(),
    };

    if let Some(store) = store {
        if store.starts_with("http://") || store.starts_with("https://") {
            config.store.backend = StoreBackend::Http;
            config.store.url = Some(store.to_string());
        } else {
            config.store.backend = StoreBackend::File;
            config.store.path = Some(PathBuf::from(store));
        }
    }

    config.validate()?;
    Ok(config)
}

/// Client commands never use the throwaway in-memory store; they talk to the
/// local server instead.
fn client_store(config: &SamSpeakConfig) -> anyhow::Result<SharedPadStore> {
    let mut store_config = config.store.clone();
    if store_config.backend == StoreBackend::Memory {
        store_config.backend = StoreBackend::Http;
        store_config.url = Some(format!("http://localhost:{}", config.server.port));
    }
    let backend = backend_from_config(&store_config).context("Failed to open pad store")?;
    Ok(SharedPadStore::new(backend))
}

async fn open_session(config: &SamSpeakConfig, role: SessionRole) -> anyhow::Result<PadSession> {
    let store = client_store(config)?;
    let cache = match LocalCache::open(config.cache.path.join("pads")) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            warn!("Local cache unavailable: {}", e);
            None
        }
    };
    Ok(PadSession::open(store, cache, role).await)
}

async fn handle_pads_command(config: &SamSpeakConfig, cmd: PadsCommands) -> anyhow::Result<()> {
    let role = match cmd {
        PadsCommands::List => SessionRole::Controller,
        _ => SessionRole::Editor,
    };
    let session = open_session(config, role).await?;

    match cmd {
        PadsCommands::List => {
            let pads = session.pads();
            if pads.is_empty() {
                println!("No pads yet");
            }
            for (index, _) in pads.iter() {
                println!(
                    "{:>3}  {:<8} {}",
                    index,
                    samspeak_core::layout::pad_color(index),
                    pads.label(index)
                );
            }
            return Ok(());
        }
        PadsCommands::Set { index, text } => {
            if index > MAX_PAD_INDEX {
                anyhow::bail!("Pad index must be at most {}", MAX_PAD_INDEX);
            }
            session.set_text(index, text).await;
        }
        PadsCommands::Add => {
            let (index, saved) = session.add_pad().await;
            if saved {
                println!("Added pad {}", index);
            }
        }
        PadsCommands::Delete { index } => {
            if !session.pads().contains(index) {
                anyhow::bail!("No pad at index {}", index);
            }
            session.delete_pad(index).await;
        }
        PadsCommands::Move { from, to } => {
            if !session.reorder(from, to).await && session.status().is_none() {
                println!("Nothing to move");
            }
        }
    }

    if let Some(status) = session.status() {
        println!("{}", status.text);
        if !status.success {
            anyhow::bail!("Pad store rejected the change");
        }
    }
    Ok(())
}

async fn show_layout(config: &SamSpeakConfig, page: usize) -> anyhow::Result<()> {
    let session = open_session(config, SessionRole::Controller).await?;
    let pads = session.pads();
    let layout = Layout::derive(&pads);
    let view = PageView::build(&pads, page);

    println!(
        "{} slots, {} page(s), showing page {} as {}",
        layout.total_slots,
        layout.total_pages,
        view.page + 1,
        view.grid
    );
    for cell in &view.cells {
        println!("  [{:>3}] {:<8} {}", cell.index, cell.color, cell.label);
    }
    if let Some(indicator) = layout.page_indicator(view.page) {
        println!("  {}", indicator);
    }
    Ok(())
}

async fn speak(config: &SamSpeakConfig, text: &str, offline: bool) -> anyhow::Result<()> {
    let connectivity = Arc::new(NetworkStatus::new(!offline));
    let speech_config = config.speech.clone();
    let speech = tokio::task::spawn_blocking(move || SpeechDispatcher::from_config(&speech_config, connectivity))
        .await
        .context("Speech setup task failed")??;

    let path = speech.speak(text).await?;
    info!("Speaking via {:?}", path);
    speech.wait_until_idle();
    Ok(())
}

async fn precache(config: &SamSpeakConfig, origin: &str) -> anyhow::Result<()> {
    let cache = AssetCache::open(
        config.cache.path.join("assets"),
        &config.cache.asset_cache_name,
        origin,
        config.store.timeout_secs,
    )?;

    let installed = cache.install(&config.cache.offline_assets).await?;
    let dropped = cache.activate()?;
    println!(
        "Cached {} assets as {} (dropped {} stale versions)",
        installed,
        cache.version(),
        dropped.len()
    );
    Ok(())
}
