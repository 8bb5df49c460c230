//! Speech dispatcher
//!
//! Online, text goes to the proxy and the returned audio is played; any
//! failure along that path (transport, non-success status, bad payload,
//! playback) falls back to local synthesis. Offline, local synthesis is used
//! straight away and the proxy is never called.

use crate::connectivity::Connectivity;
use crate::error::SpeechError;
use crate::local::{CommandSynthesizer, LocalSynthesizer, Utterance};
use crate::player::{AudioPlayer, CommandPlayer};
use crate::proxy_client::{RemoteSynthesis, SpeechProxyClient};
use crate::voice::select_voice;
use samspeak_core::config::SpeechConfig;
use samspeak_core::PadMapping;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which path ended up speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechPath {
    Remote,
    Local,
}

pub struct SpeechDispatcher {
    remote: Arc<dyn RemoteSynthesis>,
    local: Arc<dyn LocalSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    connectivity: Arc<dyn Connectivity>,
    language: String,
    rate: f32,
    preferred_voice_names: Vec<String>,
}

impl SpeechDispatcher {
    pub fn new(
        remote: Arc<dyn RemoteSynthesis>,
        local: Arc<dyn LocalSynthesizer>,
        player: Arc<dyn AudioPlayer>,
        connectivity: Arc<dyn Connectivity>,
        config: &SpeechConfig,
    ) -> Self {
        Self {
            remote,
            local,
            player,
            connectivity,
            language: config.language.clone(),
            rate: config.rate,
            preferred_voice_names: config.preferred_voice_names.clone(),
        }
    }

    /// Proxy client, platform speech program and player from configuration.
    /// Blocks while listing local voices, see [`CommandSynthesizer::new`].
    pub fn from_config(config: &SpeechConfig, connectivity: Arc<dyn Connectivity>) -> Result<Self, SpeechError> {
        let remote = SpeechProxyClient::new(&config.proxy_url, config.timeout_secs)?;
        let local = CommandSynthesizer::new(config.local_command.as_deref());
        let player = CommandPlayer::new(config.player_command.as_deref());
        Ok(Self::new(
            Arc::new(remote),
            Arc::new(local),
            Arc::new(player),
            connectivity,
            config,
        ))
    }

    pub async fn speak(&self, text: &str) -> Result<SpeechPath, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::Synthesizer("Text cannot be empty".to_string()));
        }

        if !self.connectivity.is_online() {
            debug!("Offline, speaking locally");
            self.speak_local(text)?;
            return Ok(SpeechPath::Local);
        }

        self.local.cancel();
        self.player.stop();

        match self.speak_remote(text).await {
            Ok(()) => {
                info!("Spoke {:?} via proxy", text);
                Ok(SpeechPath::Remote)
            }
            Err(e) => {
                warn!("Remote speech failed, falling back to local synthesis: {}", e);
                self.speak_local(text)?;
                Ok(SpeechPath::Local)
            }
        }
    }

    /// Speak a pad's label: its text, or its 1-based number when empty.
    pub async fn speak_pad(&self, pads: &PadMapping, index: usize) -> Result<SpeechPath, SpeechError> {
        self.speak(&pads.label(index)).await
    }

    pub fn speak_local(&self, text: &str) -> Result<(), SpeechError> {
        self.local.cancel();
        self.player.stop();

        let voices = self.local.voices();
        let utterance = Utterance {
            text: text.to_string(),
            lang: self.language.clone(),
            rate: self.rate,
            voice: select_voice(&voices, &self.preferred_voice_names).cloned(),
        };
        self.local.speak(&utterance)
    }

    /// Silence both paths.
    pub fn stop(&self) {
        self.local.cancel();
        self.player.stop();
    }

    /// Block until whichever path is speaking has finished.
    pub fn wait_until_idle(&self) {
        self.player.wait_until_idle();
        self.local.wait_until_idle();
    }

    async fn speak_remote(&self, text: &str) -> Result<(), SpeechError> {
        let audio = self.remote.fetch_audio(text).await?;
        // Local speech may have started while the proxy call was in flight.
        self.local.cancel();
        self.player.play(audio)
    }
}
