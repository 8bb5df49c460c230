//! samspeak-spk: speech for Sam Speak pads
//!
//! Provides:
//! - The speech dispatcher (proxy first, local synthesis as fallback)
//! - A client for the `/api/speak` proxy
//! - Local synthesis through the platform speech program
//! - The upstream TTS engine the proxy forwards to

pub mod error;
pub mod engines;
pub mod proxy_client;
pub mod local;
pub mod voice;
pub mod player;
pub mod connectivity;
pub mod dispatcher;

pub use error::SpeechError;
pub use engines::TtsEngine;
pub use engines::google::GoogleTtsEngine;
pub use proxy_client::{RemoteSynthesis, SpeechProxyClient};
pub use local::{CommandSynthesizer, LocalSynthesizer, Utterance, Voice};
pub use voice::select_voice;
pub use player::{AudioPlayer, CommandPlayer};
pub use connectivity::{Connectivity, NetworkStatus};
pub use dispatcher::{SpeechDispatcher, SpeechPath};
