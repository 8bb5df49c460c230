// Configuration for every Sam Speak component

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Built PWA bundle (index.html, manifest.json, sw.js ...)
    pub static_dir: Option<PathBuf>,
    /// Allow any origin on the API, like the hosted function did
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: None,
            cors_permissive: true,
        }
    }
}

/// Upstream text-to-speech API used by the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub endpoint: String,
    /// Never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub language_code: String,
    pub voice_name: String,
    pub audio_encoding: String,
    pub speaking_rate: f32,
    pub pitch: f32,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com".to_string(),
            api_key: None,
            language_code: "en-US".to_string(),
            voice_name: "en-US-Journey-D".to_string(),
            audio_encoding: "MP3".to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
            timeout_secs: 30,
        }
    }
}

/// Where the shared document lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit
    Memory,
    /// JSON file on disk
    File,
    /// Remote Sam Speak server (`/api/pads`)
    Http,
}

/// Shared document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Delay before a dropped subscription reconnects
    pub reconnect_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
            url: None,
            timeout_secs: 10,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Local fallback cache and offline asset cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Versioned asset cache; activating it drops every other version
    pub asset_cache_name: String,
    pub offline_assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let path = dirs::cache_dir()
            .map(|dir| dir.join("samspeak"))
            .unwrap_or_else(|| PathBuf::from("./samspeak-cache"));
        Self {
            path,
            asset_cache_name: "sam-speak-v1".to_string(),
            offline_assets: vec![
                "/".to_string(),
                "/manifest.json".to_string(),
                "/favicon.svg".to_string(),
            ],
        }
    }
}

/// Client-side speech: proxy location and local voice preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub proxy_url: String,
    pub language: String,
    pub rate: f32,
    /// A local voice is preferred when its name contains one of these
    pub preferred_voice_names: Vec<String>,
    /// Local synthesis program (espeak-ng / say); platform default when unset
    pub local_command: Option<String>,
    /// Program used to play proxied MP3 audio
    pub player_command: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://localhost:8080/api/speak".to_string(),
            language: "en-US".to_string(),
            rate: 0.9,
            preferred_voice_names: vec![
                "Male".to_string(),
                "David".to_string(),
                "Fred".to_string(),
            ],
            local_command: None,
            player_command: None,
            timeout_secs: 30,
        }
    }
}

/// Complete Sam Speak configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamSpeakConfig {
    pub server: ServerConfig,
    pub tts: TtsConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub speech: SpeechConfig,
}

impl SamSpeakConfig {
    /// Load configuration from file, then apply environment overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path, e)))?;
        let mut config = Self::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse JSON or TOML
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(config) = serde_json::from_str::<SamSpeakConfig>(content) {
            return Ok(config);
        }

        toml::from_str::<SamSpeakConfig>(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("SAMSPEAK_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.server.port = p;
            }
        }

        if let Ok(host) = std::env::var("SAMSPEAK_HOST") {
            self.server.bind_address = host;
        }

        if let Ok(dir) = std::env::var("SAMSPEAK_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }

        if let Ok(key) = std::env::var("GOOGLE_CLOUD_API_KEY") {
            self.tts.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("SAMSPEAK_STORE_URL") {
            self.store.backend = StoreBackend::Http;
            self.store.url = Some(url);
        } else if let Ok(path) = std::env::var("SAMSPEAK_STORE_PATH") {
            self.store.backend = StoreBackend::File;
            self.store.path = Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("SAMSPEAK_CACHE_DIR") {
            self.cache.path = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("SAMSPEAK_PROXY_URL") {
            self.speech.proxy_url = url;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port cannot be 0".to_string(),
            ));
        }

        if !self.tts.endpoint.starts_with("https://") && !self.tts.endpoint.starts_with("http://") {
            return Err(ConfigError::ValidationError(
                "tts.endpoint must be an http(s) URL".to_string(),
            ));
        }

        if self.tts.voice_name.is_empty() || self.tts.language_code.is_empty() {
            return Err(ConfigError::ValidationError(
                "tts voice and language cannot be empty".to_string(),
            ));
        }

        if !(0.25..=4.0).contains(&self.tts.speaking_rate) {
            return Err(ConfigError::ValidationError(
                "tts.speaking_rate must be between 0.25 and 4.0".to_string(),
            ));
        }

        if !(-20.0..=20.0).contains(&self.tts.pitch) {
            return Err(ConfigError::ValidationError(
                "tts.pitch must be between -20.0 and 20.0".to_string(),
            ));
        }

        if self.tts.timeout_secs == 0 || self.store.timeout_secs == 0 || self.speech.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        match self.store.backend {
            StoreBackend::File if self.store.path.is_none() => {
                return Err(ConfigError::ValidationError(
                    "store.path is required for the file backend".to_string(),
                ));
            }
            StoreBackend::Http if self.store.url.is_none() => {
                return Err(ConfigError::ValidationError(
                    "store.url is required for the http backend".to_string(),
                ));
            }
            _ => {}
        }

        if !(0.1..=10.0).contains(&self.speech.rate) {
            return Err(ConfigError::ValidationError(
                "speech.rate must be between 0.1 and 10.0".to_string(),
            ));
        }

        if self.cache.asset_cache_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.asset_cache_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Configuration(err.to_string())
    }
}
