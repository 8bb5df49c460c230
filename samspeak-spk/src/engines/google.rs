//! Google Cloud Text-to-Speech

use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use samspeak_core::config::TtsConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

pub struct GoogleTtsEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    language_code: String,
    voice_name: String,
    audio_encoding: String,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

impl GoogleTtsEngine {
    pub fn from_config(config: &TtsConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language_code: config.language_code.clone(),
            voice_name: config.voice_name.clone(),
            audio_encoding: config.audio_encoding.clone(),
            speaking_rate: config.speaking_rate,
            pitch: config.pitch,
        })
    }

    pub fn request_body(&self, text: &str) -> Value {
        json!({
            "input": {
                "text": text
            },
            "voice": {
                "languageCode": self.language_code,
                "name": self.voice_name,
            },
            "audioConfig": {
                "audioEncoding": self.audio_encoding,
                "speakingRate": self.speaking_rate,
                "pitch": self.pitch,
            }
        })
    }
}

#[async_trait]
impl TtsEngine for GoogleTtsEngine {
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SpeechError::Config("Google Cloud API key not provided".to_string()))?;

        let url = format!("{}/v1/text:synthesize", self.endpoint);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&self.request_body(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("Google TTS API error ({}): {}", status, body);
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SynthesizeResponse = response.json().await?;
        let audio_content = parsed
            .audio_content
            .ok_or_else(|| SpeechError::Decode("Missing audioContent in response".to_string()))?;

        let audio = general_purpose::STANDARD.decode(audio_content)?;
        debug!("Synthesized {} chars into {} bytes of audio", text.len(), audio.len());
        Ok(Bytes::from(audio))
    }

    fn is_available(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.is_empty()).unwrap_or(false)
    }

    fn name(&self) -> &str {
        "google-cloud-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_fixed_voice() {
        let engine = GoogleTtsEngine::from_config(&TtsConfig::default()).unwrap();
        let body = engine.request_body("Hello");

        assert_eq!(body["input"]["text"], "Hello");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["name"], "en-US-Journey-D");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(body["audioConfig"]["speakingRate"], 1.0);
        assert_eq!(body["audioConfig"]["pitch"], 0.0);
    }

    #[test]
    fn test_unavailable_without_key() {
        let engine = GoogleTtsEngine::from_config(&TtsConfig::default()).unwrap();
        assert!(!engine.is_available());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let engine = GoogleTtsEngine::from_config(&TtsConfig::default()).unwrap();
        let result = tokio_test::block_on(engine.synthesize("Hi"));
        assert!(matches!(result, Err(SpeechError::Config(_))));
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        let config = TtsConfig {
            endpoint: "http://127.0.0.1:1/".to_string(),
            api_key: Some("super-secret".to_string()),
            timeout_secs: 1,
            ..TtsConfig::default()
        };
        let engine = GoogleTtsEngine::from_config(&config).unwrap();

        let err = engine.synthesize("Hi").await.unwrap_err();
        assert!(matches!(err, SpeechError::Transport(_)));
        assert!(!err.to_string().contains("super-secret"));
    }
}
