//! Client for the `/api/speak` proxy

use crate::error::SpeechError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Remote synthesis: text in, decoded audio out.
#[async_trait]
pub trait RemoteSynthesis: Send + Sync {
    async fn fetch_audio(&self, text: &str) -> Result<Bytes, SpeechError>;
}

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SpeakResponse {
    audio: String,
}

pub struct SpeechProxyClient {
    client: Client,
    url: Url,
}

impl SpeechProxyClient {
    pub fn new(proxy_url: &str, timeout_secs: u64) -> Result<Self, SpeechError> {
        let url = Url::parse(proxy_url)
            .map_err(|e| SpeechError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SpeechError::Config(format!(
                "Unsupported proxy URL scheme: {}",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SpeechError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RemoteSynthesis for SpeechProxyClient {
    async fn fetch_audio(&self, text: &str) -> Result<Bytes, SpeechError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&SpeakRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SpeakResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Decode(format!("Invalid proxy response: {}", e)))?;
        let audio = general_purpose::STANDARD.decode(payload.audio)?;
        Ok(Bytes::from(audio))
    }
}
