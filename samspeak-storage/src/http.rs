//! Remote document backend talking to a Sam Speak server
//!
//! `GET /api/pads` reads (404 when the document does not exist), `PUT /api/pads`
//! replaces it, and `GET /api/pads/subscribe` upgrades to a WebSocket that pushes
//! the document as JSON (`null` when missing) after every write.

use crate::backend::{DocumentBackend, WatchEvent, WatchStream};
use crate::error::StoreError;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use samspeak_core::SharedDocument;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

pub struct HttpBackend {
    client: Client,
    document_url: Url,
    subscribe_url: Url,
    reconnect_delay: Duration,
}

impl HttpBackend {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str, timeout_secs: u64, reconnect_delay_ms: u64) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("Invalid store URL '{}': {}", base_url, e)))?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(StoreError::Config(format!(
                    "Unsupported URL scheme: {}. Only http:// and https:// are allowed.",
                    scheme
                )))
            }
        }

        let document_url = base
            .join("/api/pads")
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let mut subscribe_url = base
            .join("/api/pads/subscribe")
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let ws_scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        subscribe_url
            .set_scheme(ws_scheme)
            .map_err(|_| StoreError::Config("Cannot derive WebSocket URL".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            document_url,
            subscribe_url,
            reconnect_delay: Duration::from_millis(reconnect_delay_ms),
        })
    }

    pub fn subscribe_url(&self) -> &Url {
        &self.subscribe_url
    }
}

#[async_trait]
impl DocumentBackend for HttpBackend {
    async fn read(&self) -> Result<Option<SharedDocument>, StoreError> {
        let response = self.client.get(self.document_url.clone()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<SharedDocument>().await?)),
            status => {
                let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                Err(StoreError::Remote {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn write(&self, document: &SharedDocument) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url.clone())
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    fn watch(&self) -> WatchStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let url = self.subscribe_url.to_string();
        let delay = self.reconnect_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = pump_updates(url, delay, tx.clone()) => {}
                _ = tx.closed() => debug!("Document watch dropped, closing socket"),
            }
        });

        UnboundedReceiverStream::new(rx).boxed()
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Forward socket messages until the receiver goes away, reconnecting after
/// every failure.
async fn pump_updates(url: String, delay: Duration, tx: mpsc::UnboundedSender<WatchEvent>) {
    loop {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((mut socket, _)) => {
                info!("Subscribed to shared document at {}", url);
                while let Some(message) = socket.next().await {
                    let event = match message {
                        Ok(Message::Text(text)) => serde_json::from_str::<Option<SharedDocument>>(&text)
                            .map_err(StoreError::from),
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => Err(StoreError::Transport(e.to_string())),
                    };
                    let failed = event.is_err();
                    if tx.send(event).is_err() {
                        return;
                    }
                    if failed {
                        break;
                    }
                }
                warn!("Document subscription closed, reconnecting");
            }
            Err(e) => {
                if tx.send(Err(StoreError::Transport(e.to_string()))).is_err() {
                    return;
                }
            }
        }
        tokio::time::sleep(delay).await;
    }
}
