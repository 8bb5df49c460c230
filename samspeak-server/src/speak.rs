//! `/api/speak`: forwards `{text}` to the upstream TTS engine and answers
//! `{audio}` with the base64 encoded result.

use crate::http::ApiState;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use samspeak_spk::SpeechError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Text is required")]
    TextRequired,

    #[error("Failed to generate speech")]
    Synthesis(#[from] SpeechError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::TextRequired => StatusCode::BAD_REQUEST,
            ProxyError::Synthesis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        // Details stay in the server log
        if let ProxyError::Synthesis(e) = &self {
            error!("TTS Error: {}", e);
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
struct SpeakRequest {
    text: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SpeakResponse {
    pub audio: String,
}

pub async fn speak_handler(
    State(state): State<ApiState>,
    method: Method,
    body: Bytes,
) -> Result<Json<SpeakResponse>, ProxyError> {
    if method != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let text = extract_text(&body)?;

    let engine = state
        .tts
        .as_ref()
        .ok_or_else(|| SpeechError::Config("No TTS engine configured".to_string()))?;

    let audio = engine.synthesize(&text).await?;
    debug!("Proxied {} chars through {}", text.len(), engine.name());

    Ok(Json(SpeakResponse {
        audio: general_purpose::STANDARD.encode(&audio),
    }))
}

/// Missing body, unparseable JSON, non-string or empty `text` are all 400.
fn extract_text(body: &[u8]) -> Result<String, ProxyError> {
    let request: SpeakRequest = serde_json::from_slice(body).map_err(|_| ProxyError::TextRequired)?;
    match request.text {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Ok(text),
        _ => Err(ProxyError::TextRequired),
    }
}
