//! The hosted shared document
//!
//! `GET` answers the document or 404, `PUT` replaces it wholesale, and the
//! subscribe socket pushes the current document (`null` when missing) followed
//! by every later write.

use crate::http::ApiState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use futures_util::StreamExt;
use samspeak_core::SharedDocument;
use samspeak_storage::DocumentBackend;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub async fn get_pads_handler(State(state): State<ApiState>) -> Response {
    match state.documents.read().await {
        Ok(Some(document)) => (StatusCode::OK, Json(document)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Document not found" })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read shared document: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to read document" })),
            )
                .into_response()
        }
    }
}

pub async fn put_pads_handler(
    State(state): State<ApiState>,
    Json(document): Json<SharedDocument>,
) -> Response {
    if let Err(e) = document.rectangles.validate() {
        warn!("Rejected shared document: {}", e);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid pad index" })),
        )
            .into_response();
    }

    match state.documents.write(&document).await {
        Ok(()) => {
            info!("Shared document updated ({} pads)", document.rectangles.len());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!("Failed to write shared document: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to write document" })),
            )
                .into_response()
        }
    }
}

pub async fn subscribe_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    let documents = state.documents.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, documents))
}

async fn handle_socket(mut socket: WebSocket, documents: Arc<dyn DocumentBackend>) {
    info!("Pad subscriber connected");
    let mut updates = documents.watch();

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(update) = update else { break };
                let document = match update {
                    Ok(document) => document,
                    Err(e) => {
                        warn!("Document watch error: {}", e);
                        continue;
                    }
                };
                let payload = match serde_json::to_string(&document) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!("Failed to encode document: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!("Subscriber socket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!("Pad subscriber disconnected");
}
