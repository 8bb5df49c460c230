// HTTP router and shared state

use crate::pads::{get_pads_handler, put_pads_handler, subscribe_handler};
use crate::speak::speak_handler;
use crate::static_files::serve_static_handler;
use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{any, get},
    Router,
};
use samspeak_spk::TtsEngine;
use samspeak_storage::DocumentBackend;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct ApiState {
    /// `None` when no upstream API key is configured; `/api/speak` then fails with 500
    pub tts: Option<Arc<dyn TtsEngine>>,
    pub documents: Arc<dyn DocumentBackend>,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    tts: bool,
    store: String,
}

pub fn create_router(state: ApiState, cors_permissive: bool) -> Router {
    let api_routes = Router::new()
        .route("/api/speak", any(speak_handler))
        .route("/api/pads", get(get_pads_handler).put(put_pads_handler))
        .route("/api/pads/subscribe", get(subscribe_handler));

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api_routes)
        .fallback(serve_static_handler)
        .with_state(state);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        tts: state.tts.as_ref().map(|engine| engine.is_available()).unwrap_or(false),
        store: state.documents.name().to_string(),
    })
}
