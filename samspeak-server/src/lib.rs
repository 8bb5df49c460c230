//! samspeak-server: the Sam Speak HTTP surface
//!
//! - `POST /api/speak`: TTS proxy keeping the upstream API key server-side
//! - `GET/PUT /api/pads`, `GET /api/pads/subscribe`: the shared pad document
//! - `/health` and the static PWA bundle

pub mod http;
pub mod speak;
pub mod pads;
pub mod static_files;
pub mod startup;

pub use http::{create_router, ApiState};
pub use speak::ProxyError;
pub use startup::{build_state, run};
