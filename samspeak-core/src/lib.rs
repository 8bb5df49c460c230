//! samspeak-core: shared types for Sam Speak
//!
//! Pad mapping, the shared document, layout derivation, touch gestures and
//! configuration. Everything here is synchronous and free of I/O so that the
//! store, speech and server crates can agree on one model.

pub mod error;
pub mod pads;
pub mod document;
pub mod layout;
pub mod gesture;
pub mod config;

pub use error::{Error, Result};
pub use pads::{PadMapping, MAX_PAD_INDEX, PADS_PER_PAGE};
pub use document::{SharedDocument, COLLECTION, SHARED_DOC_ID};
pub use layout::{GridClass, Layout, PageView};
pub use gesture::{Gesture, Pager, TouchTrack};
pub use config::{SamSpeakConfig, ConfigError};
