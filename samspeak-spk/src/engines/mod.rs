//! Upstream TTS engines used by the speech proxy

pub mod google;

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesize text to encoded audio
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError>;

    /// Check if engine is usable (credentials present etc.)
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
