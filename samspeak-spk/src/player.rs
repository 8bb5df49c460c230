//! Playback of proxied audio

use crate::error::SpeechError;
use bytes::Bytes;
use parking_lot::Mutex;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tempfile::NamedTempFile;
use tracing::debug;

pub trait AudioPlayer: Send + Sync {
    /// Start playing encoded audio, stopping whatever was playing.
    fn play(&self, audio: Bytes) -> Result<(), SpeechError>;

    fn stop(&self);

    /// Block until playback finishes.
    fn wait_until_idle(&self) {}
}

/// Plays MP3 audio by handing a temporary file to an external player.
pub struct CommandPlayer {
    program: String,
    current: Mutex<Option<(Child, NamedTempFile)>>,
}

impl CommandPlayer {
    pub fn new(program: Option<&str>) -> Self {
        let program = program
            .map(str::to_string)
            .unwrap_or_else(|| default_player().to_string());
        Self {
            program,
            current: Mutex::new(None),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&self, audio: Bytes) -> Result<(), SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::Playback("No audio to play".to_string()));
        }
        self.stop();

        let mut file = tempfile::Builder::new()
            .prefix("samspeak-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(&audio)?;
        file.flush()?;

        let mut cmd = Command::new(&self.program);
        if self.program.ends_with("mpg123") {
            cmd.arg("-q");
        }
        let child = cmd
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpeechError::Playback(format!("Failed to run {}: {}", self.program, e)))?;

        debug!("Playing {} bytes of audio with {}", audio.len(), self.program);
        *self.current.lock() = Some((child, file));
        Ok(())
    }

    fn stop(&self) {
        let current = self.current.lock().take();
        if let Some((mut child, _file)) = current {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn wait_until_idle(&self) {
        let current = self.current.lock().take();
        if let Some((mut child, _file)) = current {
            let _ = child.wait();
        }
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn default_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "afplay"
    } else {
        "mpg123"
    }
}
