//! On-device speech synthesis
//!
//! Shells out to the platform speech program (`espeak-ng` on Linux, `say` on
//! macOS). Only one utterance plays at a time; `cancel` kills the running one.

use crate::error::SpeechError;
use parking_lot::Mutex;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

/// Words per minute the speech programs use at rate 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

const MAX_TEXT_CHARS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    /// Platform default when unset
    pub voice: Option<Voice>,
}

pub trait LocalSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;

    /// Stop the current utterance, if any.
    fn cancel(&self);

    /// Start speaking. Returns once the utterance has started.
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Block until the current utterance finishes.
    fn wait_until_idle(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Espeak,
    Say,
}

pub struct CommandSynthesizer {
    program: String,
    flavor: Flavor,
    available: bool,
    voices: Vec<Voice>,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    /// Platform speech program, or `program` when given.
    ///
    /// Blocks while the program lists its voices; inside an async runtime,
    /// build it on a blocking thread.
    pub fn new(program: Option<&str>) -> Self {
        let program = program
            .map(str::to_string)
            .unwrap_or_else(|| default_program().to_string());
        let flavor = if program.ends_with("say") {
            Flavor::Say
        } else {
            Flavor::Espeak
        };

        let voices = list_voices(&program, flavor);
        let available = voices.is_some();
        let voices = voices.unwrap_or_default();
        if available {
            info!("Local speech via {} ({} voices)", program, voices.len());
        } else {
            warn!("Local speech program {} not available", program);
        }

        Self {
            program,
            flavor,
            available,
            voices,
            current: Mutex::new(None),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn command_for(&self, utterance: &Utterance, text: &str) -> Command {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(1.0) as u32;
        let mut cmd = Command::new(&self.program);

        match self.flavor {
            Flavor::Espeak => {
                let voice = utterance
                    .voice
                    .as_ref()
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| utterance.lang.to_lowercase());
                cmd.arg("-v").arg(voice).arg("-s").arg(words_per_minute.to_string());
            }
            Flavor::Say => {
                if let Some(voice) = &utterance.voice {
                    cmd.arg("-v").arg(&voice.name);
                }
                cmd.arg("-r").arg(words_per_minute.to_string());
            }
        }

        cmd.arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl LocalSynthesizer for CommandSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&self) {
        let current = self.current.lock().take();
        if let Some(mut child) = current {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
                debug!("Cancelled local utterance");
            }
            let _ = child.wait();
        }
    }

    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Engine(format!("{} not available", self.program)));
        }

        let text = sanitize(&utterance.text);
        if text.trim().is_empty() {
            return Err(SpeechError::Synthesizer("Text cannot be empty".to_string()));
        }

        self.cancel();
        let child = self
            .command_for(utterance, &text)
            .spawn()
            .map_err(|e| SpeechError::Engine(format!("Failed to run {}: {}", self.program, e)))?;
        *self.current.lock() = Some(child);
        Ok(())
    }

    fn wait_until_idle(&self) {
        let current = self.current.lock().take();
        if let Some(mut child) = current {
            let _ = child.wait();
        }
    }
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn default_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak-ng"
    }
}

/// Drop control characters and keep the text from being read as a flag.
fn sanitize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_TEXT_CHARS)
        .collect();
    if cleaned.starts_with('-') {
        format!(" {}", cleaned)
    } else {
        cleaned
    }
}

/// `None` when the program cannot be run.
fn list_voices(program: &str, flavor: Flavor) -> Option<Vec<Voice>> {
    let output = match flavor {
        Flavor::Espeak => Command::new(program).arg("--voices").output(),
        Flavor::Say => Command::new(program).arg("-v").arg("?").output(),
    }
    .ok()?;

    if !output.status.success() {
        return None;
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    Some(match flavor {
        Flavor::Espeak => parse_espeak_voices(&listing),
        Flavor::Say => parse_say_voices(&listing),
    })
}

/// `Pty Language Age/Gender VoiceName File Other Languages`
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_, lang, _, name, ..] => Some(Voice {
                    name: name.to_string(),
                    lang: lang.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// `Name With Spaces    en_US    # sample sentence`
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let left = line.split('#').next()?.trim_end();
            let (name, lang) = left.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Voice {
                name: name.to_string(),
                lang: lang.replace('_', "-"),
            })
        })
        .collect()
}
