//! Text-to-speech capability
//!
//! The pipeline only talks to TTS through the [`SpeechEngine`] trait. Engines
//! are treated as not thread-safe: callers hand a worker an
//! [`EngineFactory`], which is `Send`, and the engine itself is built, used
//! and dropped on that worker's thread. Nothing in this crate stores an engine
//! in shared state.
//!
//! # Engines
//!
//! - [`EspeakEngine`] - Runs an `espeak-ng` compatible binary per utterance
//! - [`SilentEngine`] - Logs utterances instead of playing them
//!
//! # Example
//!
//! ```ignore
//! use speakline::tts::{EngineKind, EngineOptions};
//!
//! let factory = EngineOptions::new(EngineKind::Espeak).factory();
//! std::thread::spawn(move || {
//!     let mut engine = factory()?;
//!     engine.set_rate(175)?;
//!     engine.speak("Hello")
//! });
//! ```

pub mod espeak;
pub mod silent;

pub use espeak::{EspeakEngine, DEFAULT_ESPEAK_PROGRAM};
pub use silent::SilentEngine;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// Blocking text-to-speech engine
///
/// Every call blocks until the engine has finished the requested work.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine {
    /// Set the speaking rate in words per minute
    fn set_rate(&mut self, words_per_minute: u32) -> Result<()>;

    /// Set the output volume, 0.0 (silent) to 1.0 (full)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Speak `text`, returning once playback has finished
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Render `text` into an audio file at `path`, returning once it is written
    fn synthesize_to_file(&mut self, text: &str, path: &Path) -> Result<()>;

    /// Stop any ongoing output and release engine resources
    fn stop(&mut self) -> Result<()>;
}

/// Builds an engine on the thread that will own it
pub type EngineFactory = Box<dyn FnOnce() -> Result<Box<dyn SpeechEngine>> + Send + 'static>;

/// Stops the engine when dropped, so teardown runs on every exit path
pub(crate) struct EngineGuard(Box<dyn SpeechEngine>);

impl EngineGuard {
    pub(crate) fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self(engine)
    }
}

impl Deref for EngineGuard {
    type Target = dyn SpeechEngine;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for EngineGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.stop() {
            tracing::warn!("Failed to stop speech engine: {}", e);
        }
    }
}

/// Which engine implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// espeak-ng (or a compatible binary)
    #[default]
    Espeak,
    /// No audio; utterances are logged
    Silent,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Espeak => write!(f, "espeak"),
            EngineKind::Silent => write!(f, "silent"),
        }
    }
}

/// Everything needed to construct an engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub kind: EngineKind,
    /// Voice name passed to the engine, engine default when `None`
    pub voice: Option<String>,
    /// Binary used by [`EspeakEngine`]
    pub program: PathBuf,
}

impl EngineOptions {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            voice: None,
            program: PathBuf::from(DEFAULT_ESPEAK_PROGRAM),
        }
    }

    /// Build an engine on the calling thread
    pub fn create(&self) -> Result<Box<dyn SpeechEngine>> {
        match self.kind {
            EngineKind::Espeak => {
                let engine = EspeakEngine::with_program(&self.program)?;
                let engine = match &self.voice {
                    Some(voice) => engine.with_voice(voice.clone()),
                    None => engine,
                };
                Ok(Box::new(engine))
            }
            EngineKind::Silent => Ok(Box::new(SilentEngine::new())),
        }
    }

    /// Factory that builds the engine later, on whichever thread calls it
    pub fn factory(&self) -> EngineFactory {
        let options = self.clone();
        Box::new(move || options.create())
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new(EngineKind::default())
    }
}
