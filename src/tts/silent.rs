//! Engine that produces no audio
//!
//! Used for `--engine silent` and on machines without a speech backend. Every
//! utterance is logged at debug level so the speech worker's behaviour can
//! still be followed in the logs.

use super::SpeechEngine;
use crate::error::{Result, SpeakLineError};
use std::path::Path;

#[derive(Debug, Default)]
pub struct SilentEngine {
    rate: Option<u32>,
    volume: Option<f32>,
}

impl SilentEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechEngine for SilentEngine {
    fn set_rate(&mut self, words_per_minute: u32) -> Result<()> {
        self.rate = Some(words_per_minute);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = Some(volume);
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        tracing::debug!(rate = ?self.rate, volume = ?self.volume, "(silent) {}", text);
        Ok(())
    }

    fn synthesize_to_file(&mut self, _text: &str, _path: &Path) -> Result<()> {
        Err(SpeakLineError::Unsupported {
            engine: "silent",
            operation: "synthesize to file",
        })
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
