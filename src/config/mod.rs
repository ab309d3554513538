//! Configuration for speakline
//!
//! A run is described by a single [`RunConfig`] built once at startup and
//! handed to the supervisor. It is assembled in three layers, later layers
//! winning:
//!
//! 1. Built-in defaults ([`RunConfig::default`])
//! 2. An optional TOML file ([`ConfigFile`], `--config <path>`)
//! 3. Command line flags
//!
//! # Config file
//!
//! Every key is optional. Durations are given in milliseconds.
//!
//! ```toml
//! lines_file = "lines.txt"   # relative to the config file
//! continuous = false
//! speak = true
//!
//! [speech]
//! engine = "espeak"          # or "silent"
//! rate = 175
//! volume = 1.0
//! voice = "en-us"
//! program = "espeak-ng"
//!
//! [timing]
//! print_interval_ms = 500
//! push_timeout_ms = 100
//! pop_timeout_ms = 500
//! poll_interval_ms = 200
//! join_timeout_ms = 2000
//!
//! [queue]
//! capacity = 64
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, SpeakLineError};
use crate::lines::default_lines;
use crate::tts::espeak::{MAX_RATE_WPM, MIN_RATE_WPM};
use crate::tts::{EngineKind, EngineOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = crate::pipeline::queue::DEFAULT_QUEUE_CAPACITY;

/// Default speaking rate in words per minute
pub const DEFAULT_RATE_WPM: u32 = 175;

/// Default volume
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default delay between printed lines
pub const DEFAULT_PRINT_INTERVAL_MS: u64 = 500;

/// Default wait for queue space before a line is dropped
pub const DEFAULT_PUSH_TIMEOUT_MS: u64 = 100;

/// Default wait on an empty queue before rechecking shutdown
pub const DEFAULT_POP_TIMEOUT_MS: u64 = 500;

/// Default supervisor poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Default bounded join per worker
pub const DEFAULT_JOIN_TIMEOUT_MS: u64 = 2000;

/// Shortest accepted poll/pop interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Longest accepted poll/pop interval; keeps shutdown latency bounded
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything one supervisor run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Lines to print and speak, in order
    pub lines: Vec<String>,
    /// Capacity of the printer-to-speaker queue
    pub queue_capacity: usize,
    pub speech: SpeechSettings,
    pub timing: TimingSettings,
    /// Whether to start the speech worker and enqueue lines for it
    pub speak: bool,
    /// Loop over the lines until interrupted
    pub continuous: bool,
    /// Force a single pass even when `continuous` is set
    pub once: bool,
    pub engine: EngineOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lines: default_lines(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            speech: SpeechSettings::default(),
            timing: TimingSettings::default(),
            speak: true,
            continuous: false,
            once: false,
            engine: EngineOptions::default(),
        }
    }
}

impl RunConfig {
    /// Whether the printer stops after one pass
    pub fn run_once(&self) -> bool {
        self.once || !self.continuous
    }

    /// Check every value before any worker starts
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(SpeakLineError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.speech.volume) {
            return Err(SpeakLineError::Config(format!(
                "volume {} must be between 0.0 and 1.0",
                self.speech.volume
            )));
        }

        if !(MIN_RATE_WPM..=MAX_RATE_WPM).contains(&self.speech.rate) {
            return Err(SpeakLineError::Config(format!(
                "rate {} must be between {} and {} words per minute",
                self.speech.rate, MIN_RATE_WPM, MAX_RATE_WPM
            )));
        }

        for (name, value) in [
            ("pop timeout", self.timing.pop_timeout),
            ("poll interval", self.timing.poll_interval),
        ] {
            if !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&value) {
                return Err(SpeakLineError::Config(format!(
                    "{} {:?} must be between {:?} and {:?}",
                    name, value, MIN_POLL_INTERVAL, MAX_POLL_INTERVAL
                )));
            }
        }

        if self.timing.join_timeout.is_zero() {
            return Err(SpeakLineError::Config(
                "join timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// ==================== Config File ====================

/// On-disk TOML shape; every field overlays a [`RunConfig`] default
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub lines_file: Option<PathBuf>,
    pub continuous: Option<bool>,
    pub speak: Option<bool>,
    pub speech: SpeechSection,
    pub timing: TimingSection,
    pub queue: QueueSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechSection {
    pub engine: Option<EngineKind>,
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub voice: Option<String>,
    pub program: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSection {
    pub print_interval_ms: Option<u64>,
    pub push_timeout_ms: Option<u64>,
    pub pop_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub join_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueSection {
    pub capacity: Option<usize>,
}

impl ConfigFile {
    /// Parse TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SpeakLineError::Config(e.to_string()))
    }

    /// Read and parse a config file
    ///
    /// A relative `lines_file` is resolved against the config file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SpeakLineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut file = Self::parse(&text)
            .map_err(|e| e.with_context(format!("Invalid config file {}", path.display())))?;

        if let Some(lines_file) = &file.lines_file {
            if lines_file.is_relative() {
                if let Some(dir) = path.parent() {
                    file.lines_file = Some(dir.join(lines_file));
                }
            }
        }

        tracing::debug!("Loaded config file {}", path.display());
        Ok(file)
    }

    /// Overlay the values present in this file onto `config`
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(continuous) = self.continuous {
            config.continuous = continuous;
        }
        if let Some(speak) = self.speak {
            config.speak = speak;
        }

        let speech = &self.speech;
        if let Some(engine) = speech.engine {
            config.engine.kind = engine;
        }
        if let Some(rate) = speech.rate {
            config.speech.rate = rate;
        }
        if let Some(volume) = speech.volume {
            config.speech.volume = volume;
        }
        if let Some(voice) = &speech.voice {
            config.engine.voice = Some(voice.clone());
        }
        if let Some(program) = &speech.program {
            config.engine.program = program.clone();
        }

        let timing = &self.timing;
        let ms = Duration::from_millis;
        if let Some(v) = timing.print_interval_ms {
            config.timing.print_interval = ms(v);
        }
        if let Some(v) = timing.push_timeout_ms {
            config.timing.push_timeout = ms(v);
        }
        if let Some(v) = timing.pop_timeout_ms {
            config.timing.pop_timeout = ms(v);
        }
        if let Some(v) = timing.poll_interval_ms {
            config.timing.poll_interval = ms(v);
        }
        if let Some(v) = timing.join_timeout_ms {
            config.timing.join_timeout = ms(v);
        }

        if let Some(capacity) = self.queue.capacity {
            config.queue_capacity = capacity;
        }
    }
}
