//! Command line interface
//!
//! Flags are parsed with clap and then layered over the config file and the
//! built-in defaults to produce a [`RunConfig`].

use crate::config::{ConfigFile, RunConfig};
use crate::error::Result;
use crate::lines::load_lines;
use crate::tts::EngineKind;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Print lines to the console and speak them aloud
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "speakline", version, about)]
pub struct Cli {
    /// Text file with one line to speak per non-blank line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Keep looping over the lines until interrupted
    #[arg(short, long, conflicts_with = "save")]
    pub continuous: bool,

    /// Make a single pass even if continuous mode is configured
    #[arg(long)]
    pub once: bool,

    /// Speech rate in words per minute
    #[arg(short, long, value_name = "WPM")]
    pub rate: Option<u32>,

    /// Speech volume from 0.0 to 1.0
    #[arg(short, long)]
    pub volume: Option<f32>,

    /// Seconds to wait between printed lines
    #[arg(short, long, value_name = "SECONDS")]
    pub interval: Option<f64>,

    /// Write the speech to an audio file instead of printing and speaking
    #[arg(short, long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print only, without speaking
    #[arg(long)]
    pub mute: bool,

    /// Speech engine to use
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Voice name passed to the speech engine
    #[arg(long)]
    pub voice: Option<String>,

    /// Path to the espeak-ng binary
    #[arg(long, value_name = "PATH")]
    pub espeak_bin: Option<PathBuf>,

    /// Capacity of the queue between printer and speaker
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Print and speak through the worker pipeline
    Stream(RunConfig),
    /// Synthesize every line into a file
    Save { config: RunConfig, path: PathBuf },
}

impl Cli {
    /// Build the run configuration: defaults, then config file, then flags
    ///
    /// Reads the config file and lines file, so input errors surface here,
    /// before any worker starts.
    pub fn resolve(&self) -> Result<Mode> {
        let mut config = RunConfig::default();

        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        file.apply(&mut config);

        if let Some(path) = self.file.as_ref().or(file.lines_file.as_ref()) {
            config.lines = load_lines(path)?;
        }

        self.apply(&mut config);
        config.validate()?;

        Ok(match &self.save {
            Some(path) => Mode::Save {
                config,
                path: path.clone(),
            },
            None => Mode::Stream(config),
        })
    }

    /// Overlay explicit flags onto `config`
    fn apply(&self, config: &mut RunConfig) {
        if self.continuous {
            config.continuous = true;
        }
        if self.once {
            config.once = true;
        }
        if self.mute {
            config.speak = false;
        }
        if let Some(rate) = self.rate {
            config.speech.rate = rate;
        }
        if let Some(volume) = self.volume {
            config.speech.volume = volume;
        }
        if let Some(seconds) = self.interval {
            // Negative and NaN intervals mean "no delay"
            config.timing.print_interval =
                Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        }
        if let Some(engine) = self.engine {
            config.engine.kind = engine;
        }
        if let Some(voice) = &self.voice {
            config.engine.voice = Some(voice.clone());
        }
        if let Some(program) = &self.espeak_bin {
            config.engine.program = program.clone();
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
    }
}
