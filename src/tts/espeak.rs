//! espeak-ng engine
//!
//! Drives an `espeak-ng` compatible binary as a child process, one process per
//! utterance. Text is written to the child's stdin (`--stdin`) so it is never
//! parsed as command line options.
//!
//! # Parameter mapping
//!
//! - rate: `-s <words per minute>`, accepted range [`MIN_RATE_WPM`]..=[`MAX_RATE_WPM`]
//! - volume: `-a <amplitude>`, 0.0..=1.0 mapped linearly onto 0..=100
//! - voice: `-v <name>`
//! - file output: `-w <path>` (WAV)

use super::SpeechEngine;
use crate::error::{Result, SpeakLineError};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Binary used when none is configured
pub const DEFAULT_ESPEAK_PROGRAM: &str = "espeak-ng";

/// Slowest rate espeak-ng accepts
pub const MIN_RATE_WPM: u32 = 80;

/// Fastest rate espeak-ng accepts
pub const MAX_RATE_WPM: u32 = 450;

/// Amplitude corresponding to volume 1.0
const FULL_AMPLITUDE: f32 = 100.0;

/// Speech engine backed by the espeak-ng command line tool
#[derive(Debug, Clone)]
pub struct EspeakEngine {
    program: PathBuf,
    voice: Option<String>,
    rate: Option<u32>,
    amplitude: Option<u32>,
}

impl EspeakEngine {
    /// Use the default `espeak-ng` from `PATH`
    pub fn new() -> Result<Self> {
        Self::with_program(DEFAULT_ESPEAK_PROGRAM)
    }

    /// Use a specific binary, checking that it can be run
    pub fn with_program(program: impl AsRef<Path>) -> Result<Self> {
        let program = program.as_ref().to_path_buf();

        let status = Command::new(&program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                SpeakLineError::EngineUnavailable(format!("{}: {}", program.display(), e))
            })?;

        if !status.success() {
            return Err(SpeakLineError::EngineUnavailable(format!(
                "{} --version exited with {}",
                program.display(),
                status
            )));
        }

        tracing::debug!("Using espeak binary {}", program.display());

        Ok(Self {
            program,
            voice: None,
            rate: None,
            amplitude: None,
        })
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Arguments shared by speaking and file synthesis
    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(rate) = self.rate {
            args.push("-s".to_string());
            args.push(rate.to_string());
        }
        if let Some(amplitude) = self.amplitude {
            args.push("-a".to_string());
            args.push(amplitude.to_string());
        }
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("--stdin".to_string());
        args
    }

    /// Run the binary with `extra` arguments, feeding `text` on stdin
    fn run(&self, extra: &[&OsStr], text: &str) -> std::result::Result<(), String> {
        let mut child = Command::new(&self.program)
            .args(self.base_args())
            .args(extra)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.program.display(), e))?;

        // A child that exits early closes its stdin; keep the write error and
        // still reap it so its exit status and stderr are reported
        let write_error = child
            .stdin
            .take()
            .and_then(|mut stdin| stdin.write_all(text.as_bytes()).err());

        let output = child
            .wait_with_output()
            .map_err(|e| format!("failed to wait for {}: {}", self.program.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {}", output.status, stderr)
            });
        }

        match write_error {
            Some(e) => Err(format!("failed to send text: {}", e)),
            None => Ok(()),
        }
    }
}

/// Map a 0.0..=1.0 volume onto espeak's amplitude scale
pub(crate) fn volume_to_amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * FULL_AMPLITUDE).round() as u32
}

impl SpeechEngine for EspeakEngine {
    fn set_rate(&mut self, words_per_minute: u32) -> Result<()> {
        if !(MIN_RATE_WPM..=MAX_RATE_WPM).contains(&words_per_minute) {
            return Err(SpeakLineError::Setting(format!(
                "rate {} outside {}..={} words per minute",
                words_per_minute, MIN_RATE_WPM, MAX_RATE_WPM
            )));
        }
        self.rate = Some(words_per_minute);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SpeakLineError::Setting(format!(
                "volume {} outside 0.0..=1.0",
                volume
            )));
        }
        self.amplitude = Some(volume_to_amplitude(volume));
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.run(&[], text).map_err(SpeakLineError::Speech)
    }

    fn synthesize_to_file(&mut self, text: &str, path: &Path) -> Result<()> {
        self.run(&[OsStr::new("-w"), path.as_os_str()], text)
            .map_err(|message| SpeakLineError::Synthesis {
                path: path.to_path_buf(),
                message,
            })?;

        if !path.exists() {
            return Err(SpeakLineError::Synthesis {
                path: path.to_path_buf(),
                message: "engine reported success but wrote no file".to_string(),
            });
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Each utterance runs to completion inside `speak`, so no child
        // process outlives a call.
        tracing::trace!("espeak engine stopped");
        Ok(())
    }
}
