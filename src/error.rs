//! Error handling for speakline
//!
//! This module defines the crate error type and a Result alias used
//! throughout the library. The binary wraps these in `anyhow` at the
//! top level.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for speakline operations
#[derive(Error, Debug)]
pub enum SpeakLineError {
    /// The TTS engine could not be started at all
    #[error("Speech engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A single utterance failed to play
    #[error("Speech error: {0}")]
    Speech(String),

    /// A rate/volume/voice setting was rejected by the engine
    #[error("Engine setting rejected: {0}")]
    Setting(String),

    /// Synthesis to an audio file failed
    #[error("Synthesis to {path:?} failed: {message}")]
    Synthesis { path: PathBuf, message: String },

    /// The engine does not support the requested operation
    #[error("Unsupported by {engine} engine: {operation}")]
    Unsupported {
        engine: &'static str,
        operation: &'static str,
    },

    /// The lines file could not be read
    #[error("Failed to read lines file {path:?}: {source}")]
    LinesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to configuration loading and validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SpeakLineError>,
    },
}

impl SpeakLineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SpeakLineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for speakline operations
pub type Result<T> = std::result::Result<T, SpeakLineError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpeakLineError::EngineUnavailable("espeak-ng not found".to_string());
        assert_eq!(
            err.to_string(),
            "Speech engine unavailable: espeak-ng not found"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = SpeakLineError::Speech("device busy".to_string());
        let with_ctx = err.with_context("Failed to speak line 3");
        assert!(with_ctx.to_string().contains("Failed to speak line 3"));
        assert!(with_ctx.to_string().contains("device busy"));
    }

    #[test]
    fn test_lines_file_error_keeps_source() {
        use std::error::Error as _;

        let err = SpeakLineError::LinesFile {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(SpeakLineError::Config("bad rate".to_string()));
        let err = result.context("Loading config").unwrap_err();
        assert_eq!(err.to_string(), "Loading config: Configuration error: bad rate");
    }
}
