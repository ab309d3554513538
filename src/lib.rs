//! # speakline: a speaking text printer
//!
//! Prints a list of lines to the console at a steady pace while a background
//! worker speaks each one through a text-to-speech engine. Printing never
//! waits on speech: lines travel to the speech worker through a bounded queue
//! and are dropped (with a warning) when the queue stays full.
//!
//! ## Architecture
//!
//! - **Pipeline**: printer and speech worker threads, the queue between them,
//!   a shared shutdown signal, and the supervisor that runs them
//! - **TTS**: the [`tts::SpeechEngine`] trait plus an espeak-ng engine and a
//!   silent engine; engines live only on the speech worker's thread
//! - **Synth**: one-shot rendering of all lines to an audio file
//! - **Config**: defaults, TOML file, and CLI flags merged into a
//!   [`config::RunConfig`]
//!
//! ## Example
//!
//! ```ignore
//! use speakline::{config::RunConfig, pipeline::Supervisor};
//!
//! fn main() -> speakline::Result<()> {
//!     let config = RunConfig::default();
//!     let factory = config.engine.factory();
//!     let summary = Supervisor::new(config, Some(factory)).run()?;
//!     println!("interrupted: {}", summary.interrupted);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod lines;
pub mod pipeline;
pub mod synth;
pub mod tts;
pub mod types;

// Re-export commonly used types
pub use config::{RunConfig, SpeechSettings, TimingSettings};
pub use error::{Result, SpeakLineError};
pub use pipeline::{MessageQueue, ShutdownHandle, ShutdownSignal, Supervisor};
pub use tts::{EngineFactory, EngineKind, EngineOptions, SpeechEngine};
pub use types::{PrinterReport, RunSummary, SpeakerReport, WorkerState};
