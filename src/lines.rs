//! Where the printed and spoken lines come from
//!
//! Either the built-in demo lines or a plain text file with one utterance per
//! non-blank line.

use crate::error::{Result, SpeakLineError};
use std::path::Path;

/// Lines used when no file is given
pub const DEFAULT_LINES: [&str; 5] = [
    "Hello, this is a live speaking text printer.",
    "This app prints and speaks text continuously.",
    "You can modify the text list to include your own content.",
    "Rust makes it easy to combine speech and printing.",
    "Thanks for using this demo!",
];

pub fn default_lines() -> Vec<String> {
    DEFAULT_LINES.iter().map(|s| s.to_string()).collect()
}

/// Split file contents into utterances
///
/// Line endings are stripped, blank and whitespace-only lines are skipped,
/// and leading whitespace on kept lines is preserved.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a lines file
///
/// Fails with [`SpeakLineError::LinesFile`] if the file cannot be read. An
/// empty result is not an error here; callers decide what an empty run means.
pub fn load_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SpeakLineError::LinesFile {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = parse_lines(&text);
    tracing::debug!("Loaded {} lines from {}", lines.len(), path.display());
    Ok(lines)
}
