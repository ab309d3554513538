//! One-shot synthesis of all lines into an audio file
//!
//! Runs synchronously on the calling thread; no queue, no workers. Every
//! failure is returned to the caller.

use crate::config::SpeechSettings;
use crate::error::{Result, ResultExt};
use crate::tts::{EngineFactory, EngineGuard};
use std::path::Path;

/// Synthesize `lines`, joined by newlines, into `path`
///
/// An empty `lines` slice writes nothing and returns `Ok`.
pub fn save_to_file(
    lines: &[String],
    path: impl AsRef<Path>,
    settings: &SpeechSettings,
    engine_factory: EngineFactory,
) -> Result<()> {
    let path = path.as_ref();

    if lines.is_empty() {
        tracing::warn!("No lines to synthesize, {} not written", path.display());
        return Ok(());
    }

    let text = lines.join("\n");
    let mut engine = EngineGuard::new(engine_factory()?);

    engine
        .set_rate(settings.rate)
        .context("Configuring speech rate")?;
    engine
        .set_volume(settings.volume)
        .context("Configuring speech volume")?;

    tracing::info!(lines = lines.len(), "Synthesizing to {}", path.display());
    let result = engine.synthesize_to_file(&text, path);
    drop(engine);

    result?;
    tracing::info!("Saved speech to {}", path.display());
    Ok(())
}
