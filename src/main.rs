//! speakline - Main Entry Point
//!
//! Prints lines to the console while a background worker speaks them, or
//! renders them to an audio file with `--save`.

use clap::Parser;
use speakline::{
    cli::{Cli, Mode},
    pipeline::Supervisor,
    synth,
};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "info,speakline=debug"
    } else {
        "warn,speakline=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the printed lines, so logs go to stderr
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    tracing::debug!("Starting speakline");

    match cli.resolve()? {
        Mode::Save { config, path } => {
            synth::save_to_file(&config.lines, &path, &config.speech, config.engine.factory())?;
        }
        Mode::Stream(config) => {
            let factory = config.speak.then(|| config.engine.factory());
            let summary = Supervisor::new(config, factory).run()?;

            if let Some(printer) = &summary.printer {
                if let Some(error) = &printer.error {
                    tracing::warn!("Printing stopped early: {}", error);
                }
                tracing::debug!(
                    printed = printer.printed,
                    enqueued = printer.enqueued,
                    dropped = printer.dropped,
                    "Printer report"
                );
            }
            if let Some(speaker) = &summary.speaker {
                tracing::debug!(
                    spoken = speaker.spoken,
                    failed = speaker.failed,
                    "Speaker report"
                );
            }
            if summary.interrupted {
                tracing::info!("Interrupted, exiting");
            }
        }
    }

    Ok(())
}
