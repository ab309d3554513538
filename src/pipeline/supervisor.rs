//! Supervisor / run loop
//!
//! Owns the queue, the shutdown signal and both worker threads for the
//! duration of one run.
//!
//! # Run sequence
//!
//! 1. Install the OS signal listener (optional; failure is logged)
//! 2. Spawn the speech worker (when speech is enabled), then the printer
//! 3. Poll every `poll_interval`:
//!    - printer finished on its own: enqueue a sentinel so the speech worker
//!      drains what is left and exits (retried each tick while the queue is
//!      full)
//!    - shutdown signal set: make sure the sentinel is queued, stop polling
//!    - both workers exited: stop polling
//!
//!    The printer watches the speech worker's status and stops enqueueing if
//!    it exits early (for example when no engine could be built).
//! 4. Join each worker with `join_timeout`; a worker still running after that
//!    is detached and reported as missing from the summary
//!
//! Joining uses a per-worker "done" channel whose sender lives inside the
//! thread closure. The channel disconnects when the thread finishes (or
//! unwinds), which lets the supervisor wait with a timeout before calling the
//! blocking `JoinHandle::join`.

use crate::config::RunConfig;
use crate::error::Result;
use crate::pipeline::printer::{PrinterOptions, PrinterWorker};
use crate::pipeline::queue::MessageQueue;
use crate::pipeline::shutdown::{ShutdownHandle, ShutdownSignal};
use crate::pipeline::signals::SignalListener;
use crate::pipeline::speaker::SpeechWorker;
use crate::pipeline::status::WorkerStatus;
use crate::tts::EngineFactory;
use crate::types::{PrinterReport, RunSummary, SpeakerReport};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::io::Write;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Output stream the printer writes to
pub type Output = Box<dyn Write + Send + 'static>;

/// A spawned worker thread plus what the supervisor needs to watch it
struct WorkerHandle<R> {
    name: &'static str,
    status: WorkerStatus,
    thread: JoinHandle<R>,
    done: Receiver<()>,
}

impl<R: Send + 'static> WorkerHandle<R> {
    fn spawn<F>(name: &'static str, status: WorkerStatus, body: F) -> Result<Self>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (done_tx, done) = bounded::<()>(0);
        let thread = std::thread::Builder::new()
            .name(format!("speakline-{}", name))
            .spawn(move || {
                let _done = done_tx;
                body()
            })?;

        Ok(Self {
            name,
            status,
            thread,
            done,
        })
    }

    fn is_exited(&self) -> bool {
        self.status.is_exited()
    }

    /// Wait up to `timeout` for the thread to finish, then join it
    fn join_within(self, timeout: Duration) -> Option<R> {
        match self.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "{} worker still {} after {:?}, leaving it detached",
                    self.name,
                    self.status.get(),
                    timeout
                );
                None
            }
            // Disconnected: the thread dropped its sender on the way out
            _ => match self.thread.join() {
                Ok(result) => Some(result),
                Err(_) => {
                    tracing::error!("{} worker panicked", self.name);
                    None
                }
            },
        }
    }
}

/// Runs one printer + speech worker session
pub struct Supervisor {
    config: RunConfig,
    engine_factory: Option<EngineFactory>,
    output: Output,
    queue: MessageQueue,
    shutdown: ShutdownSignal,
    install_signal_handlers: bool,
}

impl Supervisor {
    /// Create a supervisor writing to stdout
    ///
    /// `engine_factory` is only called on the speech worker's thread; pass
    /// `None` or set `config.speak = false` to run without speech.
    pub fn new(config: RunConfig, engine_factory: Option<EngineFactory>) -> Self {
        let queue = MessageQueue::new(config.queue_capacity);
        Self {
            config,
            engine_factory,
            output: Box::new(std::io::stdout()),
            queue,
            shutdown: ShutdownSignal::new(),
            install_signal_handlers: true,
        }
    }

    /// Print to `output` instead of stdout
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Whether `run` installs SIGINT/SIGTERM handling (default true)
    pub fn with_signal_handlers(mut self, install: bool) -> Self {
        self.install_signal_handlers = install;
        self
    }

    /// Handle that stops the run from another thread, like an interrupt would
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.shutdown.clone(), self.queue.clone())
    }

    fn speech_enabled(&self) -> bool {
        self.config.speak && self.engine_factory.is_some()
    }

    /// Run until both workers finish or shutdown is requested
    pub fn run(mut self) -> Result<RunSummary> {
        if self.config.lines.is_empty() {
            tracing::info!("No lines to print, nothing to do");
            return Ok(RunSummary::default());
        }

        let handle = self.shutdown_handle();
        let timing = self.config.timing;
        let speech_enabled = self.speech_enabled();
        let run_once = self.config.run_once();

        let listener = if self.install_signal_handlers {
            match SignalListener::install(handle.clone()) {
                Ok(listener) => Some(listener),
                Err(e) => {
                    tracing::warn!("Running without OS signal handling: {}", e);
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            lines = self.config.lines.len(),
            speech = speech_enabled,
            run_once,
            "Starting run"
        );

        let speaker = match self.engine_factory.take().filter(|_| speech_enabled) {
            Some(factory) => {
                let status = WorkerStatus::new();
                let worker = SpeechWorker::new(
                    self.queue.clone(),
                    self.shutdown.clone(),
                    self.config.speech,
                    timing.pop_timeout,
                )
                .with_status(status.clone());
                Some(WorkerHandle::spawn("speech", status, move || {
                    worker.run(factory)
                })?)
            }
            None => None,
        };

        let printer = {
            let status = WorkerStatus::new();
            let mut worker = PrinterWorker::new(
                std::mem::take(&mut self.config.lines),
                self.queue.clone(),
                self.shutdown.clone(),
                PrinterOptions::from_timing(&timing, speech_enabled, run_once),
            )
            .with_status(status.clone());
            if let Some(speaker) = &speaker {
                worker = worker.with_consumer(speaker.status.clone());
            }
            let mut output = std::mem::replace(&mut self.output, Box::new(std::io::sink()));
            let spawned = WorkerHandle::spawn("printer", status, move || worker.run(&mut output));
            match spawned {
                Ok(printer) => printer,
                Err(e) => {
                    handle.trigger();
                    if let Some(speaker) = speaker {
                        speaker.join_within(timing.join_timeout);
                    }
                    return Err(e);
                }
            }
        };

        self.poll(&printer, speaker.as_ref(), &handle);

        let printer_report: Option<PrinterReport> = printer.join_within(timing.join_timeout);
        let speaker_report: Option<SpeakerReport> =
            speaker.and_then(|speaker| speaker.join_within(timing.join_timeout));

        if let Some(listener) = listener {
            listener.stop();
        }

        let summary = RunSummary {
            printer: printer_report,
            speaker: speaker_report,
            interrupted: self.shutdown.is_set(),
        };
        tracing::info!(interrupted = summary.interrupted, "Run finished");
        Ok(summary)
    }

    fn poll(
        &self,
        printer: &WorkerHandle<PrinterReport>,
        speaker: Option<&WorkerHandle<SpeakerReport>>,
        handle: &ShutdownHandle,
    ) {
        let poll_interval = self.config.timing.poll_interval;
        let started = Instant::now();
        let mut sentinel_sent = false;

        loop {
            if self.shutdown.is_set() {
                handle.trigger();
                break;
            }

            let speaker_exited = speaker.map_or(true, WorkerHandle::is_exited);

            if printer.is_exited() && !sentinel_sent && !speaker_exited {
                sentinel_sent = self.queue.push_sentinel(Duration::ZERO);
                if sentinel_sent {
                    tracing::debug!("Printer finished, speech worker draining");
                }
            }

            if printer.is_exited() && speaker_exited {
                break;
            }

            self.shutdown.wait_timeout(poll_interval);
        }

        tracing::debug!("Supervisor poll loop ended after {:?}", started.elapsed());
    }
}
