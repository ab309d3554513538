//! Printer worker
//!
//! Writes each line to an output stream and optionally hands it to the speech
//! worker through the queue. The printer is never held up by speech: a full
//! queue costs at most `push_timeout` per line, after which the line is
//! dropped and printing carries on.
//!
//! # Loop
//!
//! For every line:
//!
//! 1. Stop if the shutdown signal is set
//! 2. Write the line and flush
//! 3. If enqueueing, push with a bounded wait (drops are logged, not fatal).
//!    Enqueueing stops for good once the consumer (see
//!    [`PrinterWorker::with_consumer`]) has exited.
//! 4. Wait `print_interval` on the shutdown signal
//!
//! In run-once mode the worker exits after one pass; otherwise it starts over
//! until the signal is set.

use crate::config::TimingSettings;
use crate::pipeline::queue::{MessageQueue, PushOutcome};
use crate::pipeline::shutdown::ShutdownSignal;
use crate::pipeline::status::WorkerStatus;
use crate::types::{PrinterReport, WorkerState};
use std::io::Write;
use std::time::Duration;

/// Printer behaviour for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterOptions {
    /// Delay after each line
    pub print_interval: Duration,
    /// Bounded wait for queue space
    pub push_timeout: Duration,
    /// Whether to push lines to the queue
    pub enqueue: bool,
    /// Exit after one pass instead of looping
    pub run_once: bool,
}

impl PrinterOptions {
    pub fn from_timing(timing: &TimingSettings, enqueue: bool, run_once: bool) -> Self {
        Self {
            print_interval: timing.print_interval,
            push_timeout: timing.push_timeout,
            enqueue,
            run_once,
        }
    }
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self::from_timing(&TimingSettings::default(), true, true)
    }
}

/// Produces lines for the console and the speech queue
pub struct PrinterWorker {
    lines: Vec<String>,
    queue: MessageQueue,
    shutdown: ShutdownSignal,
    options: PrinterOptions,
    status: WorkerStatus,
    consumer: Option<WorkerStatus>,
}

impl PrinterWorker {
    pub fn new(
        lines: Vec<String>,
        queue: MessageQueue,
        shutdown: ShutdownSignal,
        options: PrinterOptions,
    ) -> Self {
        Self {
            lines,
            queue,
            shutdown,
            options,
            status: WorkerStatus::new(),
            consumer: None,
        }
    }

    /// Report lifecycle transitions through `status`
    pub fn with_status(mut self, status: WorkerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> WorkerStatus {
        self.status.clone()
    }

    /// Stop enqueueing once the worker behind `consumer` has exited
    pub fn with_consumer(mut self, consumer: WorkerStatus) -> Self {
        self.consumer = Some(consumer);
        self
    }

    fn consumer_exited(&self) -> bool {
        self.consumer.as_ref().is_some_and(WorkerStatus::is_exited)
    }

    /// Run the printer on the calling thread until it finishes or is stopped
    pub fn run<W: Write>(self, out: &mut W) -> PrinterReport {
        let _exit = self.status.exit_guard();
        self.status.advance(WorkerState::Running);
        tracing::info!(
            lines = self.lines.len(),
            enqueue = self.options.enqueue,
            run_once = self.options.run_once,
            "Printer worker started"
        );

        let mut report = PrinterReport::default();

        if self.lines.is_empty() {
            tracing::info!("No lines to print");
        } else if let Err(e) = self.print_loop(out, &mut report) {
            tracing::error!("Printer worker failed: {}", e);
            report.error = Some(e.to_string());
        }

        self.status.advance(WorkerState::Draining);
        tracing::info!(
            printed = report.printed,
            enqueued = report.enqueued,
            dropped = report.dropped,
            interrupted = report.interrupted,
            "Printer worker stopped"
        );
        report
    }

    fn print_loop<W: Write>(&self, out: &mut W, report: &mut PrinterReport) -> std::io::Result<()> {
        let mut enqueue = self.options.enqueue;

        loop {
            for line in &self.lines {
                if self.shutdown.is_set() {
                    report.interrupted = true;
                    return Ok(());
                }

                writeln!(out, "{}", line)?;
                out.flush()?;
                report.printed += 1;

                if enqueue && self.consumer_exited() {
                    tracing::warn!("Speech worker has exited, printing without speech");
                    enqueue = false;
                }

                if enqueue {
                    match self.queue.push(line.as_str(), self.options.push_timeout) {
                        PushOutcome::Enqueued => report.enqueued += 1,
                        PushOutcome::Dropped => report.dropped += 1,
                        PushOutcome::Closed => {
                            tracing::warn!("Speech queue closed, continuing without speech");
                            report.dropped += 1;
                        }
                    }
                }

                if self.shutdown.wait_timeout(self.options.print_interval) {
                    report.interrupted = true;
                    return Ok(());
                }
            }

            if self.options.run_once {
                return Ok(());
            }
            tracing::trace!("Printer starting next pass");
        }
    }
}
