//! Speech worker
//!
//! Consumes lines from the queue and speaks them. The engine is created by
//! calling the [`EngineFactory`] on the worker's own thread and is dropped
//! there too; it is never reachable from any other thread.
//!
//! # Loop
//!
//! - Shutdown signal set: exit
//! - Pop with `pop_timeout`:
//!   - nothing arrived: go round again (this is where the signal is rechecked)
//!   - sentinel: exit without speaking
//!   - line: speak it; a failure is logged and the next line is taken
//!
//! The engine is stopped by a drop guard, so teardown happens however the loop
//! ends.

use crate::config::SpeechSettings;
use crate::pipeline::queue::{MessageQueue, PopOutcome};
use crate::pipeline::shutdown::ShutdownSignal;
use crate::pipeline::status::WorkerStatus;
use crate::tts::{EngineFactory, EngineGuard, SpeechEngine};
use crate::types::{SpeakerReport, WorkerState};
use std::time::Duration;

/// Consumes the queue and drives the TTS engine
pub struct SpeechWorker {
    queue: MessageQueue,
    shutdown: ShutdownSignal,
    settings: SpeechSettings,
    pop_timeout: Duration,
    status: WorkerStatus,
}

impl SpeechWorker {
    pub fn new(
        queue: MessageQueue,
        shutdown: ShutdownSignal,
        settings: SpeechSettings,
        pop_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            shutdown,
            settings,
            pop_timeout,
            status: WorkerStatus::new(),
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

    /// Build the engine and consume the queue on the calling thread
    pub fn run(self, factory: EngineFactory) -> SpeakerReport {
        let _exit = self.status.exit_guard();
        let mut report = SpeakerReport::default();

        let engine = match factory() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!("Speech engine failed to initialize, continuing without speech: {}", e);
                return report;
            }
        };
        report.engine_available = true;

        let mut engine = EngineGuard::new(engine);
        self.configure(&mut *engine);

        self.status.advance(WorkerState::Running);
        tracing::info!(
            rate = self.settings.rate,
            volume = self.settings.volume,
            "Speech worker started"
        );

        self.speak_loop(&mut *engine, &mut report);

        self.status.advance(WorkerState::Draining);
        drop(engine);

        tracing::info!(
            spoken = report.spoken,
            failed = report.failed,
            "Speech worker stopped"
        );
        report
    }

    fn configure(&self, engine: &mut dyn SpeechEngine) {
        if let Err(e) = engine.set_rate(self.settings.rate) {
            tracing::warn!("Engine rejected rate {}: {}", self.settings.rate, e);
        }
        if let Err(e) = engine.set_volume(self.settings.volume) {
            tracing::warn!("Engine rejected volume {}: {}", self.settings.volume, e);
        }
    }

    fn speak_loop(&self, engine: &mut dyn SpeechEngine, report: &mut SpeakerReport) {
        loop {
            if self.shutdown.is_set() {
                tracing::debug!("Speech worker observed shutdown signal");
                return;
            }

            match self.queue.pop(self.pop_timeout) {
                PopOutcome::Empty => continue,
                PopOutcome::Sentinel => {
                    report.received_sentinel = true;
                    return;
                }
                PopOutcome::Closed => {
                    tracing::debug!("Speech queue closed");
                    return;
                }
                PopOutcome::Line(line) => {
                    tracing::trace!("Speaking: {}", line);
                    match engine.speak(&line) {
                        Ok(()) => report.spoken += 1,
                        Err(e) => {
                            tracing::error!("Failed to speak line: {}", e);
                            report.failed += 1;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpeakLineError;
    use crate::tts::MockSpeechEngine;
    use mockall::predicate::eq;
    use mockall::Sequence;

    const POP: Duration = Duration::from_millis(20);

    fn worker(queue: &MessageQueue, shutdown: &ShutdownSignal) -> SpeechWorker {
        SpeechWorker::new(
            queue.clone(),
            shutdown.clone(),
            SpeechSettings {
                rate: 200,
                volume: 0.5,
            },
            POP,
        )
    }

    fn factory_for(engine: MockSpeechEngine) -> EngineFactory {
        Box::new(move || Ok(Box::new(engine) as Box<dyn SpeechEngine>))
    }

    fn configured_mock() -> MockSpeechEngine {
        let mut engine = MockSpeechEngine::new();
        engine
            .expect_set_rate()
            .with(eq(200u32))
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_set_volume()
            .with(eq(0.5f32))
            .times(1)
            .returning(|_| Ok(()));
        engine
    }

    #[test]
    fn test_speaks_lines_in_order_then_exits_on_sentinel() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push("one", POP);
        queue.push("two", POP);
        assert!(queue.push_sentinel(POP));

        let mut engine = configured_mock();
        let mut seq = Sequence::new();
        engine
            .expect_speak()
            .with(eq("one"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        engine
            .expect_speak()
            .with(eq("two"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        engine.expect_stop().times(1).returning(|| Ok(()));

        let report = worker(&queue, &shutdown).run(factory_for(engine));

        assert!(report.engine_available);
        assert!(report.received_sentinel);
        assert_eq!(report.spoken, 2);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_sentinel_is_never_spoken() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push_sentinel(POP);
        queue.push("after sentinel", POP);

        let mut engine = configured_mock();
        engine.expect_speak().never();
        engine.expect_stop().times(1).returning(|| Ok(()));

        let report = worker(&queue, &shutdown).run(factory_for(engine));

        assert!(report.received_sentinel);
        assert_eq!(report.processed(), 0);
        // the line behind the sentinel is left for whoever owns the queue
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_speak_failure_does_not_stop_worker() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push("bad", POP);
        queue.push("good", POP);
        queue.push_sentinel(POP);

        let mut engine = configured_mock();
        engine
            .expect_speak()
            .with(eq("bad"))
            .returning(|_| Err(SpeakLineError::Speech("audio device busy".to_string())));
        engine
            .expect_speak()
            .with(eq("good"))
            .returning(|_| Ok(()));
        engine.expect_stop().times(1).returning(|| Ok(()));

        let report = worker(&queue, &shutdown).run(factory_for(engine));

        assert_eq!(report.failed, 1);
        assert_eq!(report.spoken, 1);
        assert_eq!(report.processed(), 2);
    }

    #[test]
    fn test_engine_init_failure_leaves_queue_untouched() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push("waiting", POP);

        let w = worker(&queue, &shutdown);
        let status = w.status();
        let factory: EngineFactory =
            Box::new(|| Err(SpeakLineError::EngineUnavailable("no espeak".to_string())));
        let report = w.run(factory);

        assert!(!report.engine_available);
        assert_eq!(report.processed(), 0);
        assert_eq!(queue.len(), 1);
        assert!(status.is_exited());
    }

    #[test]
    fn test_preset_signal_exits_without_consuming() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push("pending", POP);
        shutdown.set();

        let mut engine = configured_mock();
        engine.expect_speak().never();
        engine.expect_stop().times(1).returning(|| Ok(()));

        let report = worker(&queue, &shutdown).run(factory_for(engine));

        assert!(!report.received_sentinel);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_rejected_settings_are_not_fatal() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();
        queue.push("still spoken", POP);
        queue.push_sentinel(POP);

        let mut engine = MockSpeechEngine::new();
        engine
            .expect_set_rate()
            .returning(|_| Err(SpeakLineError::Setting("rate".to_string())));
        engine
            .expect_set_volume()
            .returning(|_| Err(SpeakLineError::Setting("volume".to_string())));
        engine.expect_speak().times(1).returning(|_| Ok(()));
        engine.expect_stop().times(1).returning(|| Ok(()));

        let report = worker(&queue, &shutdown).run(factory_for(engine));
        assert_eq!(report.spoken, 1);
    }

    #[test]
    fn test_empty_queue_rechecks_signal() {
        let queue = MessageQueue::new(8);
        let shutdown = ShutdownSignal::new();

        let mut engine = configured_mock();
        engine.expect_speak().never();
        engine.expect_stop().times(1).returning(|| Ok(()));

        let w = worker(&queue, &shutdown);
        let status = w.status();
        let factory = factory_for(engine);
        let handle = std::thread::spawn(move || w.run(factory));

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(status.get(), WorkerState::Running);
        shutdown.set();

        let report = handle.join().unwrap();
        assert!(!report.received_sentinel);
        assert!(status.is_exited());
    }
}
