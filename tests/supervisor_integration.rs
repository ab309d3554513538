//! Full supervisor runs with a recording engine

mod common;

use common::builders::RunConfigBuilder;
use common::mock_helpers::{Recording, RecordingEngine, SharedBuffer};
use serial_test::serial;
use speakline::{EngineKind, EngineOptions, Supervisor};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[test]
fn test_run_once_prints_and_speaks_everything() {
    let recording = Arc::new(Mutex::new(Recording::default()));
    let out = SharedBuffer::default();
    let config = RunConfigBuilder::new(&["line 1", "line 2", "line 3"]).build();
    let speech = config.speech;

    let summary = Supervisor::new(config, Some(RecordingEngine::new(recording.clone()).into_factory()))
        .with_output(out.clone())
        .with_signal_handlers(false)
        .run()
        .unwrap();

    assert_eq!(out.printed_lines(), vec!["line 1", "line 2", "line 3"]);
    assert!(!summary.interrupted);

    let speaker = summary.speaker.unwrap();
    assert!(speaker.engine_available);
    assert!(speaker.received_sentinel);
    assert_eq!(speaker.spoken, 3);

    let recording = recording.lock().unwrap();
    assert_eq!(recording.spoken, vec!["line 1", "line 2", "line 3"]);
    assert_eq!(recording.rate, Some(speech.rate));
    assert_eq!(recording.volume, Some(speech.volume));
    assert!(recording.stopped);
}

#[test]
fn test_failed_line_does_not_stop_later_lines() {
    let recording = Arc::new(Mutex::new(Recording::default()));
    let engine = RecordingEngine::new(recording.clone()).failing_on("bad");
    let config = RunConfigBuilder::new(&["good", "bad", "also good"]).build();

    let summary = Supervisor::new(config, Some(engine.into_factory()))
        .with_output(SharedBuffer::default())
        .with_signal_handlers(false)
        .run()
        .unwrap();

    let speaker = summary.speaker.unwrap();
    assert_eq!(speaker.spoken, 2);
    assert_eq!(speaker.failed, 1);
    assert_eq!(recording.lock().unwrap().spoken, vec!["good", "also good"]);
}

#[test]
fn test_muted_run_never_builds_engine() {
    let out = SharedBuffer::default();
    let config = RunConfigBuilder::new(&["quiet"]).mute().build();
    let factory: speakline::EngineFactory = Box::new(|| panic!("engine built while muted"));

    let summary = Supervisor::new(config, Some(factory))
        .with_output(out.clone())
        .with_signal_handlers(false)
        .run()
        .unwrap();

    assert_eq!(out.contents(), "quiet\n");
    assert!(summary.speaker.is_none());
}

#[test]
#[serial]
fn test_immediate_shutdown_joins_within_timeout() {
    let recording = Arc::new(Mutex::new(Recording::default()));
    let config = RunConfigBuilder::new(&["a", "b", "c"])
        .continuous()
        .print_interval(Duration::from_millis(20))
        .build();
    let join_timeout = config.timing.join_timeout;

    let supervisor = Supervisor::new(config, Some(RecordingEngine::new(recording).into_factory()))
        .with_output(SharedBuffer::default())
        .with_signal_handlers(false);
    let handle = supervisor.shutdown_handle();

    let start = Instant::now();
    let runner = std::thread::spawn(move || supervisor.run());
    handle.trigger();

    let summary = runner.join().unwrap().unwrap();
    assert!(start.elapsed() < join_timeout * 2 + common::shutdown_deadline());
    assert!(summary.interrupted);
    // Both workers were joined, not detached
    assert!(summary.printer.is_some());
    assert!(summary.speaker.is_some());
}

#[test]
#[serial]
fn test_slow_engine_drops_lines_but_printer_keeps_pace() {
    let recording = Arc::new(Mutex::new(Recording::default()));
    let engine = RecordingEngine::new(recording.clone()).with_speak_delay(Duration::from_millis(50));
    let lines: Vec<String> = (0..10).map(|i| format!("line {}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let config = RunConfigBuilder::new(&refs)
        .queue_capacity(1)
        .push_timeout(Duration::ZERO)
        .build();

    let out = SharedBuffer::default();
    let summary = Supervisor::new(config, Some(engine.into_factory()))
        .with_output(out.clone())
        .with_signal_handlers(false)
        .run()
        .unwrap();

    assert_eq!(out.printed_lines(), lines);
    let printer = summary.printer.unwrap();
    assert_eq!(printer.printed, 10);
    assert!(printer.dropped > 0);
    assert_eq!(printer.enqueued + printer.dropped, 10);

    // What was spoken is an ordered subsequence of what was printed
    let spoken = recording.lock().unwrap().spoken.clone();
    let mut printed = lines.iter();
    assert!(spoken.iter().all(|s| printed.any(|p| p == s)));
}

#[test]
#[serial]
fn test_silent_engine_continuous_run_with_signal_listener() {
    let config = RunConfigBuilder::new(&["tick"])
        .continuous()
        .print_interval(Duration::from_millis(5))
        .build();
    let factory = EngineOptions::new(EngineKind::Silent).factory();
    let out = SharedBuffer::default();

    let supervisor = Supervisor::new(config, Some(factory)).with_output(out.clone());
    let handle = supervisor.shutdown_handle();
    let runner = std::thread::spawn(move || supervisor.run());

    std::thread::sleep(Duration::from_millis(60));
    handle.trigger();

    let summary = runner.join().unwrap().unwrap();
    assert!(summary.interrupted);
    assert!(out.printed_lines().iter().all(|l| l == "tick"));
    assert!(summary.printer.unwrap().printed >= 1);
}

#[cfg(unix)]
#[test]
#[serial]
fn test_sigterm_stops_continuous_run() {
    use nix::sys::signal::{raise, Signal};

    let config = RunConfigBuilder::new(&["tick"])
        .continuous()
        .print_interval(Duration::from_millis(5))
        .build();
    let out = SharedBuffer::default();
    let supervisor = Supervisor::new(config, Some(EngineOptions::new(EngineKind::Silent).factory()))
        .with_output(out.clone());
    let runner = std::thread::spawn(move || supervisor.run());

    // The printer starts after the listener is installed, so output means
    // the handlers are live
    let deadline = Instant::now() + common::shutdown_deadline();
    while out.contents().is_empty() {
        assert!(Instant::now() < deadline, "printer never started");
        std::thread::sleep(Duration::from_millis(5));
    }

    let start = Instant::now();
    raise(Signal::SIGTERM).unwrap();

    let summary = runner.join().unwrap().unwrap();
    assert!(start.elapsed() < common::shutdown_deadline());
    assert!(summary.interrupted);
    assert!(summary.printer.unwrap().interrupted);
}
