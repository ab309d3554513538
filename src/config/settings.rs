//! Speech and timing settings
//!
//! These are the knobs the workers read while running. They are plain values
//! copied into each worker when it is spawned; nothing here is shared or
//! mutated during a run.

use super::{
    DEFAULT_JOIN_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POP_TIMEOUT_MS,
    DEFAULT_PRINT_INTERVAL_MS, DEFAULT_PUSH_TIMEOUT_MS, DEFAULT_RATE_WPM, DEFAULT_VOLUME,
};
use std::time::Duration;

/// Parameters passed to the speech engine before it speaks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechSettings {
    /// Speaking rate in words per minute
    pub rate: u32,
    /// Output volume, 0.0..=1.0
    pub volume: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE_WPM,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Sleep, poll and wait intervals for the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSettings {
    /// Delay between printed lines
    pub print_interval: Duration,
    /// How long the printer waits for queue space before dropping a line
    pub push_timeout: Duration,
    /// How long the speech worker waits on an empty queue before
    /// rechecking the shutdown signal
    pub pop_timeout: Duration,
    /// Supervisor poll interval
    pub poll_interval: Duration,
    /// Bounded join per worker at shutdown
    pub join_timeout: Duration,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            print_interval: Duration::from_millis(DEFAULT_PRINT_INTERVAL_MS),
            push_timeout: Duration::from_millis(DEFAULT_PUSH_TIMEOUT_MS),
            pop_timeout: Duration::from_millis(DEFAULT_POP_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            join_timeout: Duration::from_millis(DEFAULT_JOIN_TIMEOUT_MS),
        }
    }
}

impl TimingSettings {
    /// Intervals suited to tests: no print delay, short polls
    pub fn fast() -> Self {
        Self {
            print_interval: Duration::ZERO,
            push_timeout: Duration::from_millis(10),
            pop_timeout: Duration::from_millis(20),
            poll_interval: Duration::from_millis(10),
            join_timeout: Duration::from_secs(2),
        }
    }
}
