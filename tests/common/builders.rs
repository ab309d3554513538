//! Test data builders for creating test objects

use speakline::{RunConfig, TimingSettings};
use std::time::Duration;

/// Builder for run configs with test-friendly timing
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            config: RunConfig {
                lines: super::lines(lines),
                timing: TimingSettings::fast(),
                ..Default::default()
            },
        }
    }

    pub fn continuous(mut self) -> Self {
        self.config.continuous = true;
        self
    }

    pub fn mute(mut self) -> Self {
        self.config.speak = false;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn print_interval(mut self, interval: Duration) -> Self {
        self.config.timing.print_interval = interval;
        self
    }

    pub fn push_timeout(mut self, timeout: Duration) -> Self {
        self.config.timing.push_timeout = timeout;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfigBuilder::new(&["a", "b"])
            .continuous()
            .queue_capacity(3)
            .build();

        assert_eq!(config.lines, vec!["a", "b"]);
        assert!(config.continuous);
        assert_eq!(config.queue_capacity, 3);
        assert!(config.validate().is_ok());
    }
}
