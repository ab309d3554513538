//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::time::Duration;

/// Upper bound for any run that is expected to stop promptly
pub fn shutdown_deadline() -> Duration {
    Duration::from_secs(2)
}

/// Turn string literals into owned lines
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
