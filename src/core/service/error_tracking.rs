// src/core/service/error_tracking.rs

//! Reporting hooks for failures seen by live document services.

use crate::core::DocRelayError;
use tracing::error;

/// Receives every failure a live service returns to its caller.
pub trait ErrorTracker: Send + Sync {
    fn track(&self, context: &str, error: &DocRelayError);
}

/// Reports failures through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorTracker;

impl ErrorTracker for LoggingErrorTracker {
    fn track(&self, context: &str, error: &DocRelayError) {
        error!("{}: {}", context, error);
    }
}

/// Discards failure reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledErrorTracker;

impl ErrorTracker for DisabledErrorTracker {
    fn track(&self, _context: &str, _error: &DocRelayError) {}
}
