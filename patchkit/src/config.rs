//! Configuration for the update engine.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for an [`crate::Updater`] run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// How long to wait before downloading begins, so the application being
    /// updated can fully exit.
    pub grace_period: Duration,

    /// HTTP request timeout for artifact downloads.
    pub http_timeout: Duration,

    /// Directory for staged artifact downloads.
    pub staging_dir: PathBuf,

    /// How often the monitor polls the UI collaborator's cancel signal.
    pub poll_interval: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(3),
            http_timeout: Duration::from_secs(30),
            staging_dir: std::env::temp_dir(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl UpdaterConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period before downloads begin.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the staging directory for downloaded artifacts.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Set the monitor poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
