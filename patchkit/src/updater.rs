//! High-level update runner.
//!
//! Drives the full lifecycle (manifest ingestion, grace wait, download,
//! apply) on the calling thread, the worker, with a monitor thread
//! relaying progress to the UI collaborator and feeding its cancel signal
//! back into the run. Owns the terminal state: exactly one of `Done`,
//! `Failed`, or `Cancelled` is reached, and the sink is closed afterwards
//! regardless of outcome.

use std::io::Read;
use std::sync::Arc;

use crate::apply::ApplyEngine;
use crate::cancel::CancelToken;
use crate::config::UpdaterConfig;
use crate::download::DownloadOrchestrator;
use crate::error::{UpdateError, UpdateResult};
use crate::manifest::Manifest;
use crate::progress::{Monitor, Phase, ProgressSink, ProgressTracker};

/// The update worker.
pub struct Updater {
    config: UpdaterConfig,
}

/// Summary of a completed update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    /// Files removed from the install tree.
    pub removed: usize,
    /// Artifacts installed into the install tree.
    pub installed: usize,
    /// Total bytes fetched from the update server.
    pub bytes_downloaded: u64,
}

impl Updater {
    /// Create an updater with the given configuration.
    pub fn new(config: UpdaterConfig) -> Self {
        Self { config }
    }

    /// Run the full update lifecycle.
    ///
    /// Blocks until the run reaches a terminal phase. `input` carries the
    /// wire-encoded manifest; `sink` is the UI collaborator that receives
    /// progress and supplies the cancel signal.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; [`UpdateError::Cancelled`]
    /// marks a user-initiated stop rather than a failure.
    pub fn run<R: Read>(&self, input: R, sink: Arc<dyn ProgressSink>) -> UpdateResult<UpdateReport> {
        let tracker = Arc::new(ProgressTracker::new());
        let token = CancelToken::new();
        let monitor = Monitor::start(
            tracker.clone(),
            sink,
            token.clone(),
            self.config.poll_interval,
        );

        let result = self.execute(input, &tracker, &token);

        match &result {
            Ok(report) => {
                tracker.set_phase(Phase::Done);
                tracker.update(100, "Update complete");
                tracing::info!(
                    "files successfully updated ({} removed, {} installed, {} bytes downloaded)",
                    report.removed,
                    report.installed,
                    report.bytes_downloaded
                );
            }
            Err(UpdateError::Cancelled) => {
                tracker.set_phase(Phase::Cancelled);
                tracker.set_note("Update cancelled");
                tracing::info!("update cancelled");
            }
            Err(e) => {
                tracker.set_phase(Phase::Failed);
                tracker.set_note("Update failed");
                tracing::error!("update failed: {e}");
            }
        }

        monitor.stop();
        result
    }

    fn execute<R: Read>(
        &self,
        input: R,
        tracker: &ProgressTracker,
        token: &CancelToken,
    ) -> UpdateResult<UpdateReport> {
        self.enter_phase(tracker, Phase::ReadingInput, "Reading update manifest...");
        let manifest = Manifest::read_from(input).map_err(|e| {
            tracing::error!("could not read updater input: {e}");
            e
        })?;

        self.enter_phase(
            tracker,
            Phase::WaitingGrace,
            "Waiting for the application to exit...",
        );
        tracing::info!(
            "waiting {:?} for the application to exit",
            self.config.grace_period
        );
        if token.wait_timeout(self.config.grace_period) {
            return Err(UpdateError::Cancelled);
        }

        self.enter_phase(tracker, Phase::Downloading, "Downloading updates...");
        let orchestrator = DownloadOrchestrator::new(manifest.endpoint.clone(), &self.config);
        let downloaded = orchestrator.download_all(&manifest.updates, tracker, token)?;
        let bytes_downloaded = downloaded.bytes_downloaded();

        self.enter_phase(tracker, Phase::Applying, "Applying updates...");
        let engine = ApplyEngine::new(&manifest.install_root);
        let report = engine.apply(&manifest.removals, downloaded.into_artifacts(), tracker)?;

        Ok(UpdateReport {
            removed: report.removed,
            installed: report.installed,
            bytes_downloaded,
        })
    }

    fn enter_phase(&self, tracker: &ProgressTracker, phase: Phase, note: &str) {
        tracker.set_phase(phase);
        tracker.set_note(note);
        tracing::debug!("phase transition: {}", phase.name());
    }
}

impl Default for Updater {
    fn default() -> Self {
        Self::new(UpdaterConfig::default())
    }
}
