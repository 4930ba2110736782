//! Sequential download orchestration.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::config::UpdaterConfig;
use crate::error::{UpdateError, UpdateResult};
use crate::manifest::ServerEndpoint;
use crate::progress::ProgressTracker;

use super::http::ArtifactClient;
use super::staging::StagedArtifact;

/// Downloads every update artifact into staged temporary storage.
///
/// Artifacts are fetched one at a time, in the update set's order, with
/// progress reported in the 0–50 band. The policy is fail-fast: the first
/// connection error, non-200 response, or mid-stream error aborts the
/// batch, and no retries are attempted. Already-staged artifacts are
/// dropped with the discarded result, which deletes their temp files.
#[derive(Debug)]
pub struct DownloadOrchestrator {
    client: ArtifactClient,
    staging_dir: PathBuf,
}

/// Result of a completed download phase.
#[derive(Debug)]
pub struct DownloadedArtifacts {
    artifacts: Vec<StagedArtifact>,
    bytes_downloaded: u64,
}

impl DownloadedArtifacts {
    /// Number of staged artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the download phase produced nothing.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total bytes fetched from the server.
    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded
    }

    /// Consume the set, yielding the staged artifacts in download order.
    pub fn into_artifacts(self) -> Vec<StagedArtifact> {
        self.artifacts
    }
}

impl DownloadOrchestrator {
    /// Create an orchestrator for `endpoint` using `config`'s timeout and
    /// staging directory.
    pub fn new(endpoint: ServerEndpoint, config: &UpdaterConfig) -> Self {
        Self {
            client: ArtifactClient::new(endpoint, config.http_timeout),
            staging_dir: config.staging_dir.clone(),
        }
    }

    /// Download all artifacts named by `updates`.
    ///
    /// Cancellation is polled before each fetch and inside the streaming
    /// loop; once observed the batch aborts with
    /// [`UpdateError::Cancelled`] without touching remaining entries.
    pub fn download_all(
        &self,
        updates: &BTreeMap<PathBuf, String>,
        tracker: &ProgressTracker,
        token: &CancelToken,
    ) -> UpdateResult<DownloadedArtifacts> {
        let total = updates.len();
        tracker.update(0, &format!("Downloading updates (0/{total})..."));
        tracing::info!("Downloading updates (0/{total})...");

        if total == 0 {
            tracker.set_fraction(50);
            return Ok(DownloadedArtifacts {
                artifacts: Vec::new(),
                bytes_downloaded: 0,
            });
        }

        fs::create_dir_all(&self.staging_dir)
            .map_err(|e| UpdateError::fs(&self.staging_dir, e))?;

        let mut artifacts = Vec::with_capacity(total);
        let mut bytes_downloaded = 0u64;

        for (target, hash) in updates {
            if token.is_cancelled() {
                tracing::info!("update cancelled");
                return Err(UpdateError::Cancelled);
            }

            let mut artifact = StagedArtifact::create(&self.staging_dir, target, hash)?;
            match self.client.fetch(hash, &mut artifact, token) {
                Ok(bytes) => bytes_downloaded += bytes,
                Err(e) if e.is_cancelled() => {
                    tracing::info!("update cancelled");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("could not download {}: {e}", target.display());
                    return Err(e);
                }
            }
            artifacts.push(artifact);

            let done = artifacts.len();
            let fraction = (50 * done / total) as u32;
            tracker.update(fraction, &format!("Downloading updates ({done}/{total})..."));
            tracing::info!("Downloading updates ({done}/{total})...");
        }

        Ok(DownloadedArtifacts {
            artifacts,
            bytes_downloaded,
        })
    }
}
