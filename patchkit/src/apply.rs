//! Apply phase: delete obsolete files, then install downloaded artifacts.
//!
//! Mutates the install tree in two passes and reports progress in the
//! 50–100 band. Each install is per-file atomic (temp file in the target's
//! directory, then a rename over the target); there is no batch rollback.
//! An error aborts the remaining items and leaves earlier ones applied.
//!
//! Cancellation is not observed here by policy: once apply begins, the run
//! ends in `Done` or `Failed`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::download::StagedArtifact;
use crate::error::{UpdateError, UpdateResult};
use crate::manifest::paths::resolve_under;
use crate::progress::ProgressTracker;

/// Applies a prepared update to the install tree.
#[derive(Debug, Clone)]
pub struct ApplyEngine {
    install_root: PathBuf,
}

/// Counts of work performed by a completed apply phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub removed: usize,
    pub installed: usize,
}

impl ApplyEngine {
    /// Create an engine rooted at `install_root`.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
        }
    }

    /// Delete every removal path, then install every staged artifact.
    ///
    /// Deleting a missing file is a no-op, so the removal pass is
    /// idempotent. Installs overwrite whatever is at the target path and
    /// create missing parent directories. The first I/O error aborts the
    /// remaining items.
    pub fn apply(
        &self,
        removals: &BTreeMap<PathBuf, String>,
        artifacts: Vec<StagedArtifact>,
        tracker: &ProgressTracker,
    ) -> UpdateResult<ApplyReport> {
        let total = removals.len() + artifacts.len();
        tracker.update(50, &format!("Applying updates (0/{total})..."));
        tracing::info!("Applying updates (0/{total})...");

        if total == 0 {
            tracker.set_fraction(100);
            return Ok(ApplyReport {
                removed: 0,
                installed: 0,
            });
        }

        let mut done = 0;

        for path in removals.keys() {
            let resolved = resolve_under(&self.install_root, path)?;
            tracing::info!("Removing {}...", path.display());
            remove_if_exists(&resolved)?;
            done += 1;
            report(tracker, done, total);
        }

        let mut installed = 0;
        for artifact in &artifacts {
            let resolved = resolve_under(&self.install_root, artifact.target())?;
            tracing::info!("Updating {}...", artifact.target().display());
            install_artifact(artifact, &resolved)?;
            installed += 1;
            done += 1;
            report(tracker, done, total);
        }

        Ok(ApplyReport {
            removed: removals.len(),
            installed,
        })
    }
}

fn report(tracker: &ProgressTracker, done: usize, total: usize) {
    let fraction = (50 + 50 * done / total) as u32;
    tracker.update(fraction, &format!("Applying updates ({done}/{total})..."));
    tracing::info!("Applying updates ({done}/{total})...");
}

fn remove_if_exists(path: &Path) -> UpdateResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::error!("could not remove {}: {e}", path.display());
            Err(UpdateError::fs(path, e))
        }
    }
}

/// Swap the staged bytes into place.
///
/// The bytes are copied to a temp file in the destination's own directory
/// and renamed over the target, so the destination is never observable
/// half-written. If the rename is refused (platform or filesystem
/// restriction) a plain overwrite copy is the fallback.
fn install_artifact(artifact: &StagedArtifact, dest: &Path) -> UpdateResult<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| {
        tracing::error!("could not create {}: {e}", parent.display());
        UpdateError::fs(&parent, e)
    })?;

    let mut source = artifact
        .reopen()
        .map_err(|e| UpdateError::fs(artifact.path(), e))?;

    let mut swap = NamedTempFile::new_in(&parent).map_err(|e| UpdateError::fs(&parent, e))?;
    copy_stream(&mut source, swap.as_file_mut(), dest)?;
    swap.as_file()
        .sync_all()
        .map_err(|e| UpdateError::fs(dest, e))?;

    if swap.persist(dest).is_err() {
        fs::copy(artifact.path(), dest).map_err(|e| {
            tracing::error!("could not install {}: {e}", dest.display());
            UpdateError::fs(dest, e)
        })?;
    }

    Ok(())
}

fn copy_stream(source: &mut impl Read, dest_file: &mut fs::File, dest: &Path) -> UpdateResult<()> {
    io::copy(source, dest_file).map_err(|e| {
        tracing::error!("could not write {}: {e}", dest.display());
        UpdateError::fs(dest, e)
    })?;
    Ok(())
}
