//! Scoped temporary storage for downloaded artifacts.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{UpdateError, UpdateResult};

/// A downloaded artifact staged in temporary storage.
///
/// The temp file is owned: dropping an unconsumed artifact deletes it, so
/// no staged file survives the run regardless of how it ended.
/// Staged files are named `<hash>_*` with the target's extension.
#[derive(Debug)]
pub struct StagedArtifact {
    target: PathBuf,
    file: NamedTempFile,
}

impl StagedArtifact {
    /// Allocate a fresh staging file for `target` in `staging_dir`.
    pub(crate) fn create(staging_dir: &Path, target: &Path, hash: &str) -> UpdateResult<Self> {
        let mut builder = tempfile::Builder::new();
        let prefix = format!("{hash}_");
        builder.prefix(&prefix);
        let suffix = target
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()));
        if let Some(ref suffix) = suffix {
            builder.suffix(suffix);
        }

        let file = builder
            .tempfile_in(staging_dir)
            .map_err(|e| UpdateError::fs(staging_dir, e))?;

        Ok(Self {
            target: target.to_path_buf(),
            file,
        })
    }

    /// Install-relative path this artifact replaces.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Location of the staged bytes.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub(crate) fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Reopen the staged file for reading.
    pub(crate) fn reopen(&self) -> io::Result<File> {
        self.file.reopen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_staged_file_is_named_after_hash_and_extension() {
        let staging = TempDir::new().unwrap();
        let artifact =
            StagedArtifact::create(staging.path(), Path::new("lib/a.jar"), "h1").unwrap();

        let name = artifact.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("h1_"));
        assert!(name.ends_with(".jar"));
        assert_eq!(artifact.target(), Path::new("lib/a.jar"));
    }

    #[test]
    fn test_target_without_extension() {
        let staging = TempDir::new().unwrap();
        let artifact = StagedArtifact::create(staging.path(), Path::new("old"), "h0").unwrap();
        let name = artifact.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("h0_"));
    }

    #[test]
    fn test_drop_removes_staged_file() {
        let staging = TempDir::new().unwrap();
        let mut artifact =
            StagedArtifact::create(staging.path(), Path::new("lib/a.jar"), "h1").unwrap();
        artifact.file_mut().write_all(b"bytes").unwrap();

        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_staging_dir_is_filesystem_error() {
        let staging = TempDir::new().unwrap();
        let missing = staging.path().join("nonexistent");
        let err = StagedArtifact::create(&missing, Path::new("a.jar"), "h1").unwrap_err();
        assert!(matches!(err, UpdateError::FileSystem { .. }));
    }
}
