//! Error types for the update pipeline.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for update operations.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// Errors that can occur while performing an update.
///
/// The taxonomy follows the pipeline stages: a `Protocol` error aborts
/// before any network or disk activity, `Network` aborts the download
/// phase, `FileSystem` aborts the remainder of the apply phase, and
/// `Cancelled` is user-initiated and distinct from failure.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The update manifest could not be decoded.
    #[error("could not read update manifest: {0}")]
    Protocol(String),

    /// A download failed, or the server answered with a non-200 status.
    #[error("failed to download {url}: {reason}")]
    Network { url: String, reason: String },

    /// A filesystem operation failed.
    #[error("filesystem operation failed on {}: {source}", path.display())]
    FileSystem { path: PathBuf, source: io::Error },

    /// The user cancelled the update.
    #[error("update cancelled")]
    Cancelled,
}

impl UpdateError {
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        UpdateError::Protocol(reason.into())
    }

    pub(crate) fn network(url: impl ToString, reason: impl ToString) -> Self {
        UpdateError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        UpdateError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a filesystem error on a borrowed path.
    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        Self::filesystem(path.to_path_buf(), source)
    }

    /// Whether this error represents user cancellation rather than a failure.
    ///
    /// Cancellation suppresses the generic failure notice; everything else
    /// surfaces it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UpdateError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        let err = UpdateError::protocol("unexpected end of input");
        assert_eq!(
            err.to_string(),
            "could not read update manifest: unexpected end of input"
        );
    }

    #[test]
    fn test_network_display() {
        let err = UpdateError::network("http://host:80/download", "status 404");
        assert!(err.to_string().contains("http://host:80/download"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_filesystem_source_is_preserved() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = UpdateError::filesystem("/install/lib/a.jar", io_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/install/lib/a.jar"));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(UpdateError::Cancelled.is_cancelled());
        assert!(!UpdateError::protocol("x").is_cancelled());
    }
}
