//! HTTP artifact fetching.

use std::io::{Read, Write};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::cancel::CancelToken;
use crate::error::{UpdateError, UpdateResult};
use crate::manifest::ServerEndpoint;

use super::staging::StagedArtifact;

/// Chunk size for streaming response bodies to disk (64 KiB).
const CHUNK_SIZE: usize = 64 * 1024;

/// Blocking HTTP client for the update server's download endpoint.
///
/// One request per artifact: `GET /download?hash=<hash>`, expecting status
/// 200 with the artifact bytes as the body. Cancellation is polled before
/// the request, once the response arrives, and around each chunk write.
#[derive(Debug)]
pub struct ArtifactClient {
    client: Client,
    endpoint: ServerEndpoint,
}

impl ArtifactClient {
    /// Create a client for `endpoint` with the given request timeout.
    pub fn new(endpoint: ServerEndpoint, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { client, endpoint }
    }

    /// Fetch the artifact for `hash` into the staged file.
    ///
    /// Returns the number of bytes written. Fails with
    /// [`UpdateError::Network`] on connection errors, non-200 statuses, and
    /// mid-stream read errors, and with [`UpdateError::Cancelled`] as soon
    /// as cancellation is observed.
    pub fn fetch(
        &self,
        hash: &str,
        artifact: &mut StagedArtifact,
        token: &CancelToken,
    ) -> UpdateResult<u64> {
        let url = self.endpoint.download_endpoint();

        if token.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let mut response = self
            .client
            .get(&url)
            .query(&[("hash", hash)])
            .send()
            .map_err(|e| UpdateError::network(&url, e))?;

        if token.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpdateError::network(
                &url,
                format!("server answered with status {status}"),
            ));
        }

        let staged_path = artifact.path().to_path_buf();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut written = 0u64;

        loop {
            if token.is_cancelled() {
                return Err(UpdateError::Cancelled);
            }

            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| UpdateError::network(&url, format!("read error: {e}")))?;
            if bytes_read == 0 {
                break;
            }

            artifact
                .file_mut()
                .write_all(&buffer[..bytes_read])
                .map_err(|e| UpdateError::fs(&staged_path, e))?;
            written += bytes_read as u64;

            if token.is_cancelled() {
                return Err(UpdateError::Cancelled);
            }
        }

        Ok(written)
    }
}
