//! Typed update manifest model.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::UpdateResult;

use super::codec;

/// Server the update artifacts are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    /// URL of the artifact download endpoint (without the hash query).
    pub fn download_endpoint(&self) -> String {
        format!("http://{}:{}/download", self.host, self.port)
    }
}

/// A decoded update manifest.
///
/// `removals` and `updates` map install-relative paths to content hashes.
/// For removals the hash only identifies the file; for updates it is the
/// server-side lookup key for the artifact to fetch. Iteration order of
/// both sets is the maps' sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub endpoint: ServerEndpoint,
    pub install_root: PathBuf,
    pub removals: BTreeMap<PathBuf, String>,
    pub updates: BTreeMap<PathBuf, String>,
}

impl Manifest {
    /// Decode a manifest from its binary wire form.
    ///
    /// The stream is consumed in one pass; any decode error fails the whole
    /// read with [`crate::UpdateError::Protocol`] and no partial manifest
    /// is produced.
    pub fn read_from<R: Read>(mut reader: R) -> UpdateResult<Self> {
        codec::read_manifest(&mut reader)
    }

    /// Encode the manifest into its binary wire form.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        codec::write_manifest(self, &mut writer)
    }
}
