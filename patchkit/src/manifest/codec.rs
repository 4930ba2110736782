//! Binary wire codec for the update manifest.
//!
//! The framing mirrors the launcher protocol: strings are a 16-bit
//! big-endian byte length followed by that many bytes of UTF-8, integers
//! are 32-bit big-endian. Field order is fixed: host, port, install root,
//! removal count + pairs, update count + pairs.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::error::{UpdateError, UpdateResult};

use super::paths;
use super::types::{Manifest, ServerEndpoint};

pub(crate) fn read_manifest<R: Read>(reader: &mut R) -> UpdateResult<Manifest> {
    let host = read_string(reader)?;
    let port = read_u32(reader)?;
    let port = u16::try_from(port)
        .map_err(|_| UpdateError::protocol(format!("server port {port} out of range")))?;
    let install_root = PathBuf::from(read_string(reader)?);
    let removals = read_entries(reader)?;
    let updates = read_entries(reader)?;

    Ok(Manifest {
        endpoint: ServerEndpoint { host, port },
        install_root,
        removals,
        updates,
    })
}

pub(crate) fn write_manifest<W: Write>(manifest: &Manifest, writer: &mut W) -> io::Result<()> {
    write_string(writer, &manifest.endpoint.host)?;
    write_u32(writer, u32::from(manifest.endpoint.port))?;
    write_string(writer, &manifest.install_root.to_string_lossy())?;
    write_entries(writer, &manifest.removals)?;
    write_entries(writer, &manifest.updates)?;
    Ok(())
}

/// Read a path/hash entry set: a 32-bit count followed by that many pairs
/// of length-prefixed strings. Paths must be install-relative; absolute or
/// parent-escaping paths fail the decode.
fn read_entries<R: Read>(reader: &mut R) -> UpdateResult<BTreeMap<PathBuf, String>> {
    let count = read_u32(reader)?;
    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let raw = read_string(reader)?;
        let path = paths::parse_relative(&raw)?;
        let hash = read_string(reader)?;
        entries.insert(path, hash);
    }
    Ok(entries)
}

fn write_entries<W: Write>(writer: &mut W, entries: &BTreeMap<PathBuf, String>) -> io::Result<()> {
    let count = u32::try_from(entries.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "entry set too large"))?;
    write_u32(writer, count)?;
    for (path, hash) in entries {
        write_string(writer, &path.to_string_lossy())?;
        write_string(writer, hash)?;
    }
    Ok(())
}

fn read_u16<R: Read>(reader: &mut R) -> UpdateResult<u16> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> UpdateResult<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_string<R: Read>(reader: &mut R) -> UpdateResult<String> {
    let len = usize::from(read_u16(reader)?);
    let mut buf = vec![0u8; len];
    read_exact(reader, &mut buf)?;
    String::from_utf8(buf).map_err(|e| UpdateError::protocol(format!("invalid UTF-8 string: {e}")))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> UpdateResult<()> {
    reader
        .read_exact(buf)
        .map_err(|e| UpdateError::protocol(format!("unexpected end of input: {e}")))
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long for wire"))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> Manifest {
        let mut removals = BTreeMap::new();
        removals.insert(PathBuf::from("old.dat"), "h0".to_string());
        let mut updates = BTreeMap::new();
        updates.insert(PathBuf::from("lib/a.jar"), "h1".to_string());
        updates.insert(PathBuf::from("config/game.cfg"), "h2".to_string());

        Manifest {
            endpoint: ServerEndpoint {
                host: "updates.example.net".to_string(),
                port: 8080,
            },
            install_root: PathBuf::from("/opt/game"),
            removals,
            updates,
        }
    }

    fn encode(manifest: &Manifest) -> Vec<u8> {
        let mut buf = Vec::new();
        manifest.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_manifest_round_trip() {
        let manifest = sample_manifest();
        let decoded = Manifest::read_from(encode(&manifest).as_slice()).unwrap();
        assert_eq!(decoded, manifest);
    }

    #[test]
    fn test_empty_sets_round_trip() {
        let manifest = Manifest {
            endpoint: ServerEndpoint {
                host: "localhost".to_string(),
                port: 80,
            },
            install_root: PathBuf::from("/opt/game"),
            removals: BTreeMap::new(),
            updates: BTreeMap::new(),
        };
        let decoded = Manifest::read_from(encode(&manifest).as_slice()).unwrap();
        assert_eq!(decoded, manifest);
    }

    #[test]
    fn test_truncated_input_is_protocol_error() {
        let manifest = sample_manifest();
        let bytes = encode(&manifest);
        let err = Manifest::read_from(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_empty_input_is_protocol_error() {
        let err = Manifest::read_from([].as_slice()).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_invalid_utf8_is_protocol_error() {
        // Host declared as two bytes of invalid UTF-8.
        let bytes = [0x00, 0x02, 0xff, 0xfe];
        let err = Manifest::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_port_out_of_range_is_protocol_error() {
        let mut bytes = Vec::new();
        write_string(&mut bytes, "localhost").unwrap();
        write_u32(&mut bytes, 70_000).unwrap();
        let err = Manifest::read_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_parent_escaping_path_is_rejected() {
        let mut manifest = sample_manifest();
        manifest
            .removals
            .insert(PathBuf::from("../outside.dat"), "h9".to_string());
        let err = Manifest::read_from(encode(&manifest).as_slice()).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_absolute_path_is_rejected() {
        let mut manifest = sample_manifest();
        manifest
            .updates
            .insert(PathBuf::from("/etc/passwd"), "h9".to_string());
        let err = Manifest::read_from(encode(&manifest).as_slice()).unwrap_err();
        assert!(matches!(err, UpdateError::Protocol(_)));
    }

    #[test]
    fn test_duplicate_path_keeps_last_hash() {
        let mut bytes = Vec::new();
        write_string(&mut bytes, "localhost").unwrap();
        write_u32(&mut bytes, 80).unwrap();
        write_string(&mut bytes, "/opt/game").unwrap();
        write_u32(&mut bytes, 0).unwrap();
        write_u32(&mut bytes, 2).unwrap();
        write_string(&mut bytes, "lib/a.jar").unwrap();
        write_string(&mut bytes, "first").unwrap();
        write_string(&mut bytes, "lib/a.jar").unwrap();
        write_string(&mut bytes, "second").unwrap();

        let manifest = Manifest::read_from(bytes.as_slice()).unwrap();
        assert_eq!(manifest.updates.len(), 1);
        assert_eq!(manifest.updates[&PathBuf::from("lib/a.jar")], "second");
    }
}
