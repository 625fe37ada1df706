//! Disk persistence for index artifacts using bincode serialization.
//!
//! Each artifact type declares a 4-byte magic. Files are laid out as
//! `[bincode payload][magic][u32 CRC32 BE]`. Writes use atomic temp-file +
//! rename so a crash never leaves a half-written index behind.

use crate::error::IndexError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Size of the `[magic][crc]` footer in bytes.
const FOOTER_LEN: usize = 8;

/// A persistable index artifact.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Magic bytes identifying the artifact type.
    const MAGIC: &'static [u8; 4];

    /// Checks internal invariants after deserialization.
    fn validate(&self) -> Result<(), String>;
}

/// Save an artifact to `path` with a CRC32 footer, atomically.
pub fn save_snapshot<T: Snapshot>(value: &T, path: &Path) -> Result<(), IndexError> {
    let bytes = bincode::serialize(value).map_err(|e| IndexError::Encode(e.to_string()))?;
    let crc = crc32fast::hash(&bytes);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| IndexError::io(dir, e))?;
    }

    let mut output = Vec::with_capacity(bytes.len() + FOOTER_LEN);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(T::MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, &output).map_err(|e| IndexError::io(tmp_path, e))?;
    fs::rename(tmp_path, path).map_err(|e| IndexError::io(path, e))?;

    tracing::info!(
        "Saved snapshot {:?} ({} bytes, CRC32={:#010x})",
        path,
        bytes.len(),
        crc
    );
    Ok(())
}

/// Load an artifact from `path`, verifying magic, CRC32 and invariants.
pub fn load_snapshot<T: Snapshot>(path: &Path) -> Result<T, IndexError> {
    let raw = fs::read(path).map_err(|e| IndexError::io(path, e))?;

    if raw.len() < FOOTER_LEN {
        return Err(IndexError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("file is {} bytes, shorter than the footer", raw.len()),
        });
    }
    let (payload, footer) = raw.split_at(raw.len() - FOOTER_LEN);
    if &footer[..4] != T::MAGIC {
        return Err(IndexError::Corrupt {
            path: path.to_path_buf(),
            reason: format!(
                "unexpected magic {:?}, expected {:?}",
                String::from_utf8_lossy(&footer[..4]),
                String::from_utf8_lossy(T::MAGIC)
            ),
        });
    }
    let stored_crc = u32::from_be_bytes([footer[4], footer[5], footer[6], footer[7]]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(IndexError::Corrupt {
            path: path.to_path_buf(),
            reason: format!(
                "CRC32 mismatch: expected {:#010x}, got {:#010x}",
                stored_crc, computed_crc
            ),
        });
    }
    tracing::debug!("Snapshot CRC32 verified: {:#010x}", stored_crc);

    let value: T = bincode::deserialize(payload).map_err(|e| IndexError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    value
        .validate()
        .map_err(|reason| IndexError::Invalid(format!("{:?}: {}", path, reason)))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        ids: Vec<String>,
        weights: Vec<f32>,
    }

    impl Snapshot for Sample {
        const MAGIC: &'static [u8; 4] = b"TST1";

        fn validate(&self) -> Result<(), String> {
            if self.ids.len() != self.weights.len() {
                return Err("length mismatch".into());
            }
            Ok(())
        }
    }

    fn sample() -> Sample {
        Sample {
            ids: vec!["a".into(), "b".into()],
            weights: vec![0.5, 1.5],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.idx");
        save_snapshot(&sample(), &path).unwrap();
        let loaded: Sample = load_snapshot(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!dir.path().join("nested").join("sample.idx.tmp").exists());
    }

    #[test]
    fn test_flipped_byte_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.idx");
        save_snapshot(&sample(), &path).unwrap();
        let mut raw = fs::read(&path).unwrap();
        raw[0] ^= 0xFF;
        fs::write(&path, raw).unwrap();
        let err = load_snapshot::<Sample>(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt { .. }), "got {err:?}");
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.idx");
        fs::write(&path, b"abc").unwrap();
        let err = load_snapshot::<Sample>(&path).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt { .. }));
    }

    #[test]
    fn test_invalid_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.idx");
        let bad = Sample {
            ids: vec!["a".into()],
            weights: vec![],
        };
        save_snapshot(&bad, &path).unwrap();
        let err = load_snapshot::<Sample>(&path).unwrap_err();
        assert!(matches!(err, IndexError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot::<Sample>(&dir.path().join("nope.idx")).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
    }
}
