//! `SaveValue` binary codec (§3.6, §4.3) — one saved file entry.

use crate::codec::{CompressionTag, Sha256Digest};
use crate::error::{Error, Result};

const SHA256_LEN: usize = 32;

/// A single file's stored representation within one save: its content
/// hash, the encoding the blob is stored in, and the blob itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveValue {
    /// SHA-256 of the file's raw (uncompressed) content.
    pub sha256: Sha256Digest,
    /// Which of `{raw, deflate, lzw}` `blob` is encoded as.
    pub compression: CompressionTag,
    /// The stored bytes, compressed or raw per `compression`.
    pub blob: Vec<u8>,
}

impl SaveValue {
    /// Marshals as `sha256(32) ‖ compression(1) ‖ blob(rest)`.
    pub fn marshal(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(SHA256_LEN + 1 + self.blob.len());
        raw.extend_from_slice(&self.sha256);
        raw.push(self.compression.as_byte());
        raw.extend_from_slice(&self.blob);
        raw
    }

    /// Unmarshals a value written by [`SaveValue::marshal`].
    ///
    /// Fails with [`Error::CorruptEntry`] if `raw` is too short to contain
    /// a hash and a tag, or if the tag byte isn't one of `{U,F,L}`.
    pub fn unmarshal(filename: &str, raw: &[u8]) -> Result<SaveValue> {
        if raw.len() < SHA256_LEN + 1 {
            return Err(Error::CorruptEntry {
                filename: filename.to_string(),
                reason: format!(
                    "entry is only {} bytes, need at least {}",
                    raw.len(),
                    SHA256_LEN + 1
                ),
            });
        }
        let mut sha256 = [0u8; SHA256_LEN];
        sha256.copy_from_slice(&raw[..SHA256_LEN]);
        let compression = CompressionTag::from_byte(raw[SHA256_LEN]).ok_or_else(|| {
            Error::CorruptEntry {
                filename: filename.to_string(),
                reason: format!("unrecognized compression tag {:#04x}", raw[SHA256_LEN]),
            }
        })?;
        let blob = raw[SHA256_LEN + 1..].to_vec();
        Ok(SaveValue {
            sha256,
            compression,
            blob,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let value = SaveValue {
            sha256: [7u8; 32],
            compression: CompressionTag::Deflate,
            blob: vec![1, 2, 3, 4],
        };
        let raw = value.marshal();
        assert_eq!(SaveValue::unmarshal("f.txt", &raw).unwrap(), value);
    }

    #[test]
    fn empty_blob_round_trips() {
        let value = SaveValue {
            sha256: [0u8; 32],
            compression: CompressionTag::Uncompressed,
            blob: Vec::new(),
        };
        let raw = value.marshal();
        assert_eq!(SaveValue::unmarshal("f.txt", &raw).unwrap(), value);
    }

    #[test]
    fn too_short_is_corrupt() {
        let err = SaveValue::unmarshal("f.txt", &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { .. }));
    }

    #[test]
    fn bad_tag_is_corrupt() {
        let mut raw = vec![0u8; 32];
        raw.push(b'X');
        let err = SaveValue::unmarshal("f.txt", &raw).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { .. }));
    }
}
