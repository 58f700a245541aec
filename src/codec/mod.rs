//! Compression codec infrastructure for the file-history store.
//!
//! Each save stores at most one of three encodings of a file's bytes: raw,
//! DEFLATE, or LZW-MSB (§3.3, §4.1). This module provides the hashing, the
//! two compressors, and the selector that picks between them.

pub mod deflate;
pub mod hash;
pub mod lzw;
pub mod select;

pub use hash::Sha256Digest;
pub use select::CompressionTag;

use crate::Result;

/// The three candidate encodings computed for one file's raw bytes, plus
/// its content hash.
///
/// Produced by [`encode_candidates`]; consumed by [`select::choose`] to
/// decide which blob actually gets written to a save.
pub struct Candidates {
    /// SHA-256 of the raw (uncompressed) bytes.
    pub sha256: Sha256Digest,
    /// DEFLATE-compressed bytes, or `None` if compression failed.
    pub deflate: Option<Vec<u8>>,
    /// LZW-MSB-compressed bytes, or `None` if compression failed.
    pub lzw: Option<Vec<u8>>,
}

/// Computes the SHA-256 hash and both compressed candidates for `raw`.
///
/// Per §4.1 and §5, the three computations are independent and run as
/// cooperative sub-tasks with a join barrier when the `parallel` feature is
/// enabled (backed by `rayon::join`); otherwise they run sequentially,
/// which is functionally equivalent and differs only in throughput. SHA-256
/// always succeeds; a compressor that fails yields `None`, which the
/// selector treats as "unavailable", never as a hard error.
pub fn encode_candidates(raw: &[u8]) -> Result<Candidates> {
    #[cfg(feature = "parallel")]
    {
        let ((sha256, deflate), lzw) = rayon::join(
            || rayon::join(|| hash::sha256(raw), || deflate::compress(raw)),
            || lzw::compress(raw),
        );
        Ok(Candidates {
            sha256,
            deflate,
            lzw,
        })
    }
    #[cfg(not(feature = "parallel"))]
    {
        Ok(Candidates {
            sha256: hash::sha256(raw),
            deflate: deflate::compress(raw),
            lzw: lzw::compress(raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_always_produce_a_hash() {
        let candidates = encode_candidates(b"hello, world").unwrap();
        assert_eq!(candidates.sha256, hash::sha256(b"hello, world"));
    }
}
