//! Content hashing (§3.6, §4.1).
//!
//! A save's dedup check and extract fidelity both hinge on SHA-256: the
//! digest is stored alongside every [`SaveValue`](crate::marshal::SaveValue)
//! and compared against the previous save's digest to decide whether a
//! file's content actually changed.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
pub type Sha256Digest = [u8; 32];

/// Computes the SHA-256 digest of `raw`.
///
/// Unlike the two compressors, hashing has no "unavailable" outcome: the
/// digest must always succeed, with any I/O failure surfaced to the
/// caller before this function is ever reached (§4.1).
pub fn sha256(raw: &[u8]) -> Sha256Digest {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hasher.finalize().into()
}
