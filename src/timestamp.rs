//! Canonical save timestamp encoding (§3.7).
//!
//! Every save's `*when` metadata key is a length-prefixed binary timestamp.
//! Format version 1 (§9) fixes that length at 15 bytes: a 1-byte encoding
//! version, 8 bytes of signed seconds since the Unix epoch (UTC), 4 bytes
//! of nanoseconds within that second, and a 2-byte UTC offset in minutes
//! (always `0` for this crate, which always stores UTC — the field exists
//! so a future version could store local time without changing the
//! layout).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Encoding version stamped into every encoded timestamp's first byte.
const TIMESTAMP_VERSION: u8 = 1;

/// Fixed wire length of an encoded timestamp.
pub const TIMESTAMP_LEN: usize = 15;

/// Encodes `when` into the crate's canonical 15-byte timestamp layout.
pub fn encode(when: SystemTime) -> [u8; TIMESTAMP_LEN] {
    let (secs, nanos) = match when.duration_since(UNIX_EPOCH) {
        Ok(duration) => (duration.as_secs() as i64, duration.subsec_nanos()),
        Err(before_epoch) => {
            let duration = before_epoch.duration();
            (-(duration.as_secs() as i64) - 1, 1_000_000_000 - duration.subsec_nanos())
        }
    };

    let mut raw = [0u8; TIMESTAMP_LEN];
    raw[0] = TIMESTAMP_VERSION;
    raw[1..9].copy_from_slice(&secs.to_be_bytes());
    raw[9..13].copy_from_slice(&nanos.to_be_bytes());
    raw[13..15].copy_from_slice(&0i16.to_be_bytes()); // UTC offset, minutes
    raw
}

/// Decodes a timestamp produced by [`encode`].
pub fn decode(raw: &[u8]) -> Result<SystemTime> {
    if raw.len() != TIMESTAMP_LEN {
        return Err(Error::CorruptEntry {
            filename: "*when".to_string(),
            reason: format!("expected a {TIMESTAMP_LEN}-byte timestamp, got {}", raw.len()),
        });
    }
    if raw[0] != TIMESTAMP_VERSION {
        return Err(Error::CorruptEntry {
            filename: "*when".to_string(),
            reason: format!("unknown timestamp encoding version {}", raw[0]),
        });
    }

    let secs = i64::from_be_bytes(raw[1..9].try_into().unwrap());
    let nanos = u32::from_be_bytes(raw[9..13].try_into().unwrap());

    if secs >= 0 {
        Ok(UNIX_EPOCH + std::time::Duration::new(secs as u64, nanos))
    } else {
        let before = std::time::Duration::new((-secs - 1) as u64, 1_000_000_000 - nanos);
        Ok(UNIX_EPOCH - before)
    }
}

/// Writes the `*when` value: a 1-byte length prefix followed by the
/// encoded timestamp (§3.7, §4.3).
pub fn marshal(when: SystemTime) -> Vec<u8> {
    let encoded = encode(when);
    let mut raw = Vec::with_capacity(1 + TIMESTAMP_LEN);
    raw.push(encoded.len() as u8);
    raw.extend_from_slice(&encoded);
    raw
}

/// Reads a length-prefixed `*when` value written by [`marshal`].
pub fn unmarshal(raw: &[u8]) -> Result<SystemTime> {
    let len = *raw.first().ok_or_else(|| Error::CorruptEntry {
        filename: "*when".to_string(),
        reason: "empty timestamp field".to_string(),
    })? as usize;
    let body = raw.get(1..1 + len).ok_or_else(|| Error::CorruptEntry {
        filename: "*when".to_string(),
        reason: format!("declared length {len} overruns buffer"),
    })?;
    decode(body)
}
