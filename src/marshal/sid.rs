//! Save-ID binary codec (§3.1, §4.3).

use std::fmt;

/// Wire width of a marshaled [`Sid`].
pub const SID_LEN: usize = 4;

/// A save identifier: a monotonically increasing, big-endian `u32` on
/// disk. `0` is the reserved invalid/sentinel value (§3.1); valid SIDs
/// start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sid(u32);

/// The reserved sentinel meaning "no save" / "never saved".
pub const INVALID_SID: Sid = Sid(0);

impl Sid {
    /// Wraps a raw `u32` value as a `Sid`.
    pub fn new(value: u32) -> Self {
        Sid(value)
    }

    /// `true` unless this is [`INVALID_SID`].
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The underlying `u32` value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Marshals this SID as 4 big-endian bytes.
    pub fn marshal(self) -> [u8; SID_LEN] {
        self.0.to_be_bytes()
    }

    /// Unmarshals a SID from 4 big-endian bytes. Returns [`INVALID_SID`] if
    /// `raw` isn't exactly 4 bytes rather than panicking on a malformed
    /// record.
    pub fn unmarshal(raw: &[u8]) -> Sid {
        match <[u8; SID_LEN]>::try_from(raw) {
            Ok(bytes) => Sid(u32::from_be_bytes(bytes)),
            Err(_) => INVALID_SID,
        }
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Sid {
    fn from(value: u32) -> Self {
        Sid(value)
    }
}
