//! `StateValue` binary codec (§3.5, §4.3).

use crate::filekind::FileKind;
use crate::marshal::sid::{Sid, SID_LEN};

/// Per-filename record: its monitoring flag, most recent SID, rename
/// marker, and detected file kind (§3.5).
///
/// This crate always writes the full 7-byte layout (`sid(4) ‖
/// monitored(1) ‖ renamed(1) ‖ kind(1)`), but tolerates the two shorter
/// legacy layouts §3.5 allows — `renamed` and/or `file_kind` missing —
/// treating an absent field as `false` / [`FileKind::Binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateValue {
    /// Most recent SID this filename was saved into; `INVALID_SID` if
    /// never saved.
    pub sid: Sid,
    /// Whether this filename currently participates in future saves.
    pub monitored: bool,
    /// Whether this state entry was created by a rename (informational
    /// only — see §4.8, this crate has no separate rename record).
    pub renamed: bool,
    /// Last-detected file kind, for display/debugging only.
    pub file_kind: FileKind,
}

const MONITORED_BYTE: u8 = b'M';
const UNMONITORED_BYTE: u8 = b'U';
const RENAMED_BYTE: u8 = b'r';
const NOT_RENAMED_BYTE: u8 = b' ';

impl StateValue {
    /// Builds a fresh, unsaved state entry for a newly monitored filename.
    pub fn new_monitored(file_kind: FileKind) -> Self {
        StateValue {
            sid: Sid::default(),
            monitored: true,
            renamed: false,
            file_kind,
        }
    }

    /// Marshals this value as `sid(4) ‖ monitored(1) ‖ renamed(1) ‖
    /// kind(1)`.
    pub fn marshal(self) -> [u8; SID_LEN + 3] {
        let mut raw = [0u8; SID_LEN + 3];
        raw[..SID_LEN].copy_from_slice(&self.sid.marshal());
        raw[SID_LEN] = if self.monitored {
            MONITORED_BYTE
        } else {
            UNMONITORED_BYTE
        };
        raw[SID_LEN + 1] = if self.renamed {
            RENAMED_BYTE
        } else {
            NOT_RENAMED_BYTE
        };
        raw[SID_LEN + 2] = self.file_kind.as_byte();
        raw
    }

    /// Unmarshals a state value, tolerating the two shorter legacy layouts
    /// (§3.5).
    pub fn unmarshal(raw: &[u8]) -> Option<StateValue> {
        if raw.len() < SID_LEN + 1 {
            return None;
        }
        let sid = Sid::unmarshal(&raw[..SID_LEN]);
        let monitored = raw[SID_LEN] == MONITORED_BYTE;
        let renamed = raw.get(SID_LEN + 1).map(|&b| b == RENAMED_BYTE).unwrap_or(false);
        let file_kind = raw
            .get(SID_LEN + 2)
            .and_then(|&b| FileKind::from_byte(b))
            .unwrap_or(FileKind::Binary);
        Some(StateValue {
            sid,
            monitored,
            renamed,
            file_kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_full_layout() {
        let value = StateValue {
            sid: Sid::new(7),
            monitored: true,
            renamed: true,
            file_kind: FileKind::Text,
        };
        let raw = value.marshal();
        assert_eq!(StateValue::unmarshal(&raw), Some(value));
    }

    #[test]
    fn unmonitored_round_trips() {
        let value = StateValue {
            sid: Sid::new(3),
            monitored: false,
            renamed: false,
            file_kind: FileKind::Binary,
        };
        assert_eq!(StateValue::unmarshal(&value.marshal()), Some(value));
    }

    #[test]
    fn tolerates_legacy_short_layout_without_kind_or_renamed() {
        let sid = Sid::new(5);
        let mut raw = sid.marshal().to_vec();
        raw.push(MONITORED_BYTE);
        let decoded = StateValue::unmarshal(&raw).unwrap();
        assert_eq!(decoded.sid, sid);
        assert!(decoded.monitored);
        assert!(!decoded.renamed);
        assert_eq!(decoded.file_kind, FileKind::Binary);
    }

    #[test]
    fn too_short_is_none() {
        assert_eq!(StateValue::unmarshal(&[0, 0, 0]), None);
    }
}
