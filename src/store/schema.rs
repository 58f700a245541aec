//! Keyspace schema constants (§3.4): tree names, composite-key layout for
//! the per-save sub-buckets, and the default ignore-pattern table (§6.2).
//!
//! The original `fhd` schema nests a sub-bucket per save inside `/saves`
//! (bbolt supports arbitrarily nested buckets). `sled::Tree` does not, so
//! this crate folds that nesting into the `saves` tree via composite keys:
//! `sid(4 BE) ‖ 0x00 ‖ suffix`, where `suffix` is either a filename or one
//! of the two metadata markers below (§11.4 of the expanded spec).

use crate::marshal::sid::{SID_LEN, Sid};

/// Tree holding `format` and the save-ID sequence counter.
pub const TREE_CONFIG: &str = "config";
/// Tree holding ignore patterns (empty values); keys are glob patterns.
pub const TREE_IGNORE: &str = "config/ignore";
/// Tree holding one `StateValue` per monitored/unmonitored filename.
pub const TREE_STATES: &str = "states";
/// Tree holding per-save entries and metadata, keyed compositely (see
/// [`save_key`] / [`meta_key`]).
pub const TREE_SAVES: &str = "saves";

/// Key inside [`TREE_CONFIG`] holding the single file-format version byte.
pub const CONFIG_FORMAT: &[u8] = b"format";
/// Key inside [`TREE_CONFIG`] holding the big-endian `u32` "next SID"
/// counter, seeded to 0 so the first allocation yields 1 (§3.4, §4.5).
pub const CONFIG_NEXT_SID: &[u8] = b"next_sid";

/// File-format version this crate reads and writes (§6.3). The
/// length-prefixed `*when` encoding (§9) is format version 1.
pub const FILE_FORMAT_VERSION: u8 = 1;

/// Metadata suffix recording a save's timestamp. Any key starting with `*`
/// is metadata and never a filename (§3.7).
pub const META_WHEN: &[u8] = b"*when";
/// Metadata suffix recording a save's comment.
pub const META_COMMENT: &[u8] = b"*comment";
/// Sentinel suffix written unconditionally for every allocated SID, even
/// an otherwise-empty save (§4.6 step 6, §3.8: "a save bucket is created
/// even when zero files ultimately changed"). bbolt's bucket tree keeps
/// such empty buckets around structurally; sled's flat trees need an
/// explicit marker key to the same effect so `sids()` sees a dense
/// sequence with no gaps.
pub const META_EXISTS: &[u8] = b"*exists";

/// Separator between the SID prefix and the suffix in a composite
/// `saves`-tree key. `0x00` can't appear in a normalized filename or in
/// `*when`/`*comment`, so this never collides.
const KEY_SEP: u8 = 0;

/// Builds the composite `saves`-tree key for one file's entry within save
/// `sid`.
pub fn save_key(sid: Sid, filename: &str) -> Vec<u8> {
    composite_key(sid, filename.as_bytes())
}

/// Builds the composite `saves`-tree key for a save's `*when` or
/// `*comment` metadata.
pub fn meta_key(sid: Sid, suffix: &[u8]) -> Vec<u8> {
    composite_key(sid, suffix)
}

fn composite_key(sid: Sid, suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(SID_LEN + 1 + suffix.len());
    key.extend_from_slice(&sid.marshal());
    key.push(KEY_SEP);
    key.extend_from_slice(suffix);
    key
}

/// Lower bound of the key range occupied by save `sid`'s entries, for use
/// with [`sled::Tree::scan_prefix`].
pub fn save_prefix(sid: Sid) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(SID_LEN + 1);
    prefix.extend_from_slice(&sid.marshal());
    prefix.push(KEY_SEP);
    prefix
}

/// Splits a `saves`-tree key back into its SID and suffix. Returns `None`
/// if `key` is too short to contain the fixed SID prefix and separator —
/// this should never happen for keys this crate itself wrote.
pub fn split_save_key(key: &[u8]) -> Option<(Sid, &[u8])> {
    if key.len() < SID_LEN + 1 {
        return None;
    }
    let sid = Sid::unmarshal(&key[..SID_LEN]);
    Some((sid, &key[SID_LEN + 1..]))
}

/// `true` if a `saves`-tree key suffix is a metadata marker rather than a
/// filename (§3.7: "Any key starting with `*` is metadata").
pub fn is_meta_suffix(suffix: &[u8]) -> bool {
    suffix.first() == Some(&b'*')
}

/// Default ignore patterns seeded into [`TREE_IGNORE`] on first open (§6.2).
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*#[0-9].*",
    "*.a",
    "*.bak",
    "*.class",
    "*.dll",
    "*.exe",
    "*.fhd",
    "*.jar",
    "*.ld",
    "*.ldx",
    "*.li",
    "*.lix",
    "*.o",
    "*.obj",
    "*.py[co]",
    "*.rs.bk",
    "*.so",
    "*.sw[nop]",
    "*.swp",
    "*.tmp",
    "*~",
    "gpl-[0-9].[0-9].txt",
    "louti[0-9]*",
    "moc_*.cpp",
    "qrc_*.cpp",
    "ui_*.h",
];

/// Pattern that must never be removed from the ignore set (§4.4): it
/// guards against a database snapshotting itself.
pub const PROTECTED_IGNORE_PATTERN: &str = "*.fhd";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_key_roundtrips_through_split() {
        let key = save_key(Sid::new(7), "battery.png");
        let (sid, suffix) = split_save_key(&key).unwrap();
        assert_eq!(sid, Sid::new(7));
        assert_eq!(suffix, b"battery.png");
        assert!(!is_meta_suffix(suffix));
    }

    #[test]
    fn meta_keys_are_recognized() {
        let key = meta_key(Sid::new(3), META_WHEN);
        let (sid, suffix) = split_save_key(&key).unwrap();
        assert_eq!(sid, Sid::new(3));
        assert!(is_meta_suffix(suffix));
    }

    #[test]
    fn protected_pattern_is_in_defaults() {
        assert!(DEFAULT_IGNORE_PATTERNS.contains(&PROTECTED_IGNORE_PATTERN));
    }

    #[test]
    fn save_prefix_bounds_only_that_sids_keys() {
        let prefix_a = save_prefix(Sid::new(1));
        let key_a = save_key(Sid::new(1), "x");
        let key_b = save_key(Sid::new(2), "x");
        assert!(key_a.starts_with(&prefix_a[..]));
        assert!(!key_b.starts_with(&prefix_a[..]));
    }
}
