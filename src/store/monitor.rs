//! Monitoring registry (§4.4): which filenames participate in future
//! saves, which glob patterns are ignored, and enumeration of both.

use std::cell::RefCell;

use sled::transaction::{ConflictableTransactionResult, Transactional, TransactionalTree};

use crate::error::{Error, Result};
use crate::filekind::FileKind;
use crate::marshal::state::StateValue;
use crate::store::handle::Store;
use crate::store::schema::PROTECTED_IGNORE_PATTERN;

impl Store {
    /// Marks `filenames` as monitored, inserting a fresh
    /// `{sid=0, monitored=true, kind=Binary}` state for any name not
    /// already known, or flipping an existing entry's `monitored` flag
    /// back to `true` while preserving its `sid` and `file_kind`.
    ///
    /// Per §5, the whole batch commits as a single `states` transaction:
    /// either every filename's flag is updated or none are, so a crash
    /// mid-call can never leave some names monitored and others not.
    ///
    /// Per §4.4 this alone does not take a save; callers that want the
    /// "detect files missing on disk and demote them" behavior should
    /// follow up with a call to `save` — the façade's
    /// `monitor_with_comment` helper does both from the caller's point of
    /// view.
    pub fn set_monitored(&mut self, filenames: &[String]) -> Result<()> {
        let errors = RefCell::new(Vec::new());
        let result = self.states.transaction(|tx_states| {
            errors.borrow_mut().clear();
            for filename in filenames {
                if let Err(e) = upsert_monitored_flag_tx(tx_states, filename, true)? {
                    errors.borrow_mut().push(e);
                }
            }
            Ok(())
        });
        result.map_err(crate::store::map_transaction_error)?;
        Error::from_many(errors.into_inner()).map_or(Ok(()), Err)
    }

    /// Sets `monitored=false` for each known filename, preserving its
    /// `sid`. Unknown filenames are added to the ignore set instead,
    /// matching §4.4's `unmonitor` contract.
    ///
    /// Per §5, the whole batch commits as a single transaction spanning
    /// `states` and `ignore`.
    pub fn unmonitor(&mut self, filenames: &[String]) -> Result<()> {
        let errors = RefCell::new(Vec::new());
        let result = (&self.states, &self.ignore).transaction(|(tx_states, tx_ignore)| {
            errors.borrow_mut().clear();
            for filename in filenames {
                if let Err(e) = unmonitor_one_tx(tx_states, tx_ignore, filename)? {
                    errors.borrow_mut().push(e);
                }
            }
            Ok(())
        });
        result.map_err(crate::store::map_transaction_error)?;
        Error::from_many(errors.into_inner()).map_or(Ok(()), Err)
    }

    /// Inserts `patterns` into the ignore set unchanged (§4.4), as a
    /// single `ignore` transaction (§5).
    pub fn ignore(&mut self, patterns: &[String]) -> Result<()> {
        let result = self.ignore.transaction(|tx_ignore| {
            for pattern in patterns {
                tx_ignore.insert(pattern.as_bytes(), &[])?;
            }
            Ok(())
        });
        result.map_err(crate::store::map_transaction_error)
    }

    /// Removes `patterns` from the ignore set, except
    /// [`PROTECTED_IGNORE_PATTERN`], which is never removed (§4.4) — this
    /// guards a database against self-snapshotting.
    pub fn unignore(&mut self, patterns: &[String]) -> Result<()> {
        let mut errors = Vec::new();
        for pattern in patterns {
            if pattern == PROTECTED_IGNORE_PATTERN {
                continue;
            }
            if let Err(e) = self.ignore.remove(pattern.as_bytes()).map_err(Error::from) {
                errors.push(e);
            }
        }
        Error::from_many(errors).map_or(Ok(()), Err)
    }

    /// Every pattern currently in the ignore set, in key order (§4.4, §6.2).
    pub fn ignored_patterns(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in self.ignore.iter() {
            let (pattern, _) = entry?;
            out.push(String::from_utf8_lossy(&pattern).into_owned());
        }
        Ok(out)
    }

    /// `true` if `filename` matches any stored glob pattern (§4.4, §6.2).
    ///
    /// A malformed pattern (one that `glob::Pattern` rejects) is skipped
    /// rather than treated as a match-everything wildcard or a hard
    /// error — the pattern table is caller-supplied and a single bad
    /// entry shouldn't block every other pattern from being checked.
    /// Hidden-file/directory filtering is a caller convention, not part
    /// of this check (§6.2).
    pub fn is_ignored(&self, filename: &str) -> Result<bool> {
        for pattern in self.ignored_patterns()? {
            if let Ok(glob) = glob::Pattern::new(&pattern) {
                if glob.matches(filename) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// All known filenames and their decoded state, in key order (§4.4).
    pub fn states(&self) -> Result<Vec<(String, StateValue)>> {
        let mut out = Vec::new();
        for entry in self.states.iter() {
            let (filename, raw) = entry?;
            let filename = String::from_utf8_lossy(&filename).into_owned();
            let state = StateValue::unmarshal(&raw).ok_or_else(|| Error::CorruptEntry {
                filename: filename.clone(),
                reason: "state record too short to decode".to_string(),
            })?;
            out.push((filename, state));
        }
        Ok(out)
    }

    /// Subset of [`Store::states`] whose `monitored` flag is set.
    pub fn monitored(&self) -> Result<Vec<(String, StateValue)>> {
        Ok(self.states()?.into_iter().filter(|(_, s)| s.monitored).collect())
    }

    /// Subset of [`Store::states`] whose `monitored` flag is clear.
    pub fn unmonitored(&self) -> Result<Vec<(String, StateValue)>> {
        Ok(self.states()?.into_iter().filter(|(_, s)| !s.monitored).collect())
    }

    /// The decoded state for `filename`, or the zero `StateValue`
    /// (`sid=0, monitored=false, kind=Binary`) if it's unknown (§4.9).
    pub fn state_for_filename(&self, filename: &str) -> Result<StateValue> {
        match self.states.get(filename.as_bytes())? {
            Some(raw) => StateValue::unmarshal(&raw).ok_or_else(|| Error::CorruptEntry {
                filename: filename.to_string(),
                reason: "state record too short to decode".to_string(),
            }),
            None => Ok(StateValue {
                sid: Default::default(),
                monitored: false,
                renamed: false,
                file_kind: FileKind::Binary,
            }),
        }
    }
}

/// Applies `set_monitored`'s per-filename logic inside an open `states`
/// transaction. The outer `Result` is sled's (propagated with `?`); the
/// inner `Result` is this crate's, accumulated by the caller into an
/// `Error::Many` rather than aborting the transaction.
fn upsert_monitored_flag_tx(
    tx_states: &TransactionalTree,
    filename: &str,
    monitored: bool,
) -> ConflictableTransactionResult<Result<()>, ()> {
    let next = match tx_states.get(filename.as_bytes())? {
        Some(raw) => match StateValue::unmarshal(&raw) {
            Some(mut state) => {
                state.monitored = monitored;
                state
            }
            None => {
                return Ok(Err(Error::CorruptEntry {
                    filename: filename.to_string(),
                    reason: "state record too short to decode".to_string(),
                }));
            }
        },
        None => StateValue::new_monitored(FileKind::Binary),
    };
    tx_states.insert(filename.as_bytes(), &next.marshal()[..])?;
    Ok(Ok(()))
}

/// Applies `unmonitor`'s per-filename logic inside an open `states` +
/// `ignore` transaction. Same nested-`Result` convention as
/// [`upsert_monitored_flag_tx`].
fn unmonitor_one_tx(
    tx_states: &TransactionalTree,
    tx_ignore: &TransactionalTree,
    filename: &str,
) -> ConflictableTransactionResult<Result<()>, ()> {
    match tx_states.get(filename.as_bytes())? {
        Some(raw) => match StateValue::unmarshal(&raw) {
            Some(mut state) => {
                state.monitored = false;
                tx_states.insert(filename.as_bytes(), &state.marshal()[..])?;
                Ok(Ok(()))
            }
            None => Ok(Err(Error::CorruptEntry {
                filename: filename.to_string(),
                reason: "state record too short to decode".to_string(),
            })),
        },
        None => {
            tx_ignore.insert(filename.as_bytes(), &[])?;
            Ok(Ok(()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("t.fhd")).unwrap();
        (dir, store)
    }

    #[test]
    fn set_monitored_inserts_fresh_state() {
        let (_dir, mut store) = open_store();
        store.set_monitored(&["a.txt".to_string()]).unwrap();
        let state = store.state_for_filename("a.txt").unwrap();
        assert!(state.monitored);
        assert!(!state.sid.is_valid());
    }

    #[test]
    fn unmonitor_preserves_sid() {
        let (_dir, mut store) = open_store();
        store.set_monitored(&["a.txt".to_string()]).unwrap();
        let mut state = store.state_for_filename("a.txt").unwrap();
        state.sid = crate::marshal::sid::Sid::new(5);
        store.states.insert("a.txt", &state.marshal()[..]).unwrap();
        store.unmonitor(&["a.txt".to_string()]).unwrap();
        let after = store.state_for_filename("a.txt").unwrap();
        assert!(!after.monitored);
        assert_eq!(after.sid, crate::marshal::sid::Sid::new(5));
    }

    #[test]
    fn unmonitor_unknown_file_adds_to_ignore() {
        let (_dir, mut store) = open_store();
        store.unmonitor(&["never-known.txt".to_string()]).unwrap();
        assert!(store.ignore.contains_key("never-known.txt").unwrap());
    }

    #[test]
    fn set_monitored_batch_is_all_or_nothing_on_one_transaction() {
        let (_dir, mut store) = open_store();
        store
            .set_monitored(&["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()])
            .unwrap();
        let monitored: Vec<_> = store.monitored().unwrap().into_iter().map(|(f, _)| f).collect();
        assert_eq!(monitored.len(), 3);
    }

    #[test]
    fn ignored_patterns_lists_custom_and_default_entries() {
        let (_dir, mut store) = open_store();
        store.ignore(&["*.log".to_string()]).unwrap();
        let patterns = store.ignored_patterns().unwrap();
        assert!(patterns.iter().any(|p| p == "*.log"));
        assert!(patterns.iter().any(|p| p == PROTECTED_IGNORE_PATTERN));
    }

    #[test]
    fn is_ignored_matches_default_patterns() {
        let (_dir, store) = open_store();
        assert!(store.is_ignored("thing.tmp").unwrap());
        assert!(store.is_ignored("history.fhd").unwrap());
        assert!(!store.is_ignored("notes.txt").unwrap());
    }

    #[test]
    fn is_ignored_matches_custom_pattern() {
        let (_dir, mut store) = open_store();
        store.ignore(&["*.log".to_string()]).unwrap();
        assert!(store.is_ignored("build.log").unwrap());
        assert!(!store.is_ignored("build.txt").unwrap());
    }

    #[test]
    fn unignore_never_removes_protected_pattern() {
        let (_dir, mut store) = open_store();
        store.unignore(&[PROTECTED_IGNORE_PATTERN.to_string()]).unwrap();
        assert!(store.ignore.contains_key(PROTECTED_IGNORE_PATTERN).unwrap());
    }

    #[test]
    fn monitored_and_unmonitored_partition_states() {
        let (_dir, mut store) = open_store();
        store.set_monitored(&["a.txt".to_string(), "b.txt".to_string()]).unwrap();
        store.unmonitor(&["b.txt".to_string()]).unwrap();
        let monitored: Vec<_> = store.monitored().unwrap().into_iter().map(|(f, _)| f).collect();
        let unmonitored: Vec<_> = store.unmonitored().unwrap().into_iter().map(|(f, _)| f).collect();
        assert_eq!(monitored, vec!["a.txt".to_string()]);
        assert_eq!(unmonitored, vec!["b.txt".to_string()]);
    }
}
