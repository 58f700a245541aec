//! Rename as a derived operation (§4.8): no separate rename record, just
//! `unmonitor(old)` followed by a monitor-with-comment of `new`. The
//! content relation is recoverable afterwards by matching SHA-256 between
//! `old`'s last save and `new`'s first save.

use crate::error::{Error, Result};
use crate::store::handle::Store;
use crate::store::save::SaveResult;

impl Store {
    /// Unmonitors `old` and monitors `new` with a comment recording the
    /// rename, in one logical step. Both operations' errors are joined
    /// per §7's accumulation policy; this crate has no separate rename
    /// record (§4.8, §9) — `new`'s state entry is simply marked
    /// `renamed=true`.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<SaveResult> {
        let mut errors = Vec::new();

        if let Err(e) = self.unmonitor(&[old.to_string()]) {
            errors.push(e);
        }

        let comment = format!("renamed {old:?} \u{2192} {new:?}");
        match self.monitor_with_comment(&comment, &[new.to_string()]) {
            Ok(result) => {
                if let Err(e) = self.mark_renamed(new) {
                    errors.push(e);
                }
                if let Some(err) = Error::from_many(errors) {
                    return Err(err);
                }
                Ok(result)
            }
            Err(e) => {
                errors.push(e);
                Err(Error::from_many(errors).expect("at least one error pushed"))
            }
        }
    }

    fn mark_renamed(&mut self, filename: &str) -> Result<()> {
        let mut state = self.state_for_filename(filename)?;
        state.renamed = true;
        self.states.insert(filename.as_bytes(), &state.marshal()[..])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rename_unmonitors_old_and_monitors_new_with_same_content() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path().join("t.fhd")).unwrap();
        let content = b"computer.bmp contents, long enough to matter for dedup checks";
        fs::write(dir.path().join("computer.bmp"), content).unwrap();
        store
            .monitor_with_comment("started", &["computer.bmp".to_string()])
            .unwrap();

        fs::rename(
            dir.path().join("computer.bmp"),
            dir.path().join("pc.bmp"),
        )
        .unwrap();
        let result = store.rename("computer.bmp", "pc.bmp").unwrap();
        assert!(result.sid.is_valid());
        assert_eq!(result.comment, "renamed \"computer.bmp\" \u{2192} \"pc.bmp\"");

        let old_state = store.state_for_filename("computer.bmp").unwrap();
        assert!(!old_state.monitored);
        let new_state = store.state_for_filename("pc.bmp").unwrap();
        assert!(new_state.monitored);
        assert!(new_state.renamed);

        let mut old_bytes = Vec::new();
        store.extract("pc.bmp", &mut old_bytes).unwrap();
        assert_eq!(old_bytes, content);
    }
}
