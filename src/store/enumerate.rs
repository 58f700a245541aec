//! Enumeration (§4.9): listing saves, finding which saves mention a given
//! filename, and summarizing one save's metadata.

use std::collections::BTreeSet;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::marshal::sid::Sid;
use crate::store::handle::Store;
use crate::store::schema;
use crate::timestamp;

/// One save's identity, timestamp, and comment (§3.7).
#[derive(Debug, Clone)]
pub struct SaveInfo {
    /// The save's identity.
    pub sid: Sid,
    /// When the save was taken.
    pub when: SystemTime,
    /// The caller-supplied comment; empty for an empty save that has no
    /// metadata written (§4.6 step 6).
    pub comment: String,
}

impl Store {
    /// Every allocated SID, most recent first (§4.9).
    pub fn sids(&self) -> Result<Vec<Sid>> {
        let mut seen = BTreeSet::new();
        for entry in self.saves.iter() {
            let (key, _) = entry?;
            if let Some((sid, _)) = schema::split_save_key(&key) {
                seen.insert(sid);
            }
        }
        Ok(seen.into_iter().rev().collect())
    }

    /// Subset of [`Store::sids`] whose save actually records an entry for
    /// `filename` (i.e. its content changed in that save).
    pub fn sids_for_filename(&self, filename: &str) -> Result<Vec<Sid>> {
        Ok(self
            .sids()?
            .into_iter()
            .filter(|sid| {
                self.saves
                    .contains_key(schema::save_key(*sid, filename))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Number of file entries in the most recent save (excluding the
    /// `*when`/`*comment`/`*exists` metadata keys), or `0` if no save has
    /// ever been taken.
    pub fn save_count(&self) -> Result<usize> {
        match self.sids()?.first() {
            Some(sid) => self.entry_count(*sid),
            None => Ok(0),
        }
    }

    /// Number of file entries in save `sid`.
    pub fn entry_count(&self, sid: Sid) -> Result<usize> {
        let mut count = 0;
        for entry in self.saves.scan_prefix(schema::save_prefix(sid)) {
            let (key, _) = entry?;
            if let Some((_, suffix)) = schema::split_save_key(&key) {
                if !schema::is_meta_suffix(suffix) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// The timestamp and comment recorded for `sid`.
    ///
    /// An empty save (§4.6 step 6) has no `*when`/`*comment` keys; this
    /// returns [`Error::NotFoundInSave`] naming `"*when"` in that case
    /// rather than fabricating a timestamp.
    pub fn save_info_for_sid(&self, sid: Sid) -> Result<SaveInfo> {
        let when_raw = self
            .saves
            .get(schema::meta_key(sid, schema::META_WHEN))?
            .ok_or_else(|| Error::NotFoundInSave {
                sid: sid.value(),
                filename: "*when".to_string(),
            })?;
        let when = timestamp::unmarshal(&when_raw)?;
        let comment = self
            .saves
            .get(schema::meta_key(sid, schema::META_COMMENT))?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
            .unwrap_or_default();
        Ok(SaveInfo { sid, when, comment })
    }
}
