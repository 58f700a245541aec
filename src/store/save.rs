//! Save engine (§4.5, §4.6): allocates a new SID, encodes and dedups every
//! monitored file's content, and commits the whole thing as one
//! transaction.

use std::io;
use std::time::SystemTime;

use sled::transaction::Transactional;

use crate::codec::{self, select::CompressionTag};
use crate::error::{Error, Result};
use crate::filekind;
use crate::marshal::save_value::SaveValue;
use crate::marshal::sid::{INVALID_SID, Sid};
use crate::marshal::state::StateValue;
use crate::store::handle::Store;
use crate::store::schema;
use crate::timestamp;

/// The outcome of a single [`Store::save`] call.
#[derive(Debug, Clone)]
pub struct SaveResult {
    /// The new save's identity, or [`INVALID_SID`] if nothing changed
    /// (§4.6 step 6, the canonical empty-save policy).
    pub sid: Sid,
    /// When the save was taken. Meaningless if `sid` is invalid.
    pub when: SystemTime,
    /// The comment passed to `save`/`monitor_with_comment`.
    pub comment: String,
    /// Monitored filenames that were missing from disk at save time; each
    /// has been demoted to `monitored=false` (§4.6 step 4).
    pub missing_files: Vec<String>,
}

/// One file whose content changed and needs an entry in the new save.
struct PreparedChange {
    filename: String,
    save_value: SaveValue,
    state: StateValue,
}

impl Store {
    /// Marks `filenames` as monitored (preserving `sid`/`kind` for
    /// already-known names) and immediately takes a save with `comment`
    /// (§4.4: monitor is always followed by an implicit save).
    pub fn monitor_with_comment(&mut self, comment: &str, filenames: &[String]) -> Result<SaveResult> {
        self.set_monitored(filenames)?;
        self.save(comment)
    }

    /// Shorthand for [`Store::monitor_with_comment`] with an empty
    /// comment.
    pub fn monitor(&mut self, filenames: &[String]) -> Result<SaveResult> {
        self.monitor_with_comment("", filenames)
    }

    /// Takes a new save: every monitored file is read from disk, encoded,
    /// and deduplicated against its previous save; the whole outcome
    /// commits as a single transaction (§4.6).
    pub fn save(&mut self, comment: &str) -> Result<SaveResult> {
        self.save_at(comment, SystemTime::now())
    }

    pub(crate) fn save_at(&mut self, comment: &str, when: SystemTime) -> Result<SaveResult> {
        let monitored = self.monitored()?;

        let mut errors = Vec::new();
        let mut missing_files = Vec::new();
        let mut demotions = Vec::new();
        let mut changes: Vec<PreparedChange> = Vec::new();

        for (filename, state) in &monitored {
            let path = self.db_dir.join(filename);
            let raw = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::warn!("monitored file {filename:?} is missing on disk; demoting");
                    missing_files.push(filename.clone());
                    demotions.push(filename.clone());
                    continue;
                }
                Err(e) => {
                    errors.push(Error::io(path, e));
                    continue;
                }
            };

            let candidates = match codec::encode_candidates(&raw) {
                Ok(c) => c,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            if state.sid.is_valid() && self.same_as_prev(state.sid, filename, &candidates.sha256)? {
                log::debug!("{filename:?} unchanged since save #{}", state.sid);
                continue;
            }

            let flate_size = candidates.deflate.as_ref().map_or(0, Vec::len);
            let lzw_size = candidates.lzw.as_ref().map_or(0, Vec::len);
            let tag = codec::select::choose(raw.len(), flate_size, lzw_size);
            let blob = match tag {
                CompressionTag::Uncompressed => raw.clone(),
                CompressionTag::Deflate => candidates.deflate.expect("flate chosen implies present"),
                CompressionTag::Lzw => candidates.lzw.expect("lzw chosen implies present"),
            };

            changes.push(PreparedChange {
                filename: filename.clone(),
                save_value: SaveValue {
                    sha256: candidates.sha256,
                    compression: tag,
                    blob,
                },
                state: StateValue {
                    sid: Default::default(), // filled in once the SID is allocated
                    monitored: true,
                    renamed: state.renamed,
                    file_kind: filekind::detect(&raw),
                },
            });
        }

        let changed = changes.len();
        let sid = self.commit_save(&demotions, &changes, comment, when)?;

        if let Some(err) = Error::from_many(errors) {
            return Err(err);
        }

        Ok(SaveResult {
            sid: if changed > 0 { sid } else { INVALID_SID },
            when,
            comment: comment.to_string(),
            missing_files,
        })
    }

    /// `true` only when `filename`'s entry in save `prev_sid` decodes
    /// successfully AND its hash matches `sha`. A missing or corrupt
    /// prior entry is treated as "not the same" so the file gets
    /// re-saved rather than silently dropped (§8 boundary behavior).
    fn same_as_prev(&self, prev_sid: Sid, filename: &str, sha: &[u8; 32]) -> Result<bool> {
        let key = schema::save_key(prev_sid, filename);
        match self.saves.get(key)? {
            Some(raw) => match SaveValue::unmarshal(filename, &raw) {
                Ok(prev) => Ok(&prev.sha256 == sha),
                Err(_) => {
                    log::warn!(
                        "prior entry for {filename:?} at save #{prev_sid} is corrupt; re-saving"
                    );
                    Ok(false)
                }
            },
            None => {
                log::warn!(
                    "expected prior entry for {filename:?} at save #{prev_sid} is missing; re-saving"
                );
                Ok(false)
            }
        }
    }

    /// Allocates the new SID and commits every demotion, entry, and state
    /// update as one transaction over `config`, `states`, and `saves`
    /// (§4.5). Always allocates and consumes a SID, even when `changes`
    /// is empty (§4.6 step 6) — only the metadata keys are conditional.
    fn commit_save(
        &self,
        demotions: &[String],
        changes: &[PreparedChange],
        comment: &str,
        when: SystemTime,
    ) -> Result<Sid> {
        let result: std::result::Result<Sid, sled::transaction::TransactionError<()>> =
            (&self.config, &self.states, &self.saves).transaction(|(tx_config, tx_states, tx_saves)| {
                let next = tx_config
                    .get(schema::CONFIG_NEXT_SID)?
                    .and_then(|raw| <[u8; 4]>::try_from(raw.as_ref()).ok())
                    .map(u32::from_be_bytes)
                    .unwrap_or(0)
                    + 1;
                tx_config.insert(schema::CONFIG_NEXT_SID, &next.to_be_bytes()[..])?;
                let sid = Sid::new(next);

                for filename in demotions {
                    if let Some(raw) = tx_states.get(filename.as_bytes())? {
                        if let Some(mut state) = StateValue::unmarshal(&raw) {
                            state.monitored = false;
                            tx_states.insert(filename.as_bytes(), &state.marshal()[..])?;
                        }
                    }
                }

                for change in changes {
                    let mut state = change.state;
                    state.sid = sid;
                    tx_saves.insert(
                        schema::save_key(sid, &change.filename),
                        change.save_value.marshal(),
                    )?;
                    tx_states.insert(change.filename.as_bytes(), &state.marshal()[..])?;
                }

                tx_saves.insert(schema::meta_key(sid, schema::META_EXISTS), &[])?;

                if !changes.is_empty() {
                    tx_saves.insert(
                        schema::meta_key(sid, schema::META_WHEN),
                        timestamp::marshal(when),
                    )?;
                    tx_saves.insert(schema::meta_key(sid, schema::META_COMMENT), comment.as_bytes())?;
                }

                Ok(sid)
            });

        result.map_err(crate::store::map_transaction_error)
    }
}
