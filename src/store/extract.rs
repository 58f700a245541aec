//! Extract engine (§4.7): locates a file's stored entry in a given save
//! and streams the decoded content to a writer or to disk.

use std::io::Write;
use std::path::Path;

use crate::codec::{self, hash, select::CompressionTag};
use crate::error::{Error, Result};
use crate::marshal::save_value::SaveValue;
use crate::marshal::sid::Sid;
use crate::store::handle::Store;
use crate::store::schema;

impl Store {
    /// Streams `filename`'s content as stored in save `sid` to `writer`.
    ///
    /// Fails with [`Error::NotFoundInSave`] if `filename` has no entry in
    /// that save (either it was never saved, or its content was unchanged
    /// at that point — see the unchanged-elision rule, §3.8) and with
    /// [`Error::CorruptEntry`] if the stored entry can't be decoded.
    pub fn extract_for_sid(&self, sid: Sid, filename: &str, mut writer: impl Write) -> Result<()> {
        let decoded = self.decode_entry(sid, filename)?;
        writer.write_all(&decoded).map_err(|source| Error::io(filename, source))
    }

    /// Streams `filename`'s most recently saved content to `writer`,
    /// resolving the save from its current state record.
    ///
    /// Fails with [`Error::NeverSaved`] if `filename` has no recorded SID.
    pub fn extract(&self, filename: &str, writer: impl Write) -> Result<()> {
        let state = self.state_for_filename(filename)?;
        if !state.sid.is_valid() {
            return Err(Error::NeverSaved(filename.to_string()));
        }
        self.extract_for_sid(state.sid, filename, writer)
    }

    /// Extracts `filename` as it existed in save `sid` to `dest`,
    /// verifying the decoded bytes' SHA-256 against the stored digest
    /// before the write is considered successful — required when
    /// extracting to disk rather than an in-memory writer (§4.7 step 5).
    pub fn extract_to_path(&self, sid: Sid, filename: &str, dest: &Path) -> Result<()> {
        let entry = self.lookup_entry(sid, filename)?;
        let decoded = decode_blob(filename, &entry)?;
        if hash::sha256(&decoded) != entry.sha256 {
            return Err(Error::CorruptEntry {
                filename: filename.to_string(),
                reason: "decoded content does not match stored SHA-256".to_string(),
            });
        }
        std::fs::write(dest, &decoded).map_err(|source| Error::io(dest, source))
    }

    fn decode_entry(&self, sid: Sid, filename: &str) -> Result<Vec<u8>> {
        let entry = self.lookup_entry(sid, filename)?;
        decode_blob(filename, &entry)
    }

    fn lookup_entry(&self, sid: Sid, filename: &str) -> Result<SaveValue> {
        let key = schema::save_key(sid, filename);
        let raw = self.saves.get(key)?.ok_or_else(|| Error::NotFoundInSave {
            sid: sid.value(),
            filename: filename.to_string(),
        })?;
        SaveValue::unmarshal(filename, &raw)
    }
}

fn decode_blob(filename: &str, entry: &SaveValue) -> Result<Vec<u8>> {
    match entry.compression {
        CompressionTag::Uncompressed => Ok(entry.blob.clone()),
        CompressionTag::Deflate => codec::deflate::decompress(&entry.blob).map_err(|source| {
            Error::CorruptEntry {
                filename: filename.to_string(),
                reason: format!("DEFLATE decode failed: {source}"),
            }
        }),
        CompressionTag::Lzw => codec::lzw::decompress(&entry.blob).map_err(|source| Error::CorruptEntry {
            filename: filename.to_string(),
            reason: format!("LZW decode failed: {source}"),
        }),
    }
}
