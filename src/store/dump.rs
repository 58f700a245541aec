//! Human-readable dump (§9, §12.1): a debugging transcript, not a core
//! invariant.

use std::io::Write;
use std::time::UNIX_EPOCH;

use crate::codec::select::CompressionTag;
use crate::error::Result;
use crate::marshal::save_value::SaveValue;
use crate::store::handle::Store;
use crate::store::schema;

/// Truncates `s` to at most `max` characters, keeping a prefix and suffix
/// and eliding the middle with `...` — ported from the original
/// implementation's `gong.ElideMiddle` calls in its own dump/`String`
/// methods.
fn elide_middle(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3) / 2;
    let chars: Vec<char> = s.chars().collect();
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}

impl Store {
    /// Writes a debugging transcript of the whole database to `writer`:
    /// the config format byte, every state entry, and every save with its
    /// timestamp/comment and per-file entries (compression tag, an
    /// elided text preview or byte count, and an elided SHA-256 hex).
    pub fn dump(&self, mut writer: impl Write) -> Result<()> {
        let format = self.config.get(schema::CONFIG_FORMAT)?;
        match format {
            Some(raw) => writeln!(writer, "config/format={}", raw.first().copied().unwrap_or(0))?,
            None => writeln!(writer, "config/format=<missing>")?,
        }

        writeln!(writer, "states:")?;
        for (filename, state) in self.states()? {
            writeln!(
                writer,
                "  {filename} sid={} monitored={} renamed={} kind={}",
                state.sid,
                state.monitored,
                state.renamed,
                state.file_kind.as_byte() as char,
            )?;
        }

        writeln!(writer, "saves:")?;
        for sid in self.sids()? {
            write!(writer, "  sid #{sid}: ")?;
            match self.save_info_for_sid(sid) {
                Ok(info) => {
                    let secs = info
                        .when
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    write!(writer, "epoch={secs}")?;
                    if !info.comment.is_empty() {
                        write!(writer, " {:?}", info.comment)?;
                    }
                    writeln!(writer)?;
                }
                Err(_) => writeln!(writer, "(empty save)")?,
            }

            for entry in self.saves.scan_prefix(schema::save_prefix(sid)) {
                let (key, raw) = entry?;
                let Some((_, suffix)) = schema::split_save_key(&key) else {
                    continue;
                };
                if schema::is_meta_suffix(suffix) {
                    continue;
                }
                let filename = String::from_utf8_lossy(suffix).into_owned();
                write!(writer, "    {filename} ")?;
                match SaveValue::unmarshal(&filename, &raw) {
                    Ok(value) => write_entry_summary(&mut writer, &value)?,
                    Err(e) => write!(writer, "error: {e}")?,
                }
                writeln!(writer)?;
            }
        }

        Ok(())
    }
}

fn write_entry_summary(writer: &mut impl Write, value: &SaveValue) -> Result<()> {
    let tag = match value.compression {
        CompressionTag::Uncompressed => 'U',
        CompressionTag::Deflate => 'F',
        CompressionTag::Lzw => 'L',
    };
    write!(writer, "{tag} ")?;
    if value.compression == CompressionTag::Uncompressed {
        if let Ok(text) = std::str::from_utf8(&value.blob) {
            write!(writer, "{:?}", elide_middle(text, 32))?;
            write!(writer, " SHA256={}", elide_middle(&hex(&value.sha256), 24))?;
            return Ok(());
        }
    }
    write!(writer, "{} bytes", value.blob.len())?;
    write!(writer, " SHA256={}", elide_middle(&hex(&value.sha256), 24))?;
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
