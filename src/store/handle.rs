//! Database handle lifecycle (§9 "Global handle lifecycle"): opening or
//! creating the `.fhd` file, seeding a fresh file's default keyspace
//! contents, and releasing the handle on close.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::schema::{self, FILE_FORMAT_VERSION};

/// An open file-history database.
///
/// Holds the embedded keyspace engine's handle plus the four trees this
/// crate's schema (§3.4) maps onto: `config`, `config/ignore`, `states`,
/// and `saves`. Queries borrow `&Store`; mutations borrow `&mut Store`, so
/// the Rust borrow checker enforces the single-writer rule §5 describes
/// (this crate adds no additional locking beyond what `sled` itself
/// provides for the underlying file).
pub struct Store {
    pub(crate) db: sled::Db,
    pub(crate) db_dir: PathBuf,
    pub(crate) config: sled::Tree,
    pub(crate) ignore: sled::Tree,
    pub(crate) states: sled::Tree,
    pub(crate) saves: sled::Tree,
}

impl Store {
    /// Opens an existing `.fhd` database or creates a fresh one.
    ///
    /// A fresh file is seeded with `config/format = 1`, the default
    /// ignore-pattern table (§6.2), an empty `states` tree, and an empty
    /// `saves` tree whose SID sequence starts at 0 (so the first
    /// allocation yields 1, §3.4).
    ///
    /// `sled` stores its database as a directory rather than bbolt's
    /// single mmapped file; this crate still treats `path` as "the
    /// database file" per §6.1 (the `.fhd` name is a convention only, not
    /// enforced). On POSIX systems the directory itself is set to
    /// `0o700` (owner-only, but still traversable — `0o600` on a
    /// directory strips the execute bit POSIX requires even for the
    /// owner to open files inside it) and every regular file sled
    /// creates within it is set to `0o600`.
    pub fn open(path: impl AsRef<Path>) -> Result<Store> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|source| Error::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config = open_tree(&db, path, schema::TREE_CONFIG)?;
        let ignore = open_tree(&db, path, schema::TREE_IGNORE)?;
        let states = open_tree(&db, path, schema::TREE_STATES)?;
        let saves = open_tree(&db, path, schema::TREE_SAVES)?;

        initialize(&config, &ignore, path)?;
        apply_owner_only_permissions(path);

        let db_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Ok(Store {
            db,
            db_dir,
            config,
            ignore,
            states,
            saves,
        })
    }

    /// The directory containing the database file, used to relativize
    /// monitored filenames (§6.4).
    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    /// Flushes pending writes and releases the handle.
    ///
    /// Per §9, callers MUST close a handle before reopening the same
    /// file; dropping a `Store` without calling `close` still releases
    /// the underlying lock, but any error flushing the final writes would
    /// otherwise be silently swallowed.
    pub fn close(self) -> Result<()> {
        self.db.flush().map_err(Error::Db).map(|_| ())
    }
}

fn open_tree(db: &sled::Db, path: &Path, name: &str) -> Result<sled::Tree> {
    db.open_tree(name).map_err(|source| Error::OpenFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn initialize(config: &sled::Tree, ignore: &sled::Tree, path: &Path) -> Result<()> {
    match config.get(schema::CONFIG_FORMAT).map_err(|source| Error::OpenFailed {
        path: path.to_path_buf(),
        source,
    })? {
        Some(raw) => {
            let found = *raw.first().ok_or(Error::CorruptSchema { bucket: "config/format" })?;
            if found > FILE_FORMAT_VERSION {
                return Err(Error::UnsupportedFormat {
                    found,
                    supported: FILE_FORMAT_VERSION,
                });
            }
        }
        None => {
            config
                .insert(schema::CONFIG_FORMAT, &[FILE_FORMAT_VERSION][..])
                .map_err(|source| Error::OpenFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            config
                .insert(schema::CONFIG_NEXT_SID, &0u32.to_be_bytes()[..])
                .map_err(|source| Error::OpenFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            for pattern in schema::DEFAULT_IGNORE_PATTERNS {
                ignore
                    .insert(pattern.as_bytes(), &[])
                    .map_err(|source| Error::OpenFailed {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            log::debug!("initialized fresh fhd database at {}", path.display());
        }
    }
    Ok(())
}

/// Applies owner-only permissions to `path`, which `sled` may have
/// created as either a directory (the common case) or a single file.
/// Directories get `0o700` so the owner can still traverse into them;
/// regular files — the directory itself when `sled` is backed by a
/// single file, and every file `sled` creates inside a directory-backed
/// store — get `0o600`.
#[cfg(unix)]
fn apply_owner_only_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };

    if metadata.is_dir() {
        if let Err(e) = set_mode(path, 0o700) {
            log::warn!("failed to set 0o700 permissions on {}: {}", path.display(), e);
        }
        if let Err(e) = apply_owner_only_permissions_recursive(path) {
            log::warn!("failed to lock down permissions under {}: {}", path.display(), e);
        }
    } else if let Err(e) = set_mode(path, 0o600) {
        log::warn!("failed to set 0o600 permissions on {}: {}", path.display(), e);
    }
}

#[cfg(unix)]
fn apply_owner_only_permissions_recursive(dir: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            set_mode(&entry.path(), 0o700)?;
            apply_owner_only_permissions_recursive(&entry.path())?;
        } else if file_type.is_file() {
            set_mode(&entry.path(), 0o600)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(mode);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn apply_owner_only_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_open_seeds_format_and_defaults() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("t.fhd")).unwrap();
        let format = store.config.get(schema::CONFIG_FORMAT).unwrap().unwrap();
        assert_eq!(&format[..], &[FILE_FORMAT_VERSION]);
        assert!(store.ignore.contains_key(schema::PROTECTED_IGNORE_PATTERN).unwrap());
        assert_eq!(store.states.len(), 0);
        assert_eq!(store.saves.len(), 0);
        store.close().unwrap();
    }

    #[test]
    fn reopen_preserves_existing_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.fhd");
        Store::open(&path).unwrap().close().unwrap();
        let store = Store::open(&path).unwrap();
        let format = store.config.get(schema::CONFIG_FORMAT).unwrap().unwrap();
        assert_eq!(&format[..], &[FILE_FORMAT_VERSION]);
    }

    #[test]
    #[cfg(unix)]
    fn directory_backed_store_stays_traversable_after_permissions_are_locked_down() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("t.fhd");
        Store::open(&path).unwrap().close().unwrap();

        assert!(path.is_dir());
        let dir_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);

        let mut saw_a_file = false;
        for entry in std::fs::read_dir(&path).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_file() {
                saw_a_file = true;
                let mode = entry.metadata().unwrap().permissions().mode() & 0o777;
                assert_eq!(mode, 0o600);
            }
        }
        assert!(saw_a_file, "sled should have created at least one regular file");

        // The real-world regression this guards: reopening after close used
        // to fail once the directory itself lost its execute bit.
        Store::open(&path).unwrap().close().unwrap();
    }

    #[test]
    fn rejects_newer_format_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.fhd");
        Store::open(&path).unwrap().close().unwrap();
        {
            let db = sled::open(&path).unwrap();
            let config = db.open_tree(schema::TREE_CONFIG).unwrap();
            config.insert(schema::CONFIG_FORMAT, &[99u8][..]).unwrap();
            db.flush().unwrap();
        }
        let err = Store::open(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { found: 99, .. }));
    }
}
