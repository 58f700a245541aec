//! Error types for the file-history store.
//!
//! This module provides the [`Error`] enum covering every failure mode the
//! core engine can produce, along with a convenient [`Result<T>`] type
//! alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Errors
//! from multi-file operations (monitoring, ignoring, saving) accumulate
//! into [`Error::Many`] rather than stopping at the first failure — see
//! that variant's docs.
//!
//! ```rust,no_run
//! use fhd::{Store, Result};
//!
//! fn take_a_save(store: &mut Store) -> Result<()> {
//!     let result = store.save("checkpoint")?;
//!     if result.sid.is_valid() {
//!         println!("saved as #{}", result.sid);
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while opening, querying, or mutating a
/// file-history database.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The underlying keyspace engine could not open or create the database
    /// file.
    ///
    /// Common causes: the path's parent directory doesn't exist, the file
    /// is locked by another process (only one writer is ever allowed, see
    /// the crate's concurrency model), or the permissions on an existing
    /// file forbid the required access.
    #[error("failed to open database {path}: {source}")]
    OpenFailed {
        /// The database file path that failed to open.
        path: PathBuf,
        /// The underlying engine error.
        #[source]
        source: sled::Error,
    },

    /// A required top-level bucket is missing on a file that was previously
    /// initialized by this crate (or a compatible one).
    ///
    /// This means the `.fhd` file's keyspace layout doesn't match §3.4 of
    /// the schema: one of `config`, `states`, or `saves` is absent even
    /// though `config/format` is already set. Opening a genuinely fresh
    /// file never produces this error — only opening something that has
    /// been partially written, truncated, or isn't an fhd database at all.
    #[error("corrupt schema: bucket {bucket:?} is missing")]
    CorruptSchema {
        /// Name of the missing bucket.
        bucket: &'static str,
    },

    /// `config/format` names a file-format version newer than this build
    /// understands.
    #[error("unsupported file format version {found} (this build supports up to {supported})")]
    UnsupportedFormat {
        /// The format byte read from the database.
        found: u8,
        /// The highest format byte this build can read.
        supported: u8,
    },

    /// The requested filename is not an entry in the requested save.
    ///
    /// Either the file was never part of that save (its content was
    /// unchanged at that point — see the unchanged-elision rule in §3.8),
    /// or the save/filename pair simply never existed.
    #[error("{filename:?} is not recorded in save #{sid}")]
    NotFoundInSave {
        /// The save that was searched.
        sid: u32,
        /// The filename that was not found.
        filename: String,
    },

    /// The filename has never been saved (its state record's SID is the
    /// invalid sentinel `0`).
    #[error("{0:?} has never been saved")]
    NeverSaved(String),

    /// A stored entry is malformed: an unrecognized compression tag, or a
    /// length-prefixed field whose declared length runs past the end of
    /// the buffer.
    #[error("corrupt entry for {filename:?}: {reason}")]
    CorruptEntry {
        /// The filename whose entry is malformed.
        filename: String,
        /// What, specifically, was wrong with it.
        reason: String,
    },

    /// Reading a monitored source file from disk failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A write transaction was rolled back; nothing it attempted is
    /// durable.
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// The embedded keyspace engine reported a failure reading or writing
    /// a tree outside of the initial `open` (which has its own
    /// [`Error::OpenFailed`]) — e.g. an I/O error flushing a commit.
    #[error("database engine error: {0}")]
    Db(#[from] sled::Error),

    /// Several independent failures occurred within a single multi-file
    /// operation (`monitor`, `unmonitor`, `ignore`, `save`).
    ///
    /// Per-file errors never short-circuit the rest of the batch — every
    /// file gets a chance to succeed or fail on its own, and the collected
    /// failures are reported together here. A batch with exactly one
    /// failure reports that failure directly rather than wrapping it.
    #[error("{} errors occurred: {}", .0.len(), join_many(.0))]
    Many(Vec<Error>),
}

fn join_many(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Wraps a bare I/O error with the path that produced it.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Folds a list of per-file errors into either nothing, a single
    /// [`Error`], or [`Error::Many`] — never an empty `Many`.
    pub(crate) fn from_many(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(Error::Many(errors)),
        }
    }

    /// `true` for errors that reflect a corrupt or unreadable on-disk
    /// structure, as opposed to a straightforward "not found" condition.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::CorruptSchema { .. } | Error::CorruptEntry { .. })
    }
}

impl From<io::Error> for Error {
    /// Used by `?` when an I/O failure isn't tied to a specific path
    /// (e.g. writing to an arbitrary `dyn Write` during `dump`). Prefer
    /// [`Error::io`] when a path is available.
    fn from(source: io::Error) -> Self {
        Error::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

/// A specialized `Result` type for file-history store operations.
pub type Result<T> = std::result::Result<T, Error>;
