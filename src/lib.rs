//! # fhd
//!
//! A local, single-user, embedded file-history store: a library that
//! persists successive snapshots ("saves") of a caller-specified set of
//! files in a single self-contained database. Each save records only
//! the content that changed since the previous save for each monitored
//! file, choosing the most compact encoding per file.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fhd::Store;
//!
//! fn main() -> fhd::Result<()> {
//!     let mut store = Store::open("history.fhd")?;
//!
//!     let result = store.monitor_with_comment(
//!         "started",
//!         &["notes.txt".to_string(), "diagram.png".to_string()],
//!     )?;
//!     println!("saved as #{}", result.sid);
//!
//!     let mut out = Vec::new();
//!     store.extract("notes.txt", &mut out)?;
//!
//!     store.close()
//! }
//! ```
//!
//! ## Scope
//!
//! This crate is the snapshot engine only: the on-disk data model,
//! content-addressed deduplication and compression selection, the
//! save/extract state machine, per-file monitoring, and SID sequencing.
//! A command-line surface, configuration-file parsing, and
//! extract-target filename probing are deliberately left to callers —
//! they're straightforward plumbing around this core, not part of it.
//!
//! ## Concurrency
//!
//! A single process opens one database at a time. Queries borrow
//! `&Store`; mutations borrow `&mut Store`, so the borrow checker
//! enforces the single-writer model the embedded keyspace engine
//! expects. There is no multi-writer or networked access.
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|--------------|
//! | `parallel` | Yes | Runs the three per-file candidate encodings (SHA-256, DEFLATE, LZW) concurrently via `rayon` |

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod error;
pub mod filekind;
pub mod marshal;
pub mod store;
pub mod timestamp;

pub use error::{Error, Result};
pub use filekind::FileKind;
pub use marshal::{INVALID_SID, Sid, StateValue};
pub use store::{SaveInfo, SaveResult, Store};
