//! The façade and engine (§2 component 8, §10): keyspace schema, handle
//! lifecycle, monitoring registry, save engine, extract engine, rename,
//! enumeration, dump, and path helpers.
//!
//! [`Store`] is the single entry point; its methods are split across
//! these submodules by concern, one file per responsibility under this
//! directory.

pub mod dump;
pub mod enumerate;
pub mod extract;
pub mod handle;
pub mod monitor;
pub mod path;
pub mod rename;
pub mod save;
pub mod schema;

pub use enumerate::SaveInfo;
pub use handle::Store;
pub use save::SaveResult;

/// Folds a failed `sled` transaction into this crate's [`crate::Error`].
///
/// Every transaction in `store` uses `()` as its abort type and never
/// actually aborts itself (sled only ever reports `Storage` here, since
/// nothing in these closures calls `abort`), so the `Abort` arm is
/// unreachable by construction.
pub(crate) fn map_transaction_error(err: sled::transaction::TransactionError<()>) -> crate::Error {
    match err {
        sled::transaction::TransactionError::Storage(err) => crate::Error::Db(err),
        sled::transaction::TransactionError::Abort(()) => unreachable!("transaction never aborts"),
    }
}
