//! GalacticFS Ledger Layer
//!
//! Provides the keyed document store the virtual filesystem is built on:
//! - `Ledger`: put/get/del, ordered range queries over the path index,
//!   full enumeration and a change feed
//! - `MemoryLedger` for tests and scratch use
//! - `SqliteLedger` for on-disk storage
//! - `RocksLedger` (feature `rocksdb`) for a KVS-backed store
//! - Quota estimation for storage reports

mod document;
mod feed;
mod memory;
mod pool;
mod quota;
mod schema;
mod sqlite;
#[cfg(feature = "rocksdb")]
mod rocks;

pub use document::{DocKind, Document, PathRange};
pub use feed::{ChangeCallback, ChangeFeed, Subscription};
pub use memory::MemoryLedger;
pub use pool::{init_pool, LedgerPool};
pub use quota::{DiskQuota, FixedQuota, QuotaEstimator, UnknownQuota, UNBOUNDED_QUOTA};
pub use schema::migrate;
pub use sqlite::SqliteLedger;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksLedger;

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[cfg(feature = "rocksdb")]
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Blocking task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// State flags a ledger reports about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Survives process restarts
    pub persistent: bool,
    /// Usable on this host
    pub supported: bool,
    /// Can replicate to a remote peer
    pub syncable: bool,
    /// Accepts writes
    pub writeable: bool,
}

/// Keyed document store.
///
/// Documents are addressed by `id` and additionally indexed by `path`.
/// Every successful `put` and `del` is published on the change feed.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Insert or replace the document stored under `doc.id`
    async fn put(&self, doc: Document) -> Result<()>;

    /// Fetch a document, failing with `NotFound` if absent
    async fn get(&self, id: &str) -> Result<Document>;

    /// Remove a document. Removing a missing id is not an error.
    async fn del(&self, id: &str) -> Result<()>;

    /// Documents ordered ascending by path, restricted to `[lower, upper)`
    /// when a range is given
    async fn query_path(&self, range: Option<&PathRange>) -> Result<Vec<Document>>;

    /// Every stored document, in no particular order
    async fn all_docs(&self) -> Result<Vec<Document>>;

    /// Register a callback for change batches
    fn subscribe(&self, callback: ChangeCallback) -> Subscription;

    fn capabilities(&self) -> Capabilities;
}

/// Get the default ledger directory
pub fn ledger_dir() -> PathBuf {
    ProjectDirs::from("com", "GalacticFS", "GalacticFS")
        .map(|dirs| dirs.data_dir().join("ledgers"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
