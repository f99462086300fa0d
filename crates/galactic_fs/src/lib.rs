//! GalacticFS Virtual Filesystem
//!
//! Presents a slash-delimited file and folder namespace on top of a keyed
//! document `Ledger`:
//! - Path codec: logical paths to document ids and subtree ranges
//! - Glob matching for pattern reads and change subscriptions
//! - `File` / `Folder` entries, point-in-time views of stored documents
//! - `GalacticFs`: read, write, copy, move, delete, watch, info
//! - Configuration for picking and opening a ledger

pub mod codec;
mod config;
mod entry;
mod filesystem;
mod format;
mod glob;
mod mime;
mod object_url;
mod options;
mod watch;

pub use config::{Backend, GalacticConfig, LoggingConfig, StorageConfig};
pub use entry::{Entry, File, Folder, Layout, Listing, Tree, TreeNode};
pub use filesystem::{GalacticFs, StorageInfo};
pub use format::{Blob, Content, Format};
pub use glob::Glob;
pub use mime::guess_mime_type;
pub use object_url::ObjectUrl;
pub use options::{EntryFilter, EntrySort, ReadOptions, WriteData, WriteOptions};
pub use watch::Watch;

pub use galactic_ledger::{Capabilities, Subscription};

use galactic_ledger::LedgerError;
use thiserror::Error;

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Expected a {expected} at {path}")]
    KindMismatch { path: String, expected: &'static str },

    #[error("Filesystem is no longer open")]
    Detached,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl FsError {
    /// True for a missing path or a missing ledger document
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FsError::NotFound(_) | FsError::Ledger(LedgerError::NotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
