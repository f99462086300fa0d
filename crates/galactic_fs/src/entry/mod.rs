//! File and folder entries
//!
//! Entries are point-in-time views built from ledger documents on every
//! read, write and change notification. They never observe later changes
//! and hold only a weak handle back to the filesystem that produced them.

mod file;
mod folder;
mod tree;

pub use file::File;
pub use folder::{Folder, Layout, Listing};
pub use tree::{Tree, TreeNode};

use crate::filesystem::FsHandle;
use crate::{FsError, Result};
use chrono::{DateTime, Utc};
use galactic_ledger::{DocKind, Document};

/// A file or folder
#[derive(Debug, Clone)]
pub enum Entry {
    File(File),
    Folder(Folder),
}

impl Entry {
    pub(crate) fn from_document(doc: Document, fs: &FsHandle) -> Self {
        match doc.kind {
            DocKind::File => Entry::File(File::from_document(doc, fs.clone())),
            DocKind::Folder => Entry::Folder(Folder::from_document(doc, fs.clone())),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Entry::File(f) => f.path(),
            Entry::Folder(f) => f.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::File(f) => f.name(),
            Entry::Folder(f) => f.name(),
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        match self {
            Entry::File(f) => f.created(),
            Entry::Folder(f) => f.created(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder(_))
    }

    /// True when built from a change notification for a removed document
    pub fn is_deleted(&self) -> bool {
        match self {
            Entry::File(f) => f.is_deleted(),
            Entry::Folder(f) => f.is_deleted(),
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Entry::File(f) => Some(f),
            Entry::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Entry::Folder(f) => Some(f),
            Entry::File(_) => None,
        }
    }

    pub fn into_file(self) -> Result<File> {
        match self {
            Entry::File(f) => Ok(f),
            Entry::Folder(f) => Err(FsError::KindMismatch {
                path: f.path().to_string(),
                expected: "file",
            }),
        }
    }

    pub fn into_folder(self) -> Result<Folder> {
        match self {
            Entry::Folder(f) => Ok(f),
            Entry::File(f) => Err(FsError::KindMismatch {
                path: f.path().to_string(),
                expected: "folder",
            }),
        }
    }

    pub async fn delete(&self) -> Result<usize> {
        match self {
            Entry::File(f) => f.delete().await,
            Entry::Folder(f) => f.delete().await,
        }
    }

    pub async fn copy(&self, destination: &str) -> Result<()> {
        match self {
            Entry::File(f) => f.copy(destination).await,
            Entry::Folder(f) => f.copy(destination).await,
        }
    }

    pub async fn move_to(&self, destination: &str) -> Result<()> {
        match self {
            Entry::File(f) => f.move_to(destination).await,
            Entry::Folder(f) => f.move_to(destination).await,
        }
    }
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        Entry::File(file)
    }
}

impl From<Folder> for Entry {
    fn from(folder: Folder) -> Self {
        Entry::Folder(folder)
    }
}
