//! Folder entries

use super::tree::{self, Tree};
use crate::filesystem::FsHandle;
use crate::{codec, Entry, Glob, ReadOptions, Result, Watch, WriteData, WriteOptions};
use chrono::{DateTime, Utc};
use galactic_ledger::Document;
use std::fmt;
use std::future::Future;

/// Shape returned by `Folder::get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Flat list in listing order
    Array,
    /// Nested by path segment
    #[default]
    Tree,
}

/// A folder's children in the requested layout
#[derive(Debug, Clone)]
pub enum Listing {
    Array(Vec<Entry>),
    Tree(Tree),
}

/// Snapshot of a folder, with its children when produced by a listing
#[derive(Clone)]
pub struct Folder {
    path: String,
    name: String,
    /// Prefix for relative paths and for nesting children
    base: String,
    created: DateTime<Utc>,
    deleted: bool,
    entries: Vec<Entry>,
    pub(crate) fs: FsHandle,
}

impl Folder {
    pub(crate) fn from_document(doc: Document, fs: FsHandle) -> Self {
        Self {
            name: codec::entry_name(&doc.path),
            base: doc.path.clone(),
            created: doc.created,
            deleted: doc.deleted,
            path: doc.path,
            entries: Vec::new(),
            fs,
        }
    }

    /// Folder holding the result of a listing
    pub(crate) fn listing(
        path: &str,
        created: DateTime<Utc>,
        entries: Vec<Entry>,
        fs: FsHandle,
    ) -> Self {
        Self {
            path: path.to_string(),
            name: codec::entry_name(path),
            base: path.to_string(),
            created,
            deleted: false,
            entries,
            fs,
        }
    }

    /// Folder holding the matches of a glob read
    pub(crate) fn matches(glob: &Glob, entries: Vec<Entry>, fs: FsHandle) -> Self {
        Self {
            path: glob.pattern().to_string(),
            name: glob.pattern().to_string(),
            base: glob.base().to_string(),
            created: Utc::now(),
            deleted: false,
            entries,
            fs,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Children in listing order; empty unless produced by a read
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Children as a flat list or a nested tree
    pub fn get(&self, layout: Layout) -> Listing {
        match layout {
            Layout::Array => Listing::Array(self.entries.clone()),
            Layout::Tree => Listing::Tree(self.tree()),
        }
    }

    /// Children nested by path segment relative to this folder
    pub fn tree(&self) -> Tree {
        tree::build(&self.base, &self.entries)
    }

    /// Visit children one at a time, in order. The first error stops
    /// the walk and is returned.
    pub async fn for_each<F, Fut>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(Entry) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        for entry in &self.entries {
            visitor(entry.clone()).await?;
        }
        Ok(())
    }

    pub async fn read(&self, relative_path: &str) -> Result<Entry> {
        let path = format!("{}{}", self.base, relative_path);
        self.fs.upgrade()?.read(ReadOptions::new(path)).await
    }

    pub async fn write(
        &self,
        relative_path: &str,
        data: impl Into<WriteData>,
        options: WriteOptions,
    ) -> Result<Entry> {
        let path = format!("{}{}", self.base, relative_path);
        self.fs.upgrade()?.write(&path, data, options).await
    }

    pub async fn delete(&self) -> Result<usize> {
        self.fs.upgrade()?.delete(&self.path).await
    }

    pub async fn copy(&self, destination: &str) -> Result<()> {
        self.fs
            .upgrade()?
            .copy(&self.path, destination, WriteOptions::default())
            .await
    }

    pub async fn move_to(&self, destination: &str) -> Result<()> {
        self.fs
            .upgrade()?
            .move_to(&self.path, destination, WriteOptions::default())
            .await
    }

    /// Watch paths under this folder matching `pattern`
    pub fn watch(&self, pattern: &str) -> Result<Watch> {
        let pattern = format!("{}{}", self.base, pattern);
        self.fs.upgrade()?.watch(&pattern)
    }

    /// Watch everything under this folder
    pub fn watch_all(&self) -> Result<Watch> {
        self.watch("*")
    }
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("path", &self.path)
            .field("created", &self.created)
            .field("deleted", &self.deleted)
            .field("entries", &self.entries)
            .finish()
    }
}
