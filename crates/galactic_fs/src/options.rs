//! Read and write options

use crate::Entry;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Listing predicate; evaluated synchronously, keep entries returning `true`
pub type EntryFilter = Arc<dyn Fn(&Entry) -> bool + Send + Sync>;

/// Listing comparator; evaluated synchronously
pub type EntrySort = Arc<dyn Fn(&Entry, &Entry) -> Ordering + Send + Sync>;

/// Options for `GalacticFs::read`
#[derive(Clone)]
pub struct ReadOptions {
    pub path: String,
    /// Maximum segment distance below the folder, inclusive; `None` keeps all
    pub depth: Option<usize>,
    /// Applied after depth pruning
    pub filter: Option<EntryFilter>,
    /// Applied after filtering
    pub sort: Option<EntrySort>,
}

impl ReadOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            depth: None,
            filter: None,
            sort: None,
        }
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn sort<F>(mut self, sort: F) -> Self
    where
        F: Fn(&Entry, &Entry) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(sort));
        self
    }
}

impl From<&str> for ReadOptions {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ReadOptions {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&String> for ReadOptions {
    fn from(path: &String) -> Self {
        Self::new(path.as_str())
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("path", &self.path)
            .field("depth", &self.depth)
            .field("filter", &self.filter.is_some())
            .field("sort", &self.sort.is_some())
            .finish()
    }
}

/// Options for `GalacticFs::write`, `copy` and `move_to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Append to an existing file instead of replacing it
    pub append: bool,
    /// Allow writing over an existing file
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            append: false,
            overwrite: true,
        }
    }
}

impl WriteOptions {
    pub fn append() -> Self {
        Self {
            append: true,
            ..Default::default()
        }
    }

    pub fn no_overwrite() -> Self {
        Self {
            overwrite: false,
            ..Default::default()
        }
    }
}

/// Payload of a write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WriteData {
    /// No content: an empty file or a bare folder
    #[default]
    Empty,
    /// File content
    Bytes(Vec<u8>),
    /// Folder contents by relative name; nested trees become sub-folders
    Tree(IndexMap<String, WriteData>),
}

impl WriteData {
    /// Build a folder tree from `(name, data)` pairs
    pub fn tree<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<WriteData>,
    {
        WriteData::Tree(
            items
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, WriteData::Tree(_))
    }
}

impl From<&str> for WriteData {
    fn from(s: &str) -> Self {
        WriteData::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for WriteData {
    fn from(s: String) -> Self {
        WriteData::Bytes(s.into_bytes())
    }
}

impl From<&[u8]> for WriteData {
    fn from(b: &[u8]) -> Self {
        WriteData::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for WriteData {
    fn from(b: Vec<u8>) -> Self {
        WriteData::Bytes(b)
    }
}

impl From<Option<Vec<u8>>> for WriteData {
    fn from(b: Option<Vec<u8>>) -> Self {
        b.map_or(WriteData::Empty, WriteData::Bytes)
    }
}

impl From<IndexMap<String, WriteData>> for WriteData {
    fn from(tree: IndexMap<String, WriteData>) -> Self {
        WriteData::Tree(tree)
    }
}
