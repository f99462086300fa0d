//! Stored document shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a document describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "folder")]
    Folder,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::File => "file",
            DocKind::Folder => "folder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(DocKind::File),
            "folder" => Some(DocKind::Folder),
            _ => None,
        }
    }
}

/// A single record in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store key
    pub id: String,

    pub kind: DocKind,

    /// Logical path, the sort key of the path index
    pub path: String,

    /// Payload; only files carry one
    pub content: Option<Vec<u8>>,

    /// Content length in bytes
    pub size: u64,

    pub created: DateTime<Utc>,

    pub modified: Option<DateTime<Utc>>,

    pub mimetype: Option<String>,

    /// Set on change-feed copies of removed documents
    pub deleted: bool,
}

impl Document {
    /// Create a folder marker document
    pub fn folder(id: impl Into<String>, path: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind: DocKind::Folder,
            path: path.into(),
            content: None,
            size: 0,
            created,
            modified: None,
            mimetype: None,
            deleted: false,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == DocKind::File
    }

    /// Length of the stored content, zero when there is none
    pub fn content_len(&self) -> u64 {
        self.content.as_ref().map_or(0, |c| c.len() as u64)
    }

    /// Copy of this document flagged as removed
    pub fn tombstone(&self) -> Self {
        Self {
            deleted: true,
            ..self.clone()
        }
    }
}

/// Half-open `[lower, upper)` interval over the path index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRange {
    pub lower: String,
    pub upper: String,
}

impl PathRange {
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        path >= self.lower.as_str() && path < self.upper.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(DocKind::parse("file"), Some(DocKind::File));
        assert_eq!(DocKind::parse(DocKind::Folder.as_str()), Some(DocKind::Folder));
        assert_eq!(DocKind::parse("link"), None);
    }

    #[test]
    fn test_range_is_half_open() {
        let range = PathRange::new("/a/", "/a/z");
        assert!(range.contains("/a/"));
        assert!(range.contains("/a/b.txt"));
        assert!(!range.contains("/a/z"));
        assert!(!range.contains("/b"));
    }

    #[test]
    fn test_tombstone() {
        let doc = Document::folder("folder:/x/", "/x/", Utc::now());
        let gone = doc.tombstone();
        assert!(gone.deleted);
        assert_eq!(gone.path, "/x/");
        assert!(!doc.deleted);
    }
}
