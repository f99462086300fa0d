//! File entries

use crate::filesystem::FsHandle;
use crate::{codec, Blob, Content, Entry, Format, FsError, ObjectUrl, Result, WriteOptions};
use chrono::{DateTime, Utc};
use galactic_ledger::Document;
use serde::de::DeserializeOwned;
use std::fmt;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Snapshot of a file document
#[derive(Clone)]
pub struct File {
    path: String,
    name: String,
    size: u64,
    mimetype: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    deleted: bool,
    pub(crate) fs: FsHandle,
}

impl File {
    pub(crate) fn from_document(doc: Document, fs: FsHandle) -> Self {
        Self {
            name: codec::entry_name(&doc.path),
            size: doc.size,
            mimetype: doc.mimetype.unwrap_or_else(|| DEFAULT_MIME.to_string()),
            created: doc.created,
            modified: doc.modified.unwrap_or(doc.created),
            deleted: doc.deleted,
            path: doc.path,
            fs,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content length when the snapshot was taken
    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Current stored document; always re-read
    async fn current(&self) -> Result<Document> {
        self.fs.upgrade()?.fetch_file(&self.path).await
    }

    /// Render the current content in the requested format
    pub async fn get(&self, format: Format) -> Result<Content> {
        Ok(match format {
            Format::Bytes => Content::Bytes(self.bytes().await?),
            Format::Blob => Content::Blob(self.blob().await?),
            Format::Json => Content::Json(self.json().await?),
            Format::Text => Content::Text(self.text().await?),
            Format::Url => Content::Url(self.url().await?),
            Format::Entry => {
                self.current().await?;
                Content::Entry(Entry::File(self.clone()))
            }
        })
    }

    /// Raw content; empty for a file written without data
    pub async fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.current().await?.content.unwrap_or_default())
    }

    pub async fn text(&self) -> Result<String> {
        String::from_utf8(self.bytes().await?).map_err(|e| FsError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.bytes().await?).map_err(|e| FsError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn blob(&self) -> Result<Blob> {
        let doc = self.current().await?;
        Ok(Blob {
            bytes: doc.content.unwrap_or_default(),
            mime: doc.mimetype.unwrap_or_else(|| self.mimetype.clone()),
        })
    }

    /// Register the current content under a scoped URL
    pub async fn url(&self) -> Result<ObjectUrl> {
        let fs = self.fs.upgrade()?;
        let blob = self.blob().await?;
        Ok(fs.register_url(blob))
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
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("mimetype", &self.mimetype)
            .field("created", &self.created)
            .field("modified", &self.modified)
            .field("deleted", &self.deleted)
            .finish()
    }
}
