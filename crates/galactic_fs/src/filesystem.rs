//! Filesystem facade over a ledger

use crate::codec::{self, SEPARATOR};
use crate::object_url::UrlRegistry;
use crate::{
    guess_mime_type, Blob, Entry, Folder, FsError, Glob, ObjectUrl, ReadOptions, Result, Watch,
    WriteData, WriteOptions,
};
use chrono::Utc;
use futures::future::BoxFuture;
use galactic_ledger::{
    Capabilities, DocKind, Document, Ledger, MemoryLedger, QuotaEstimator, UnknownQuota,
    UNBOUNDED_QUOTA,
};
use indexmap::IndexMap;
use std::sync::{Arc, Weak};

pub(crate) struct FsInner {
    ledger: Arc<dyn Ledger>,
    quota: Arc<dyn QuotaEstimator>,
    urls: UrlRegistry,
}

/// Non-owning back-reference held by entries and watches
#[derive(Clone)]
pub(crate) struct FsHandle(Weak<FsInner>);

impl FsHandle {
    pub(crate) fn upgrade(&self) -> Result<GalacticFs> {
        self.0
            .upgrade()
            .map(|inner| GalacticFs { inner })
            .ok_or(FsError::Detached)
    }
}

/// Storage usage report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    /// Sum of stored file content lengths
    pub used: u64,
    /// Host estimate, or `UNBOUNDED_QUOTA` when unknown
    pub quota: u64,
    /// `quota - used`; negative when usage exceeds a stale estimate
    pub freespace: i64,
}

/// Slash-delimited file and folder namespace stored in a `Ledger`.
///
/// Cloning is cheap and shares the same ledger and URL registry.
#[derive(Clone)]
pub struct GalacticFs {
    inner: Arc<FsInner>,
}

impl GalacticFs {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self::with_quota(ledger, Arc::new(UnknownQuota))
    }

    pub fn with_quota(ledger: Arc<dyn Ledger>, quota: Arc<dyn QuotaEstimator>) -> Self {
        Self {
            inner: Arc::new(FsInner {
                ledger,
                quota,
                urls: UrlRegistry::default(),
            }),
        }
    }

    /// Filesystem over a fresh in-memory ledger
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLedger::new()))
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.inner.ledger
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.ledger.capabilities()
    }

    pub(crate) fn handle(&self) -> FsHandle {
        FsHandle(Arc::downgrade(&self.inner))
    }

    /// Read a file, list a folder, or collect the matches of a glob.
    ///
    /// Paths containing `*` return a folder of every matching entry.
    /// Folder paths return their descendants, pruned by `depth` and then
    /// passed through `filter` and `sort`.
    pub async fn read(&self, options: impl Into<ReadOptions>) -> Result<Entry> {
        let options = options.into();

        if codec::is_pattern(&options.path) {
            return self.read_matching(&options).await;
        }

        codec::validate(&options.path)?;
        if codec::is_folder_path(&options.path) {
            self.read_folder(&options).await
        } else {
            let doc = self.fetch_file(&options.path).await?;
            Ok(Entry::from_document(doc, &self.handle()))
        }
    }

    async fn read_matching(&self, options: &ReadOptions) -> Result<Entry> {
        let glob = Glob::new(&options.path)?;
        let mut docs: Vec<Document> = self
            .inner
            .ledger
            .all_docs()
            .await?
            .into_iter()
            .filter(|doc| glob.matches(&doc.path))
            .collect();
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Glob {} matched {} documents", glob.pattern(), docs.len());

        let entries = self.finish_listing(docs, options);
        Ok(Entry::Folder(Folder::matches(&glob, entries, self.handle())))
    }

    async fn read_folder(&self, options: &ReadOptions) -> Result<Entry> {
        let path = options.path.as_str();
        let range = codec::subtree_range(path);
        let docs = self.inner.ledger.query_path(Some(&range)).await?;

        if docs.is_empty() && path != "/" {
            return Err(FsError::NotFound(path.to_string()));
        }

        let created = docs
            .iter()
            .find(|doc| doc.path == path)
            .map(|marker| marker.created)
            .unwrap_or_else(Utc::now);

        let base_depth = codec::segment_count(path);
        let docs: Vec<Document> = docs
            .into_iter()
            .filter(|doc| doc.path != path)
            .filter(|doc| match options.depth {
                Some(depth) => codec::segment_count(&doc.path).saturating_sub(base_depth) <= depth,
                None => true,
            })
            .collect();
        tracing::debug!("Listed {} entries under {}", docs.len(), path);

        let entries = self.finish_listing(docs, options);
        Ok(Entry::Folder(Folder::listing(
            path,
            created,
            entries,
            self.handle(),
        )))
    }

    /// Wrap documents as entries, then apply the caller's filter and sort
    fn finish_listing(&self, docs: Vec<Document>, options: &ReadOptions) -> Vec<Entry> {
        let handle = self.handle();
        let mut entries: Vec<Entry> = docs
            .into_iter()
            .map(|doc| Entry::from_document(doc, &handle))
            .collect();

        if let Some(filter) = &options.filter {
            entries.retain(|entry| filter(entry));
        }
        if let Some(sort) = &options.sort {
            entries.sort_by(|a, b| sort(a, b));
        }
        entries
    }

    /// Current file document at `path`
    pub(crate) async fn fetch_file(&self, path: &str) -> Result<Document> {
        self.inner
            .ledger
            .get(&codec::file_id(path))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    FsError::NotFound(path.to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn find(&self, id: &str) -> Result<Option<Document>> {
        match self.inner.ledger.get(id).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a file, or create a folder and everything in its tree.
    ///
    /// Folder paths end with `/` and take `WriteData::Empty` or a
    /// `WriteData::Tree`; file paths take bytes or `Empty`.
    pub async fn write(
        &self,
        path: &str,
        data: impl Into<WriteData>,
        options: WriteOptions,
    ) -> Result<Entry> {
        check_target(path)?;
        self.write_data(path.to_string(), data.into(), options).await
    }

    fn write_data(
        &self,
        path: String,
        data: WriteData,
        options: WriteOptions,
    ) -> BoxFuture<'_, Result<Entry>> {
        Box::pin(async move {
            match (codec::is_folder_path(&path), data) {
                (true, WriteData::Empty) => self.write_folder(&path, IndexMap::new(), options).await,
                (true, WriteData::Tree(items)) => self.write_folder(&path, items, options).await,
                (true, WriteData::Bytes(_)) => Err(FsError::InvalidData(format!(
                    "cannot write file content to folder path {}",
                    path
                ))),
                (false, WriteData::Tree(_)) => Err(FsError::InvalidData(format!(
                    "cannot write a folder tree to file path {}",
                    path
                ))),
                (false, WriteData::Empty) => self.write_file(&path, None, options).await,
                (false, WriteData::Bytes(bytes)) => {
                    self.write_file(&path, Some(bytes), options).await
                }
            }
        })
    }

    async fn write_folder(
        &self,
        path: &str,
        items: IndexMap<String, WriteData>,
        options: WriteOptions,
    ) -> Result<Entry> {
        let id = codec::folder_id(path);
        let created = self
            .find(&id)
            .await?
            .map(|existing| existing.created)
            .unwrap_or_else(Utc::now);

        let marker = Document::folder(id, path, created);
        self.inner.ledger.put(marker.clone()).await?;
        tracing::debug!("Wrote folder {}", path);

        for (name, child) in items {
            let name = name.trim_start_matches(SEPARATOR);
            let child_path = if child.is_tree() {
                codec::as_folder_path(&format!("{}{}", path, name))
            } else {
                format!("{}{}", path, name)
            };
            self.write_data(child_path, child, options).await?;
        }

        Ok(Entry::from_document(marker, &self.handle()))
    }

    async fn write_file(
        &self,
        path: &str,
        data: Option<Vec<u8>>,
        options: WriteOptions,
    ) -> Result<Entry> {
        let id = codec::file_id(path);
        let existing = self.find(&id).await?;

        if existing.is_some() && !options.overwrite {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let now = Utc::now();
        let created = existing.as_ref().map_or(now, |doc| doc.created);
        let content = match (options.append, existing.and_then(|doc| doc.content)) {
            (true, Some(mut previous)) => {
                previous.extend(data.unwrap_or_default());
                Some(previous)
            }
            _ => data,
        };

        let doc = Document {
            id,
            kind: DocKind::File,
            path: path.to_string(),
            size: content.as_ref().map_or(0, |c| c.len() as u64),
            content,
            created,
            modified: Some(now),
            mimetype: Some(guess_mime_type(path).to_string()),
            deleted: false,
        };
        self.inner.ledger.put(doc.clone()).await?;
        tracing::debug!("Wrote file {} ({} bytes)", path, doc.size);

        Ok(Entry::from_document(doc, &self.handle()))
    }

    /// Copy a file or a whole folder.
    ///
    /// A file copied to a folder path keeps its name. A folder source always
    /// copies into a folder, whose marker is written first. Each document is
    /// an independent write; a failure leaves the copies made so far.
    pub async fn copy(&self, from: &str, to: &str, options: WriteOptions) -> Result<()> {
        check_target(from)?;
        check_target(to)?;

        if codec::is_folder_path(from) {
            self.copy_folder(from, &codec::as_folder_path(to), options)
                .await
        } else {
            let doc = self.fetch_file(from).await?;
            let to = destination(from, to);
            self.write_file(&to, doc.content, options).await?;
            tracing::debug!("Copied: {} -> {}", from, to);
            Ok(())
        }
    }

    async fn copy_folder(&self, from: &str, to: &str, options: WriteOptions) -> Result<()> {
        let docs = self
            .inner
            .ledger
            .query_path(Some(&codec::subtree_range(from)))
            .await?;
        if docs.is_empty() && from != "/" {
            return Err(FsError::NotFound(from.to_string()));
        }

        self.write_folder(to, IndexMap::new(), options).await?;
        for doc in docs {
            let Some(relative) = doc.path.strip_prefix(from) else {
                continue;
            };
            if relative.is_empty() {
                continue;
            }
            let target = format!("{}{}", to, relative);
            match doc.kind {
                DocKind::Folder => {
                    self.write_folder(&target, IndexMap::new(), options).await?;
                }
                DocKind::File => {
                    self.write_file(&target, doc.content, options).await?;
                }
            }
        }

        tracing::debug!("Copied folder: {} -> {}", from, to);
        Ok(())
    }

    /// Copy, then delete the source. Not atomic.
    pub async fn move_to(&self, from: &str, to: &str, options: WriteOptions) -> Result<()> {
        check_target(from)?;
        check_target(to)?;

        if destination(from, to) == from {
            return Ok(());
        }
        if codec::is_folder_path(from) && codec::as_folder_path(to).starts_with(from) {
            return Err(FsError::InvalidPath(format!(
                "cannot move {} into itself ({})",
                from, to
            )));
        }

        self.copy(from, to, options).await?;
        self.delete(from).await?;
        tracing::debug!("Moved: {} -> {}", from, to);
        Ok(())
    }

    /// Delete a file, or a folder with everything under it.
    ///
    /// Returns the number of documents removed; a missing path removes none.
    /// Documents are removed in reverse path order, so a folder's marker goes last.
    pub async fn delete(&self, path: &str) -> Result<usize> {
        check_target(path)?;

        if codec::is_folder_path(path) {
            let docs = self
                .inner
                .ledger
                .query_path(Some(&codec::subtree_range(path)))
                .await?;
            for doc in docs.iter().rev() {
                self.inner.ledger.del(&doc.id).await?;
            }
            tracing::debug!("Deleted folder {} ({} documents)", path, docs.len());
            Ok(docs.len())
        } else {
            let id = codec::file_id(path);
            if self.find(&id).await?.is_none() {
                return Ok(0);
            }
            self.inner.ledger.del(&id).await?;
            tracing::debug!("Deleted file {}", path);
            Ok(1)
        }
    }

    /// Change notifications for paths matching `pattern`
    pub fn watch(&self, pattern: &str) -> Result<Watch> {
        Ok(Watch::new(Glob::new(pattern)?, self.handle()))
    }

    /// Storage usage. Scans every document on each call.
    pub async fn info(&self) -> Result<StorageInfo> {
        let used: u64 = self
            .inner
            .ledger
            .all_docs()
            .await?
            .iter()
            .filter(|doc| doc.is_file())
            .map(Document::content_len)
            .sum();
        let quota = self
            .inner
            .quota
            .estimate()
            .await
            .unwrap_or(UNBOUNDED_QUOTA);

        Ok(StorageInfo {
            used,
            quota,
            freespace: clamp_i64(quota).saturating_sub(clamp_i64(used)),
        })
    }

    pub(crate) fn register_url(&self, blob: Blob) -> ObjectUrl {
        ObjectUrl::register(&self.inner.urls, blob)
    }

    /// Content behind a live object URL
    pub fn resolve_url(&self, url: &str) -> Option<Blob> {
        self.inner.urls.get(url).map(|blob| blob.clone())
    }
}

/// Path a copy of `from` lands on when targeting `to`
fn destination(from: &str, to: &str) -> String {
    match (codec::is_folder_path(from), codec::is_folder_path(to)) {
        (true, _) => codec::as_folder_path(to),
        (false, true) => format!("{}{}", to, codec::entry_name(from)),
        (false, false) => to.to_string(),
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Validate a concrete (non-glob) path
fn check_target(path: &str) -> Result<()> {
    if codec::is_pattern(path) {
        return Err(FsError::InvalidPath(format!(
            "patterns are only supported by read and watch: {}",
            path
        )));
    }
    codec::validate(path)
}
