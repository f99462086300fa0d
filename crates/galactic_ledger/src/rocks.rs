//! RocksDB-backed ledger

use crate::{
    Capabilities, ChangeCallback, ChangeFeed, Document, Ledger, LedgerError, PathRange, Result,
    Subscription,
};
use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

const DOC_PREFIX: &[u8] = b"doc:";
const PATH_PREFIX: &[u8] = b"path:";

fn doc_key(id: &str) -> Vec<u8> {
    let mut key = DOC_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

fn path_key(path: &str) -> Vec<u8> {
    let mut key = PATH_PREFIX.to_vec();
    key.extend_from_slice(path.as_bytes());
    key
}

/// Persistent ledger in a RocksDB directory.
///
/// Documents live under `doc:<id>`; the path index lives under
/// `path:<path>` and maps to the id. RocksDB orders keys bytewise, which
/// for UTF-8 matches code-point order.
pub struct RocksLedger {
    db: Arc<DB>,
    feed: ChangeFeed,
}

impl RocksLedger {
    /// Open or create the ledger database
    pub fn open(path: &Path) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_max_open_files(256);
        opts.set_write_buffer_size(16 * 1024 * 1024); // 16MB

        let db = DB::open(&opts, path)?;
        tracing::info!("RocksDB ledger opened at {:?}", path);
        Ok(Self {
            db: Arc::new(db),
            feed: ChangeFeed::new(),
        })
    }

    /// Run store work on the blocking pool
    async fn with_db<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&DB) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || work(&db))
            .await
            .map_err(|e| LedgerError::Task(e.to_string()))?
    }

    /// Compact the database
    pub fn compact(&self) {
        self.db.compact_range::<[u8; 0], [u8; 0]>(None, None);
    }
}

fn load(db: &DB, id: &str) -> Result<Option<Document>> {
    match db.get(doc_key(id))? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// Walk the path index from `start` while `keep` accepts the key
fn scan_paths(db: &DB, start: &[u8], keep: impl Fn(&[u8]) -> bool) -> Result<Vec<Document>> {
    let mut docs = Vec::new();

    for item in db.iterator(IteratorMode::From(start, Direction::Forward)) {
        let (key, id) = item?;
        if !keep(&key[..]) {
            break;
        }

        let id = String::from_utf8(id.to_vec()).map_err(|e| LedgerError::Corrupt {
            id: String::from_utf8_lossy(&key).to_string(),
            reason: e.to_string(),
        })?;

        // Index entries without a document are skipped
        if let Some(doc) = load(db, &id)? {
            docs.push(doc);
        }
    }

    Ok(docs)
}

#[async_trait]
impl Ledger for RocksLedger {
    async fn put(&self, doc: Document) -> Result<()> {
        let row = doc.clone();
        self.with_db(move |db| {
            let mut batch = WriteBatch::default();

            if let Some(old) = load(db, &row.id)? {
                if old.path != row.path {
                    batch.delete(path_key(&old.path));
                }
            }
            batch.put(doc_key(&row.id), bincode::serialize(&row)?);
            batch.put(path_key(&row.path), row.id.as_bytes());
            db.write(batch)?;
            Ok(())
        })
        .await?;

        self.feed.publish(&[doc]);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Document> {
        let id = id.to_string();
        self.with_db(move |db| load(db, &id)?.ok_or_else(|| LedgerError::NotFound(id.clone())))
            .await
    }

    async fn del(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        let removed = self
            .with_db(move |db| {
                let Some(doc) = load(db, &id)? else {
                    return Ok(None);
                };

                let mut batch = WriteBatch::default();
                batch.delete(doc_key(&id));
                batch.delete(path_key(&doc.path));
                db.write(batch)?;
                Ok(Some(doc))
            })
            .await?;

        if let Some(doc) = removed {
            self.feed.publish(&[doc.tombstone()]);
        }
        Ok(())
    }

    async fn query_path(&self, range: Option<&PathRange>) -> Result<Vec<Document>> {
        let range = range.cloned();
        self.with_db(move |db| match range {
            Some(range) => {
                let lower = path_key(&range.lower);
                let upper = path_key(&range.upper);
                scan_paths(db, &lower, |key| key < upper.as_slice())
            }
            None => scan_paths(db, PATH_PREFIX, |key| key.starts_with(PATH_PREFIX)),
        })
        .await
    }

    async fn all_docs(&self) -> Result<Vec<Document>> {
        self.with_db(|db| {
            let mut docs = Vec::new();

            for item in db.prefix_iterator(DOC_PREFIX) {
                let (key, value) = item?;
                if !key.starts_with(DOC_PREFIX) {
                    break;
                }
                docs.push(bincode::deserialize(&value)?);
            }

            Ok(docs)
        })
        .await
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.feed.subscribe(callback)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            persistent: true,
            supported: true,
            syncable: false,
            writeable: true,
        }
    }
}
