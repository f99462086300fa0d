//! SQLite-backed ledger

use crate::{
    init_pool, migrate, Capabilities, ChangeCallback, ChangeFeed, DocKind, Document, Ledger,
    LedgerError, LedgerPool, PathRange, Result, Subscription,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

const SELECT_COLUMNS: &str =
    "SELECT id, kind, path, content, size, created_ms, modified_ms, mimetype FROM documents";

/// Raw row before timestamp and kind validation
struct DocumentRow {
    id: String,
    kind: String,
    path: String,
    content: Option<Vec<u8>>,
    size: i64,
    created_ms: i64,
    modified_ms: Option<i64>,
    mimetype: Option<String>,
}

impl DocumentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            path: row.get(2)?,
            content: row.get(3)?,
            size: row.get(4)?,
            created_ms: row.get(5)?,
            modified_ms: row.get(6)?,
            mimetype: row.get(7)?,
        })
    }

    fn into_document(self) -> Result<Document> {
        let corrupt = |id: &str, reason: &str| LedgerError::Corrupt {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let kind = DocKind::parse(&self.kind).ok_or_else(|| corrupt(&self.id, "unknown kind"))?;
        let created = DateTime::<Utc>::from_timestamp_millis(self.created_ms)
            .ok_or_else(|| corrupt(&self.id, "created timestamp out of range"))?;
        let modified = match self.modified_ms {
            Some(ms) => Some(
                DateTime::<Utc>::from_timestamp_millis(ms)
                    .ok_or_else(|| corrupt(&self.id, "modified timestamp out of range"))?,
            ),
            None => None,
        };

        Ok(Document {
            id: self.id,
            kind,
            path: self.path,
            content: self.content,
            size: self.size.max(0) as u64,
            created,
            modified,
            mimetype: self.mimetype,
            deleted: false,
        })
    }
}

/// Persistent ledger stored in a single SQLite file
pub struct SqliteLedger {
    pool: LedgerPool,
    path: PathBuf,
    feed: ChangeFeed,
}

impl SqliteLedger {
    /// Open or create the ledger database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = init_pool(path)?;
        migrate(&pool)?;

        tracing::info!("SQLite ledger opened at {:?}", path);
        Ok(Self {
            pool,
            path: path.to_path_buf(),
            feed: ChangeFeed::new(),
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run store work on the blocking pool with a pooled connection
    async fn with_conn<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| LedgerError::Pool(e.to_string()))?;
            work(&conn)
        })
        .await
        .map_err(|e| LedgerError::Task(e.to_string()))?
    }

    fn collect_rows(
        stmt: &mut rusqlite::Statement<'_>,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Document>> {
        let rows = stmt.query_map(params, DocumentRow::from_row)?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?.into_document()?);
        }
        Ok(docs)
    }

    fn load(conn: &rusqlite::Connection, id: &str) -> Result<Document> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;

        match stmt.query_row([id], DocumentRow::from_row) {
            Ok(row) => row.into_document(),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(LedgerError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn put(&self, doc: Document) -> Result<()> {
        let row = doc.clone();
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO documents
                    (id, kind, path, content, size, created_ms, modified_ms, mimetype)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                rusqlite::params![
                    row.id,
                    row.kind.as_str(),
                    row.path,
                    row.content,
                    row.size as i64,
                    row.created.timestamp_millis(),
                    row.modified.map(|m| m.timestamp_millis()),
                    row.mimetype,
                ],
            )?;
            Ok(())
        })
        .await?;

        self.feed.publish(&[doc]);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Document> {
        let id = id.to_string();
        self.with_conn(move |conn| Self::load(conn, &id)).await
    }

    async fn del(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        let removed = self
            .with_conn(move |conn| match Self::load(conn, &id) {
                Ok(doc) => {
                    conn.execute("DELETE FROM documents WHERE id = ?1", [&id])?;
                    Ok(Some(doc))
                }
                Err(LedgerError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            })
            .await?;

        if let Some(doc) = removed {
            self.feed.publish(&[doc.tombstone()]);
        }
        Ok(())
    }

    async fn query_path(&self, range: Option<&PathRange>) -> Result<Vec<Document>> {
        let range = range.cloned();
        self.with_conn(move |conn| match range {
            Some(range) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE path >= ?1 AND path < ?2 ORDER BY path",
                    SELECT_COLUMNS
                ))?;
                Self::collect_rows(&mut stmt, [&range.lower, &range.upper])
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY path", SELECT_COLUMNS))?;
                Self::collect_rows(&mut stmt, rusqlite::params![])
            }
        })
        .await
    }

    async fn all_docs(&self) -> Result<Vec<Document>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SELECT_COLUMNS)?;
            Self::collect_rows(&mut stmt, rusqlite::params![])
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
