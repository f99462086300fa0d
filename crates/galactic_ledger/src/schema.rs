//! Ledger schema and migrations

use crate::{LedgerError, LedgerPool, Result};

const SCHEMA_VERSION: i32 = 1;

/// Run ledger migrations
pub fn migrate(pool: &LedgerPool) -> Result<()> {
    let conn = pool.get().map_err(|e| LedgerError::Pool(e.to_string()))?;

    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if current_version > SCHEMA_VERSION {
        return Err(LedgerError::Migration(format!(
            "ledger schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            "Migrating ledger from version {} to {}",
            current_version,
            SCHEMA_VERSION
        );

        if current_version < 1 {
            apply_v1(&conn)?;
        }

        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    }

    Ok(())
}

fn apply_v1(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per document, keyed by store id
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY NOT NULL,

            -- 'file' | 'folder'
            kind TEXT NOT NULL,

            -- Logical path; BINARY collation keeps code-point order
            path TEXT NOT NULL UNIQUE COLLATE BINARY,

            content BLOB,
            size INTEGER NOT NULL DEFAULT 0,

            -- Unix epoch milliseconds
            created_ms INTEGER NOT NULL,
            modified_ms INTEGER,

            mimetype TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_documents_path ON documents(path);
        "#,
    )?;

    Ok(())
}
