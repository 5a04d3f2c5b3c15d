//! # dpdmark store
//!
//! SQLite persistence for the four record collections: `metrics` (events),
//! `social_posts`, `email_campaigns` and `blog_posts`.
//!
//! One connection behind a mutex serializes writers. Every public operation
//! is a single statement or a single transaction, so readers never see a
//! half-applied write.

mod blog;
mod campaigns;
mod events;
mod rows;

use dpdmark_core::error::{MarketingError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Marketing database, exclusive owner of all persisted state.
pub struct MarketingDb {
    conn: Mutex<Connection>,
}

impl MarketingDb {
    /// Open or create the database at `path` (`:memory:` is accepted).
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| MarketingError::storage("DB open", e))?;

        // WAL lets readers proceed while the dispatcher writes
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            tracing::warn!("⚠️ WAL journal unavailable for {}: {e}", path.display());
        }
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| MarketingError::storage("DB busy_timeout", e))?;

        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    /// Fresh private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metrics (
                id TEXT PRIMARY KEY,
                ts TEXT NOT NULL,
                source TEXT,
                medium TEXT,
                campaign TEXT,
                content TEXT,
                term TEXT,
                ip TEXT,
                user_agent TEXT,
                referrer TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_metrics_ts ON metrics (ts);

            CREATE TABLE IF NOT EXISTS social_posts (
                id TEXT PRIMARY KEY,
                channel TEXT NOT NULL,
                content TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'scheduled',
                sent_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_social_due ON social_posts (status, scheduled_at);

            CREATE TABLE IF NOT EXISTS email_campaigns (
                id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                to_list TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'scheduled',
                sent_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_email_due ON email_campaigns (status, scheduled_at);

            CREATE TABLE IF NOT EXISTS blog_posts (
                id TEXT PRIMARY KEY,
                slug TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_blog_updated ON blog_posts (updated_at);
            ",
        )
        .map_err(|e| MarketingError::storage("Migration", e))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MarketingError::Storage(format!("Lock: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_migrate_twice() {
        let dir = std::env::temp_dir().join("dpdmark-db-open-test");
        let path = dir.join("test.db");
        {
            let db = MarketingDb::open(&path).unwrap();
            assert_eq!(db.count_events().unwrap(), 0);
        }
        // Reopening runs the idempotent migrations again
        let db = MarketingDb::open(&path).unwrap();
        assert_eq!(db.count_events().unwrap(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_in_memory() {
        let db = MarketingDb::open_in_memory().unwrap();
        assert!(db.list_blog_posts(None).unwrap().is_empty());
    }
}
