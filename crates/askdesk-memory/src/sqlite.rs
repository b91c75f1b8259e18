//! SQLite store for missed queries and feedback.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::MissedQueryLog;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

fn db_err(e: impl std::fmt::Display) -> AskDeskError {
    AskDeskError::Memory(e.to_string())
}

/// A query that fell through to the snippet, generative or error stage.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MissedQuery {
    pub id: i64,
    pub query: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub rating: i64,
    pub comment: String,
    pub submitted_at: String,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database. Pass `:memory:` for an ephemeral store.
    pub fn open(path: &Path) -> Result<Self> {
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(db_err)?;

        // WAL
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS missed (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rating INTEGER NOT NULL,
                comment TEXT DEFAULT '',
                submitted_at TEXT NOT NULL
            );",
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Append a missed query.
    pub fn insert_missed(&self, query: &str, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute(
            "INSERT INTO missed (query, timestamp) VALUES (?1, ?2)",
            params![query, at.to_rfc3339()],
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Most recent missed queries first.
    pub fn recent_missed(&self, limit: usize) -> Result<Vec<MissedQuery>> {
        let conn = self.conn.lock().map_err(db_err)?;
        let mut stmt = conn
            .prepare("SELECT id, query, timestamp FROM missed ORDER BY id DESC LIMIT ?1")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(MissedQuery {
                    id: row.get(0)?,
                    query: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    pub fn missed_count(&self) -> usize {
        self.conn
            .lock()
            .ok()
            .and_then(|conn| {
                conn.query_row("SELECT COUNT(*) FROM missed", [], |r| r.get::<_, i64>(0))
                    .ok()
            })
            .unwrap_or(0) as usize
    }

    /// Store a feedback rating with an optional comment.
    pub fn submit_feedback(&self, rating: i64, comment: &str) -> Result<i64> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute(
            "INSERT INTO feedback (rating, comment, submitted_at) VALUES (?1, ?2, ?3)",
            params![rating, comment, Utc::now().to_rfc3339()],
        )
        .map_err(db_err)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_feedback(&self, limit: usize) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn.lock().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, rating, COALESCE(comment, ''), submitted_at
                 FROM feedback ORDER BY id DESC LIMIT ?1",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(FeedbackRecord {
                    id: row.get(0)?,
                    rating: row.get(1)?,
                    comment: row.get(2)?,
                    submitted_at: row.get(3)?,
                })
            })
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }
}

impl MissedQueryLog for SqliteStore {
    fn record(&self, query: &str, at: DateTime<Utc>) {
        match self.insert_missed(query, at) {
            Ok(()) => tracing::info!("📝 Logged missed query: {query}"),
            Err(e) => tracing::error!("❌ Failed to log missed query: {e}"),
        }
    }
}
