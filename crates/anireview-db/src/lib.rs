pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Handle to the review store. One connection behind a mutex; callers run
/// store work on the blocking pool and never hold the lock across an await.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the review store at `path` and bring its schema up to
    /// date. File stores use WAL; reference checks are on for every store.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening review store {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::prepare(conn)?;
        info!("Review store ready at {}", path.display());
        Ok(db)
    }

    /// Fresh private store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive use of the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("review store connection poisoned by an earlier panic"))?;
        f(&conn)
    }
}
