//! SQLite connection configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Settings applied when a SQLite database is opened.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Enforce `REFERENCES` constraints.
    pub foreign_keys: bool,
    /// Use the WAL journal. Ignored for in-memory databases.
    pub wal: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_millis(1000),
            foreign_keys: true,
            wal: true,
        }
    }
}

impl SqliteConfig {
    /// Configuration for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Configuration for an in-memory database.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn wal(mut self, enabled: bool) -> Self {
        self.wal = enabled;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    /// PRAGMAs run right after the database is opened.
    pub fn initial_sql(&self) -> String {
        let mut sql = format!(
            "PRAGMA foreign_keys = {};\n",
            i32::from(self.foreign_keys)
        );
        if self.wal && !self.is_in_memory() {
            sql.push_str("PRAGMA journal_mode = WAL;\n");
        }
        sql
    }
}
