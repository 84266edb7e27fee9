use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};

use super::KeyValueStore;
use crate::error::{FolioError, Result};

/// SQLite-backed key-value store.
///
/// A single `kv` table holds every key. The connection sits behind
/// `Arc<Mutex<>>`; all operations are short synchronous statements.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) a file-backed database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FolioError::Storage(format!("failed to create database directory: {e}"))
                })?;
            }
        }
        let conn = Connection::open(&path)
            .map_err(|e| FolioError::Storage(format!("failed to open SQLite database: {e}")))?;

        Self::configure_and_init(conn, path)
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            FolioError::Storage(format!("failed to open in-memory SQLite database: {e}"))
        })?;

        Self::configure_and_init(conn, PathBuf::from(":memory:"))
    }

    /// Return the path this database was opened with (`:memory:` for in-memory).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn configure_and_init(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| FolioError::Storage(format!("failed to set WAL mode: {e}")))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        store.create_tables()?;
        Ok(store)
    }

    /// Create the `kv` table (idempotent).
    fn create_tables(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                ",
            )
            .map_err(|e| FolioError::Storage(format!("failed to create tables: {e}")))
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FolioError::Storage(format!("failed to acquire database lock: {e}")))?;
        f(&conn)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| FolioError::Storage(format!("failed to read '{key}': {e}")))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| FolioError::Storage(format!("failed to write '{key}': {e}")))
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map(|_| ())
                .map_err(|e| FolioError::Storage(format!("failed to delete '{key}': {e}")))
        })
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT key FROM kv ORDER BY key")
                .map_err(|e| FolioError::Storage(format!("failed to list keys: {e}")))?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| FolioError::Storage(format!("failed to list keys: {e}")))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| FolioError::Storage(format!("failed to list keys: {e}")))?;
            Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
        })
    }
}
