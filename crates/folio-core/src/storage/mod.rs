mod backend;
mod file;
mod memory;
mod sqlite;

pub use backend::KeyValueStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::config::FolioConfig;
use crate::error::{FolioError, Result};

/// Key holding the project list with scenes stripped out.
pub const PROJECTS_KEY: &str = "projects-list";
/// Prefix of the per-project scene keys.
pub const SCENE_KEY_PREFIX: &str = "project-scene-";
/// Key holding the admin session flag.
pub const AUTH_KEY: &str = "auth-flag";

/// Storage key of the scene attached to project `id`.
pub fn scene_key(id: &str) -> String {
    format!("{SCENE_KEY_PREFIX}{id}")
}

/// Enum wrapper for the store backends. Dispatches to the concrete
/// implementation so callers can stay generic over one concrete type.
pub enum Storage {
    Memory(MemoryStore),
    File(FileStore),
    Sqlite(SqliteStore),
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::Memory(s) => s.get(key),
            Storage::File(s) => s.get(key),
            Storage::Sqlite(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Storage::Memory(s) => s.set(key, value),
            Storage::File(s) => s.set(key, value),
            Storage::Sqlite(s) => s.set(key, value),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self {
            Storage::Memory(s) => s.delete(key),
            Storage::File(s) => s.delete(key),
            Storage::Sqlite(s) => s.delete(key),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        match self {
            Storage::Memory(s) => s.keys(prefix),
            Storage::File(s) => s.keys(prefix),
            Storage::Sqlite(s) => s.keys(prefix),
        }
    }
}

impl Storage {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Storage::Memory(_) => "memory",
            Storage::File(_) => "file",
            Storage::Sqlite(_) => "sqlite",
        }
    }

    /// Where the data lives, if anywhere on disk.
    pub fn location(&self) -> Option<PathBuf> {
        match self {
            Storage::Memory(_) => None,
            Storage::File(s) => Some(s.dir().to_path_buf()),
            Storage::Sqlite(s) => Some(s.path().to_path_buf()),
        }
    }
}

/// Create a store backend from the given configuration.
pub fn create_backend(config: &FolioConfig) -> Result<Storage> {
    match config.storage.backend.as_str() {
        "memory" => Ok(Storage::Memory(MemoryStore::new())),
        "file" => {
            let dir = match &config.storage.path {
                Some(p) => PathBuf::from(p),
                None => default_data_dir()?.join("store"),
            };
            Ok(Storage::File(FileStore::open(dir)?))
        }
        "sqlite" => {
            let path = match &config.storage.path {
                Some(p) => PathBuf::from(p),
                None => default_data_dir()?.join("folio.db"),
            };
            Ok(Storage::Sqlite(SqliteStore::open(path)?))
        }
        other => Err(FolioError::Config(format!(
            "unknown storage backend: {other}"
        ))),
    }
}

/// Default data directory: `~/.config/folio`
fn default_data_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("folio"))
        .ok_or_else(|| FolioError::Config("cannot determine config directory".to_string()))
}
