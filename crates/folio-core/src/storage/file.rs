use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{FolioError, Result};

const EXTENSION: &str = "json";

/// Directory-backed store: one file per key.
///
/// Writes go to a hidden temp file and are renamed into place, so a reader
/// never sees a half-written value.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            FolioError::Storage(format!("failed to create store directory {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FolioError::Storage(format!("failed to read '{key}': {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let encoded = encode_key(key);
        let tmp = self.dir.join(format!(".{encoded}.{EXTENSION}.tmp"));
        let path = self.path_for(key);
        fs::write(&tmp, value)
            .map_err(|e| FolioError::Storage(format!("failed to write '{key}': {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| FolioError::Storage(format!("failed to commit '{key}': {e}")))
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FolioError::Storage(format!("failed to delete '{key}': {e}"))),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| FolioError::Storage(format!("failed to list store: {e}")))?;
        let mut keys: Vec<String> = entries
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                let stem = name.strip_suffix(&format!(".{EXTENSION}"))?;
                decode_key(stem)
            })
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Keep `[A-Za-z0-9_-]` as-is and percent-encode every other byte so any key
/// maps to a safe, reversible file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
