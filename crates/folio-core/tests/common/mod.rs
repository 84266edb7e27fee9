//! Shared helpers for folio-core integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use folio_core::model::{CreateProjectInput, ProjectColor, Scene};
use folio_core::storage::{FileStore, KeyValueStore, MemoryStore, SqliteStore, Storage};
use serde_json::json;

/// A fresh scratch directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("folio-{label}-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// One of each backend, each starting from a persisted empty project list.
pub fn all_backends(label: &str) -> Vec<(Storage, Option<PathBuf>)> {
    let file_dir = temp_dir(&format!("{label}-file"));
    let sqlite_dir = temp_dir(&format!("{label}-sqlite"));

    let backends = vec![
        (Storage::Memory(MemoryStore::new()), None),
        (
            Storage::File(FileStore::open(&file_dir).expect("open file store")),
            Some(file_dir),
        ),
        (
            Storage::Sqlite(SqliteStore::open(sqlite_dir.join("folio.db")).expect("open sqlite")),
            Some(sqlite_dir),
        ),
    ];
    for (store, _) in &backends {
        store
            .set(folio_core::storage::PROJECTS_KEY, "[]")
            .expect("seed empty list");
    }
    backends
}

pub fn cleanup(dir: Option<PathBuf>) {
    if let Some(dir) = dir {
        let _ = std::fs::remove_dir_all(dir);
    }
}

pub fn project_input(title: &str) -> CreateProjectInput {
    CreateProjectInput {
        title: title.to_string(),
        subtitle: format!("{title} subtitle"),
        description: format!("What {title} does"),
        tech: vec!["Rust".into(), "Tokio".into()],
        github: Some(format!("https://github.com/example/{}", title.to_lowercase())),
        date: "Oct 2026".into(),
        highlights: vec!["Fast".into(), "Small".into()],
        color: ProjectColor::Cyan,
        ..Default::default()
    }
}

/// A scene exercising nested element properties and an embedded file.
pub fn sample_scene() -> Scene {
    serde_json::from_value(json!({
        "type": "excalidraw",
        "version": 2,
        "source": "https://excalidraw.com",
        "elements": [
            {"id": "r1", "type": "rectangle", "x": 10, "y": 20, "boundElements": [{"id": "a1", "type": "arrow"}]},
            {"id": "a1", "type": "arrow", "points": [[0, 0], [120.5, -3]], "customData": {"tags": ["edge"]}}
        ],
        "appState": {"viewBackgroundColor": "#ffffff", "gridSize": null},
        "files": {"img1": {"mimeType": "image/png", "dataURL": "data:image/png;base64,iVBORw0KGgo="}}
    }))
    .expect("sample scene")
}
