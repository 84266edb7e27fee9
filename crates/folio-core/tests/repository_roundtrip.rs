//! Repository behaviour across every storage backend, including reloads
//! from a fresh process view of the same store.
//!
//! Run: `cargo test -p folio-core --test repository_roundtrip`

mod common;

use std::collections::HashSet;

use common::{all_backends, cleanup, project_input, sample_scene, temp_dir};
use folio_core::diagram::{ingest_from_file, ingest_from_text};
use folio_core::model::{seed_projects, ProjectColor, UpdateProjectInput};
use folio_core::storage::{scene_key, FileStore, KeyValueStore, PROJECTS_KEY};
use folio_core::{FolioError, ProjectRepository, SessionGate};

/// Ids stay unique across a mix of creates and deletes.
#[test]
fn test_ids_unique() {
    for (store, dir) in all_backends("unique") {
        let mut repo = ProjectRepository::load(&store);
        let mut seen = HashSet::new();
        for i in 0..10 {
            let p = repo.create(project_input(&format!("P{i}")));
            assert!(seen.insert(p.id.clone()), "duplicate id {}", p.id);
            if i % 3 == 0 {
                repo.delete(&p.id).unwrap();
            }
        }
        let ids: HashSet<&str> = repo.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), repo.len());
        cleanup(dir);
    }
}

/// create → reload → the record comes back field for field.
#[test]
fn test_create_reload_roundtrip() {
    for (store, dir) in all_backends("roundtrip") {
        let created = {
            let mut repo = ProjectRepository::load(&store);
            repo.create(project_input("Roundtrip"))
        };

        let repo = ProjectRepository::load(&store);
        assert_eq!(repo.get(&created.id), Some(&created), "{}", store.backend_name());
        cleanup(dir);
    }
}

/// Fields not named in an update keep their values, also after reload.
#[test]
fn test_partial_update() {
    for (store, dir) in all_backends("partial") {
        let mut repo = ProjectRepository::load(&store);
        let before = repo.create(project_input("Before"));
        let input = UpdateProjectInput {
            color: Some(ProjectColor::Pink),
            live: Some(Some("https://example.com/live".into())),
            ..Default::default()
        };
        repo.update(&before.id, &input).unwrap();

        let repo = ProjectRepository::load(&store);
        let after = repo.get(&before.id).unwrap();
        assert_eq!(after.color, ProjectColor::Pink);
        assert_eq!(after.live.as_deref(), Some("https://example.com/live"));
        assert_eq!(after.title, before.title);
        assert_eq!(after.subtitle, before.subtitle);
        assert_eq!(after.tech, before.tech);
        assert_eq!(after.github, before.github);
        assert_eq!(after.highlights, before.highlights);
        cleanup(dir);
    }
}

/// A deleted project and its scene are gone for good.
#[test]
fn test_delete_is_complete() {
    for (store, dir) in all_backends("delete") {
        let mut repo = ProjectRepository::load(&store);
        let keep = repo.create(project_input("Keep"));
        let gone = repo.create(project_input("Gone"));
        repo.attach_scene(&gone.id, sample_scene()).unwrap();
        repo.delete(&gone.id).unwrap();

        assert!(!store.contains(&scene_key(&gone.id)).unwrap());
        let repo = ProjectRepository::load(&store);
        assert!(repo.get(&gone.id).is_none());
        assert!(repo.get(&keep.id).is_some());
        cleanup(dir);
    }
}

/// Unknown ids fail without touching the collection.
#[test]
fn test_not_found_leaves_state_unchanged() {
    for (store, dir) in all_backends("notfound") {
        let mut repo = ProjectRepository::load(&store);
        repo.create(project_input("Only"));
        let before = repo.list().to_vec();

        let update = repo.update("missing", &UpdateProjectInput::title("X"));
        assert!(matches!(update, Err(FolioError::NotFound(_))));
        assert!(matches!(repo.delete("missing"), Err(FolioError::NotFound(_))));
        assert!(matches!(
            repo.attach_scene("missing", sample_scene()),
            Err(FolioError::NotFound(_))
        ));
        assert_eq!(repo.list(), before.as_slice());
        cleanup(dir);
    }
}

/// Scenes come back exactly as attached, unknown keys included.
#[test]
fn test_scene_is_opaque() {
    for (store, dir) in all_backends("opaque") {
        let scene = sample_scene();
        let id = {
            let mut repo = ProjectRepository::load(&store);
            let p = repo.create(project_input("Diagram"));
            repo.attach_scene(&p.id, scene.clone()).unwrap();
            p.id
        };

        let repo = ProjectRepository::load(&store);
        let loaded = repo.get(&id).unwrap().diagram_scene.as_ref().unwrap();
        assert_eq!(loaded, &scene);
        assert_eq!(
            serde_json::to_value(loaded).unwrap(),
            serde_json::to_value(&scene).unwrap()
        );
        cleanup(dir);
    }
}

/// An ingested scene is stored as normalized by ingestion.
#[test]
fn test_ingested_scene_roundtrip() {
    for (store, dir) in all_backends("ingest") {
        let text = serde_json::to_string(&sample_scene()).unwrap();
        let scene = ingest_from_file(text.as_bytes(), "architecture.excalidraw").unwrap();

        let mut repo = ProjectRepository::load(&store);
        let p = repo.create(project_input("Ingested"));
        repo.attach_scene(&p.id, scene.clone()).unwrap();

        repo.reload();
        let loaded = repo.get(&p.id).unwrap().diagram_scene.clone().unwrap();
        assert_eq!(loaded, scene);
        assert_eq!(loaded.app_state["theme"], "light");
        assert_eq!(loaded.files.len(), 1);
        cleanup(dir);
    }
}

/// A rejected payload never reaches the repository.
#[test]
fn test_parse_failure_isolated() {
    for (store, dir) in all_backends("parsefail") {
        let mut repo = ProjectRepository::load(&store);
        let p = repo.create(project_input("Untouched"));
        repo.reload();
        let before = repo.list().to_vec();

        for bad in ["", "not json", "[1, 2]", "\"scene\"", "{\"elements\": 5}"] {
            assert!(ingest_from_text(bad).is_err(), "{bad:?} should be rejected");
        }
        let wrong_ext = ingest_from_file(b"{}", "diagram.png").unwrap_err();
        assert!(wrong_ext.is_wrong_extension());

        assert_eq!(repo.list(), before.as_slice());
        assert!(!store.contains(&scene_key(&p.id)).unwrap());
        cleanup(dir);
    }
}

/// Nothing persisted, or a corrupt list, falls back to the seed set.
#[test]
fn test_seed_fallback() {
    let dir = temp_dir("seed");
    let store = FileStore::open(&dir).unwrap();

    let repo = ProjectRepository::load(&store);
    assert_eq!(repo.list(), seed_projects().as_slice());

    store.set(PROJECTS_KEY, "[{\"id\":").unwrap();
    let repo = ProjectRepository::load(&store);
    assert_eq!(repo.list(), seed_projects().as_slice());

    let _ = std::fs::remove_dir_all(&dir);
}

/// Seeds are ordinary records once anything has been written.
#[test]
fn test_seed_edits_persist() {
    let dir = temp_dir("seed-edit");
    let store = FileStore::open(&dir).unwrap();

    let mut repo = ProjectRepository::load(&store);
    repo.delete("2").unwrap();

    let repo = ProjectRepository::load(&store);
    let ids: Vec<&str> = repo.list().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let _ = std::fs::remove_dir_all(&dir);
}

/// Persisted empty list → create → attach → delete → reload.
#[test]
fn test_end_to_end_lifecycle() {
    for (store, dir) in all_backends("e2e") {
        let mut repo = ProjectRepository::load(&store);
        assert!(repo.is_empty());

        let p = repo.create(project_input("Lifecycle"));
        assert_eq!(p.id, "p1");
        assert_eq!(repo.list()[0].id, "p1");

        let scene = ingest_from_text(r#"{"elements":[{"id":"x","type":"ellipse"}]}"#).unwrap();
        repo.attach_scene("p1", scene).unwrap();
        assert!(store.contains(&scene_key("p1")).unwrap());

        repo.delete("p1").unwrap();
        repo.reload();
        assert!(repo.is_empty());
        assert!(!store.contains(&scene_key("p1")).unwrap());
        cleanup(dir);
    }
}

/// The repository accepts writes with or without a session.
#[test]
fn test_repository_ungated_by_session() {
    for (store, dir) in all_backends("ungated") {
        let mut gate = SessionGate::new(&store);
        gate.logout();
        assert!(!gate.is_authenticated());

        let mut repo = ProjectRepository::load(&store);
        let p = repo.create(project_input("NoAuth"));
        repo.update(&p.id, &UpdateProjectInput::title("Still")).unwrap();
        assert_eq!(repo.get(&p.id).unwrap().title, "Still");
        cleanup(dir);
    }
}

/// The session flag shares the store with projects without colliding.
#[test]
fn test_session_persists_beside_projects() {
    for (store, dir) in all_backends("session") {
        let mut gate = SessionGate::new(&store);
        assert!(gate.login(
            folio_core::session::DEFAULT_IDENTIFIER,
            folio_core::session::DEFAULT_SECRET
        ));
        ProjectRepository::load(&store).create(project_input("Beside"));

        assert!(SessionGate::new(&store).is_authenticated());
        assert_eq!(ProjectRepository::load(&store).len(), 1);
        cleanup(dir);
    }
}
