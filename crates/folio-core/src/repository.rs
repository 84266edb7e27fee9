//! The project repository: an ordered, in-memory collection of projects
//! mirrored into a [`KeyValueStore`].
//!
//! Persistence is split in two. The project list is stored under
//! [`PROJECTS_KEY`] with every scene stripped out, and each attached scene
//! lives under its own [`scene_key`]. Changing a title therefore never
//! re-serializes a diagram, and a store that refuses a large scene only
//! loses that one scene.
//!
//! Store failures never reach the caller. The in-memory collection is the
//! source of truth for the running process; a failed write only means the
//! change will not survive a reload.

use crate::error::{FolioError, Result};
use crate::model::{seed_projects, CreateProjectInput, Project, Scene, UpdateProjectInput};
use crate::storage::{scene_key, KeyValueStore, PROJECTS_KEY, SCENE_KEY_PREFIX};

const ID_PREFIX: &str = "p";

pub struct ProjectRepository<S: KeyValueStore> {
    store: S,
    projects: Vec<Project>,
    last_seq: u64,
}

impl<S: KeyValueStore> ProjectRepository<S> {
    /// Rebuild the collection from `store`, falling back to the seed set
    /// when nothing usable has been persisted.
    pub fn load(store: S) -> Self {
        let projects = read_projects(&store);
        let last_seq = highest_seq(&projects);
        tracing::debug!(count = projects.len(), "project repository loaded");
        Self {
            store,
            projects,
            last_seq,
        }
    }

    /// Discard in-memory state and read it back from the store.
    pub fn reload(&mut self) {
        self.projects = read_projects(&self.store);
        self.last_seq = self.last_seq.max(highest_seq(&self.projects));
    }

    /// Current projects, most recently added first.
    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Add a project at the front of the collection. Fields are taken as
    /// given; no completeness check happens here.
    pub fn create(&mut self, input: CreateProjectInput) -> Project {
        let id = self.next_id();
        let project = Project::from_input(id, input);

        // A scene left behind under a reused id must not attach itself.
        self.remove_scene(&project.id);
        self.projects.insert(0, project.clone());
        self.persist_list();

        tracing::info!(id = %project.id, title = %project.title, "project created");
        project
    }

    /// Shallow-merge `input` into project `id`.
    pub fn update(&mut self, id: &str, input: &UpdateProjectInput) -> Result<Project> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| FolioError::NotFound(format!("project {id}")))?;

        input.apply_to(project);
        let updated = project.clone();

        self.persist_list();
        if let Some(ref scene) = input.diagram_scene {
            match scene {
                Some(scene) => self.persist_scene(id, scene),
                None => self.remove_scene(id),
            }
        }

        tracing::info!(id = %id, "project updated");
        Ok(updated)
    }

    /// Remove project `id` together with its stored scene.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| FolioError::NotFound(format!("project {id}")))?;

        self.projects.remove(index);
        self.remove_scene(id);
        self.persist_list();

        tracing::info!(id = %id, "project deleted");
        Ok(())
    }

    pub fn attach_scene(&mut self, id: &str, scene: Scene) -> Result<Project> {
        self.update(id, &UpdateProjectInput::scene(Some(scene)))
    }

    pub fn detach_scene(&mut self, id: &str) -> Result<Project> {
        self.update(id, &UpdateProjectInput::scene(None))
    }

    /// Delete stored scenes whose project no longer exists. Returns the
    /// number of keys removed.
    pub fn prune_orphan_scenes(&self) -> usize {
        let keys = match self.store.keys(SCENE_KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stored scenes");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            let Some(id) = key.strip_prefix(SCENE_KEY_PREFIX) else {
                continue;
            };
            if self.get(id).is_some() {
                continue;
            }
            match self.store.delete(&key) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(key = %key, error = %e, "failed to prune scene"),
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "pruned orphaned scenes");
        }
        removed
    }

    fn next_id(&mut self) -> String {
        loop {
            self.last_seq += 1;
            let id = format!("{ID_PREFIX}{}", self.last_seq);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist_list(&self) {
        let slim: Vec<Project> = self.projects.iter().map(Project::slim).collect();
        let raw = match serde_json::to_string(&slim) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize project list");
                return;
            }
        };
        if let Err(e) = self.store.set(PROJECTS_KEY, &raw) {
            tracing::warn!(key = PROJECTS_KEY, error = %e, "project list not saved");
        }
    }

    fn persist_scene(&self, id: &str, scene: &Scene) {
        let key = scene_key(id);
        let raw = match serde_json::to_string(scene) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize scene");
                return;
            }
        };
        if let Err(e) = self.store.set(&key, &raw) {
            tracing::warn!(key = %key, error = %e, "scene not saved");
        }
    }

    fn remove_scene(&self, id: &str) {
        let key = scene_key(id);
        if let Err(e) = self.store.delete(&key) {
            tracing::warn!(key = %key, error = %e, "scene not removed");
        }
    }
}

/// Read the persisted list and attach each project's scene.
fn read_projects<S: KeyValueStore>(store: &S) -> Vec<Project> {
    let base = match store.get(PROJECTS_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<Project>>(&raw) {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "stored project list is corrupt, using seed data");
                seed_projects()
            }
        },
        Ok(None) => seed_projects(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read project list, using seed data");
            seed_projects()
        }
    };

    base.into_iter()
        .map(|mut project| {
            project.diagram_scene = read_scene(store, &project.id).or(project.diagram_scene);
            project
        })
        .collect()
}

/// A scene that is missing, unreadable or corrupt reads as absent.
fn read_scene<S: KeyValueStore>(store: &S, id: &str) -> Option<Scene> {
    let key = scene_key(id);
    match store.get(&key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(scene) => Some(scene),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored scene is corrupt, ignoring");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to read scene");
            None
        }
    }
}

fn highest_seq(projects: &[Project]) -> u64 {
    projects
        .iter()
        .filter_map(|p| p.id.strip_prefix(ID_PREFIX).and_then(|n| n.parse::<u64>().ok()))
        .max()
        .unwrap_or(0)
}
