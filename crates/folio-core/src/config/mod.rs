use crate::error::{FolioError, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Store directory (`file`) or database path (`sqlite`). Defaults to
    /// `~/.config/folio/store` or `~/.config/folio/folio.db`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// External program that turns a scene into SVG. Rendering is skipped
    /// (placeholder only) when unset.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_export_padding")]
    pub export_padding: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            export_padding: default_export_padding(),
            max_height: default_max_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_identifier")]
    pub identifier: String,
    #[serde(default = "default_secret")]
    pub secret: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            secret: default_secret(),
        }
    }
}

/// Valid storage backend names.
pub const VALID_STORAGE_BACKENDS: &[&str] = &["file", "sqlite", "memory"];

pub const MAX_EXPORT_PADDING: u32 = 256;
pub const MIN_MAX_HEIGHT: u32 = 100;

// -- Defaults --

fn default_storage_backend() -> String {
    "file".to_string()
}
fn default_export_padding() -> u32 {
    32
}
fn default_max_height() -> u32 {
    400
}
fn default_identifier() -> String {
    crate::session::DEFAULT_IDENTIFIER.to_string()
}
fn default_secret() -> String {
    crate::session::DEFAULT_SECRET.to_string()
}

impl FolioConfig {
    /// Load configuration with three-layer TOML merge:
    /// 1. ~/.config/folio/config.toml (global)
    /// 2. .folio/config.toml (project)
    /// 3. .folio/config.local.toml (local, gitignored)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".folio").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".folio").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| FolioError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| FolioError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Load with defaults only (no files).
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig::default(),
            render: RenderConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Validate config values, clamping out-of-range values and logging warnings.
    /// This is lenient: it fixes values rather than rejecting the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !VALID_STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            warnings.push(format!(
                "unknown storage backend '{}', valid: {}",
                self.storage.backend,
                VALID_STORAGE_BACKENDS.join(", ")
            ));
        }

        if self.render.export_padding > MAX_EXPORT_PADDING {
            warnings.push(format!(
                "render.export_padding = {} exceeds {MAX_EXPORT_PADDING}, clamping",
                self.render.export_padding
            ));
            self.render.export_padding = MAX_EXPORT_PADDING;
        }

        if self.render.max_height < MIN_MAX_HEIGHT {
            warnings.push(format!(
                "render.max_height = {} below {MIN_MAX_HEIGHT}, clamping",
                self.render.max_height
            ));
            self.render.max_height = MIN_MAX_HEIGHT;
        }

        if let Some(ref cmd) = self.render.command {
            if cmd.trim().is_empty() {
                warnings.push("render.command is empty, rendering disabled".to_string());
                self.render.command = None;
            }
        }

        if self.session.identifier.trim().is_empty() || self.session.secret.is_empty() {
            warnings.push("session credentials are empty, using built-in defaults".to_string());
            self.session = SessionConfig::default();
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }

    /// Serialize to TOML, as written by `folio init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FolioError::Config(format!("failed to serialize config: {e}")))
    }
}

/// Path of the project-level config file under `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".folio").join("config.toml")
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("folio").join("config.toml"))
}
