//! Ingestion of externally authored Excalidraw scenes.
//!
//! A scene arrives either as an uploaded `.excalidraw` / `.json` file or as
//! pasted text. Both paths parse into the same [`Scene`]; anything that is
//! not a JSON object is rejected with a [`ParseError`] whose message says
//! whether the file type or the content was wrong. Element contents are
//! never inspected.

mod render;

pub use render::{
    fit_svg, render_scene, CommandRenderer, RenderOptions, RenderOutput, RenderRequest,
    RenderSlot, RenderTicket, SceneRenderer,
};

use serde_json::Value;

use crate::error::ParseError;
use crate::model::Scene;

/// File extensions accepted for upload.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".excalidraw", ".json"];

/// Whether `filename` carries one of the [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(filename: &str) -> bool {
    let lower = filename.trim().to_lowercase();
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| lower.len() > ext.len() && lower.ends_with(ext))
}

/// Parse an uploaded file. The extension is checked before the contents.
pub fn ingest_from_file(bytes: &[u8], filename: &str) -> Result<Scene, ParseError> {
    if !has_accepted_extension(filename) {
        return Err(ParseError::UnsupportedExtension {
            filename: filename.to_string(),
        });
    }
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError::InvalidEncoding)?;
    ingest_from_text(text)
}

/// Parse pasted scene JSON.
pub fn ingest_from_text(text: &str) -> Result<Scene, ParseError> {
    let text = text.trim_start_matches('\u{feff}');
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::Malformed {
        reason: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let mut scene: Scene = serde_json::from_value(value).map_err(|e| ParseError::Malformed {
        reason: e.to_string(),
    })?;
    scene.normalize();
    tracing::debug!(elements = scene.elements.len(), "scene ingested");
    Ok(scene)
}
