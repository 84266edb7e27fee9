use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An Excalidraw scene as produced by the external editor.
///
/// Element descriptors, app-state values and file attachments are kept as
/// opaque JSON; only missing sections are default-filled. Any other
/// top-level keys (`type`, `version`, `source`, ...) are carried in `extra`
/// so the document round-trips intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default, deserialize_with = "null_as_default")]
    pub elements: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app_state: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scene {
    pub fn new(elements: Vec<Value>) -> Self {
        Self {
            elements,
            ..Default::default()
        }
    }

    pub fn with_app_state(mut self, app_state: Map<String, Value>) -> Self {
        self.app_state = app_state;
        self
    }

    pub fn with_files(mut self, files: Map<String, Value>) -> Self {
        self.files = files;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Force the display options every rendered scene shares, in place.
    pub fn normalize(&mut self) {
        self.app_state = self.render_app_state();
    }

    /// App-state handed to the renderer: the authored options with the
    /// export background on and dark mode off, whatever the author chose.
    pub fn render_app_state(&self) -> Map<String, Value> {
        let mut state = self.app_state.clone();
        state.insert("exportBackground".into(), Value::Bool(true));
        state.insert("exportWithDarkMode".into(), Value::Bool(false));
        state.insert("theme".into(), Value::String("light".into()));
        state
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
