use serde::{Deserialize, Deserializer, Serialize};

use super::Scene;
use crate::error::{FolioError, Result};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;

/// Validate inputs for creating a new project.
///
/// The repository accepts any input; this is the stricter check a form or
/// CLI applies before calling it.
pub fn validate_create_input(input: &CreateProjectInput) -> Result<()> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(FolioError::InvalidInput("title cannot be empty".into()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(FolioError::InvalidInput(format!(
            "title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    if input.description.trim().is_empty() {
        return Err(FolioError::InvalidInput("description cannot be empty".into()));
    }
    if input.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(FolioError::InvalidInput(format!(
            "description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A portfolio project: the unit of content shown on cards and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub live: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub color: ProjectColor,
    #[serde(
        default,
        alias = "excalidraw",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub excalidraw_link: Option<String>,
    #[serde(default, alias = "excalidrawScene", skip_serializing_if = "Option::is_none")]
    pub diagram_scene: Option<Scene>,
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            description: String::new(),
            tech: Vec::new(),
            github: None,
            live: None,
            date: String::new(),
            highlights: Vec::new(),
            color: ProjectColor::Purple,
            excalidraw_link: None,
            diagram_scene: None,
        }
    }

    /// Build a fresh record from caller-supplied fields. The scene always
    /// starts out absent.
    pub fn from_input(id: impl Into<String>, input: CreateProjectInput) -> Self {
        Self {
            id: id.into(),
            title: input.title,
            subtitle: input.subtitle,
            description: input.description,
            tech: input.tech,
            github: input.github,
            live: input.live,
            date: input.date,
            highlights: input.highlights,
            color: input.color,
            excalidraw_link: input.excalidraw_link,
            diagram_scene: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tech(mut self, tech: Vec<String>) -> Self {
        self.tech = tech;
        self
    }

    pub fn with_github(mut self, url: impl Into<String>) -> Self {
        self.github = Some(url.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<String>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn with_color(mut self, color: ProjectColor) -> Self {
        self.color = color;
        self
    }

    pub fn has_diagram(&self) -> bool {
        self.diagram_scene.is_some()
    }

    /// Copy of this record without its scene, as stored in the project list.
    pub fn slim(&self) -> Self {
        Self {
            diagram_scene: None,
            ..self.clone()
        }
    }

    /// Embeddable form of the external diagram link, if one is set.
    pub fn embed_link(&self) -> Option<String> {
        self.excalidraw_link.as_deref().map(embed_url)
    }
}

/// Card theme. Unknown names fall back to the default instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectColor {
    Purple,
    Cyan,
    Pink,
    Emerald,
    #[default]
    Orange,
}

/// CSS values a card uses for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub background: &'static str,
    pub border: &'static str,
}

impl ProjectColor {
    pub const ALL: [ProjectColor; 5] = [
        Self::Purple,
        Self::Cyan,
        Self::Pink,
        Self::Emerald,
        Self::Orange,
    ];

    /// Parse a theme name, falling back to the default for unknown values.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Purple => Palette {
                accent: "#8b5cf6",
                background: "rgba(139,92,246,0.06)",
                border: "rgba(139,92,246,0.18)",
            },
            Self::Cyan => Palette {
                accent: "#06b6d4",
                background: "rgba(6,182,212,0.06)",
                border: "rgba(6,182,212,0.18)",
            },
            Self::Pink => Palette {
                accent: "#ec4899",
                background: "rgba(236,72,153,0.06)",
                border: "rgba(236,72,153,0.18)",
            },
            Self::Emerald => Palette {
                accent: "#10b981",
                background: "rgba(16,185,129,0.06)",
                border: "rgba(16,185,129,0.18)",
            },
            Self::Orange => Palette {
                accent: "#f97316",
                background: "rgba(249,115,22,0.06)",
                border: "rgba(249,115,22,0.18)",
            },
        }
    }
}

impl std::fmt::Display for ProjectColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purple => write!(f, "purple"),
            Self::Cyan => write!(f, "cyan"),
            Self::Pink => write!(f, "pink"),
            Self::Emerald => write!(f, "emerald"),
            Self::Orange => write!(f, "orange"),
        }
    }
}

impl std::str::FromStr for ProjectColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purple" => Ok(Self::Purple),
            "cyan" => Ok(Self::Cyan),
            "pink" => Ok(Self::Pink),
            "emerald" => Ok(Self::Emerald),
            "orange" => Ok(Self::Orange),
            _ => Err(format!("unknown color: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for ProjectColor {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub live: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_new_color")]
    pub color: ProjectColor,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub excalidraw_link: Option<String>,
}

impl Default for CreateProjectInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            tech: Vec::new(),
            github: None,
            live: None,
            date: String::new(),
            highlights: Vec::new(),
            color: default_new_color(),
            excalidraw_link: None,
        }
    }
}

fn default_new_color() -> ProjectColor {
    ProjectColor::Purple
}

/// Field-level patch for an existing project. `None` leaves a field alone;
/// for the optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub tech: Option<Vec<String>>,
    pub github: Option<Option<String>>,
    pub live: Option<Option<String>>,
    pub date: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub color: Option<ProjectColor>,
    pub excalidraw_link: Option<Option<String>>,
    pub diagram_scene: Option<Option<Scene>>,
}

impl UpdateProjectInput {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn scene(scene: Option<Scene>) -> Self {
        Self {
            diagram_scene: Some(scene),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the listed fields into `project`. The id is never touched.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref v) = self.title {
            project.title = v.clone();
        }
        if let Some(ref v) = self.subtitle {
            project.subtitle = v.clone();
        }
        if let Some(ref v) = self.description {
            project.description = v.clone();
        }
        if let Some(ref v) = self.tech {
            project.tech = v.clone();
        }
        if let Some(ref v) = self.github {
            project.github = v.clone();
        }
        if let Some(ref v) = self.live {
            project.live = v.clone();
        }
        if let Some(ref v) = self.date {
            project.date = v.clone();
        }
        if let Some(ref v) = self.highlights {
            project.highlights = v.clone();
        }
        if let Some(v) = self.color {
            project.color = v;
        }
        if let Some(ref v) = self.excalidraw_link {
            project.excalidraw_link = v.clone();
        }
        if let Some(ref v) = self.diagram_scene {
            project.diagram_scene = v.clone();
        }
    }
}

/// Split a comma-separated tech stack into tags, dropping blanks.
pub fn split_tech(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Split one-per-line highlights into bullets, dropping blank lines.
pub fn split_highlights(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}

/// Turn an excalidraw.com share link into its embeddable form. Links to
/// other hosts are returned unchanged.
pub fn embed_url(link: &str) -> String {
    if link.contains("excalidraw.com") {
        link.replacen("excalidraw.com/#", "excalidraw.com/embed/#", 1)
    } else {
        link.to_string()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
