use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::RenderConfig;
use crate::error::{FolioError, Result};
use crate::model::Scene;

/// Export settings passed along with a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub export_padding: u32,
    pub max_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            export_padding: 32,
            max_height: 400,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            export_padding: config.export_padding,
            max_height: config.max_height,
        }
    }
}

/// What the external renderer receives, serialized as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub elements: Vec<Value>,
    pub app_state: Map<String, Value>,
    pub files: Map<String, Value>,
    pub export_padding: u32,
}

impl RenderRequest {
    pub fn from_scene(scene: &Scene, options: &RenderOptions) -> Self {
        Self {
            elements: scene.elements.clone(),
            app_state: scene.render_app_state(),
            files: scene.files.clone(),
            export_padding: options.export_padding,
        }
    }
}

/// External scene renderer producing SVG markup.
pub trait SceneRenderer: Send + Sync {
    fn render(
        &self,
        request: &RenderRequest,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Renders by piping the request JSON into an external program and reading
/// SVG from its stdout.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `None` when no renderer command is configured.
    pub fn from_config(config: &RenderConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|cmd| Self::new(cmd.clone(), config.args.clone()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SceneRenderer for CommandRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        let payload = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FolioError::Render(format!("failed to start '{}': {e}", self.program)))?;

        // Stdin is fed while stdout/stderr drain; either pipe may fill first.
        let stdin = child.stdin.take();
        let feed = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(&payload).await,
                None => Ok(()),
            }
        };
        let (sent, output) = tokio::join!(feed, child.wait_with_output());
        let output =
            output.map_err(|e| FolioError::Render(format!("renderer did not finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FolioError::Render(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = sent {
            return Err(FolioError::Render(format!("failed to send scene: {e}")));
        }

        let svg = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !svg.contains("<svg") {
            return Err(FolioError::Render(format!(
                "'{}' produced no SVG output",
                self.program
            )));
        }
        Ok(svg)
    }
}

/// What a diagram view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderOutput {
    /// Skeleton shown while rendering, or after a render failed.
    #[default]
    Placeholder,
    Svg(String),
}

impl RenderOutput {
    pub fn svg(&self) -> Option<&str> {
        match self {
            Self::Svg(svg) => Some(svg),
            Self::Placeholder => None,
        }
    }
}

/// Identifies one render request issued by a [`RenderSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    generation: u64,
}

/// One diagram view's render state.
///
/// Every request takes a ticket from a monotonically increasing generation
/// counter. A result is applied only if its ticket is still the newest when
/// it arrives, so a superseded or abandoned render is silently dropped.
/// In-flight work is not cancelled.
#[derive(Debug, Default)]
pub struct RenderSlot {
    generation: AtomicU64,
    output: Mutex<RenderOutput>,
}

impl RenderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any in flight.
    pub fn begin(&self) -> RenderTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RenderTicket { generation }
    }

    /// Supersede in-flight requests without starting a new one (the view
    /// went away).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Apply the result of `ticket`'s request. Failures are logged and shown
    /// as the placeholder. Returns whether the result was applied.
    pub fn complete(&self, ticket: RenderTicket, result: Result<String>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "discarding stale render");
            return false;
        }
        let next = match result {
            Ok(svg) => RenderOutput::Svg(svg),
            Err(e) => {
                tracing::error!(error = %e, "scene render failed");
                RenderOutput::Placeholder
            }
        };
        match self.output.lock() {
            Ok(mut output) => *output = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        true
    }

    /// Current output.
    pub fn output(&self) -> RenderOutput {
        match self.output.lock() {
            Ok(output) => output.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Render `scene` into this slot. Returns whether this request's result
    /// was the one applied.
    pub async fn render<R: SceneRenderer>(
        &self,
        renderer: &R,
        scene: &Scene,
        options: &RenderOptions,
    ) -> bool {
        let ticket = self.begin();
        let request = RenderRequest::from_scene(scene, options);
        let result = renderer
            .render(&request)
            .await
            .map(|svg| fit_svg(&svg, options.max_height));
        self.complete(ticket, result)
    }
}

/// Make the root `<svg>` fill its container, capped at `max_height` pixels.
///
/// Any `width`/`height` on the root element are replaced and an existing
/// `max-height` declaration in its `style` is overridden. Markup without an
/// `<svg` tag is returned unchanged.
pub fn fit_svg(svg: &str, max_height: u32) -> String {
    let Some(start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let attrs_start = start + "<svg".len();
    let Some((attrs, tag_end)) = parse_attributes(&svg[attrs_start..]) else {
        return svg.to_string();
    };

    let mut style = String::new();
    let mut out = String::with_capacity(svg.len() + 64);
    out.push_str(&svg[..attrs_start]);
    for (name, value) in attrs {
        match name.to_ascii_lowercase().as_str() {
            "width" | "height" => {}
            "style" => {
                style = value
                    .unwrap_or_default()
                    .split(';')
                    .map(str::trim)
                    .filter(|d| !d.is_empty() && !d.to_ascii_lowercase().starts_with("max-height"))
                    .collect::<Vec<_>>()
                    .join("; ");
            }
            _ => match value {
                Some(v) => out.push_str(&format!(" {name}=\"{}\"", v.replace('"', "&quot;"))),
                None => out.push_str(&format!(" {name}")),
            },
        }
    }
    if !style.is_empty() {
        style.push_str("; ");
    }
    style.push_str(&format!("max-height: {max_height}px"));
    out.push_str(&format!(" width=\"100%\" height=\"100%\" style=\"{style}\""));
    out.push_str(&svg[attrs_start + tag_end..]);
    out
}

/// Attributes of an opening tag, starting right after its name. Returns the
/// attributes and the offset of the closing `/>` or `>`.
fn parse_attributes(tag: &str) -> Option<(Vec<(String, Option<String>)>, usize)> {
    let bytes = tag.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => return Some((attrs, i)),
            b'/' if bytes.get(i + 1) == Some(&b'>') => return Some((attrs, i)),
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
            && !bytes[i].is_ascii_whitespace()
        {
            i += 1;
        }
        if i == name_start {
            // Stray character such as a lone '/'.
            i += 1;
            continue;
        }
        let name = tag[name_start..i].to_string();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attrs.push((name, None));
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = match bytes.get(i)? {
            &(q @ (b'"' | b'\'')) => {
                let value_start = i + 1;
                let len = tag[value_start..].find(q as char)?;
                i = value_start + len + 1;
                tag[value_start..value_start + len].to_string()
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                tag[value_start..i].to_string()
            }
        };
        attrs.push((name, Some(value)));
    }
}

/// One-shot render: failures are logged and degrade to the placeholder.
pub async fn render_scene<R: SceneRenderer>(
    renderer: &R,
    scene: &Scene,
    options: &RenderOptions,
) -> RenderOutput {
    let slot = RenderSlot::new();
    slot.render(renderer, scene, options).await;
    slot.output()
}
