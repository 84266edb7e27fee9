use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use folio_core::config::{self, FolioConfig};
use folio_core::diagram::{self, render_scene, CommandRenderer, RenderOptions, RenderOutput};
use folio_core::model::*;
use folio_core::repository::ProjectRepository;
use folio_core::session::SessionGate;
use folio_core::storage::{create_backend, KeyValueStore, Storage, SCENE_KEY_PREFIX};
use owo_colors::OwoColorize;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", about = "Folio: portfolio projects and their architecture diagrams", version)]
enum Cli {
    /// Initialize Folio in the current directory
    Init,
    /// List projects
    List {
        /// Output raw JSON instead of table
        #[arg(long)]
        json: bool,
    },
    /// Show a project's full details
    Show {
        /// Project ID
        id: String,
        /// Output raw JSON (includes the diagram scene)
        #[arg(long)]
        json: bool,
    },
    /// Add a project (requires login)
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        subtitle: String,
        /// Comma-separated tech stack, e.g. "Rust, Tokio, SQLite"
        #[arg(long, default_value = "")]
        tech: String,
        #[arg(long)]
        github: Option<String>,
        #[arg(long)]
        live: Option<String>,
        /// Display date, e.g. "Oct 2026"
        #[arg(long, default_value = "")]
        date: String,
        /// One highlight per line
        #[arg(long, default_value = "")]
        highlights: String,
        /// Accent color (purple, cyan, pink, emerald, orange)
        #[arg(long, default_value = "purple")]
        color: String,
        /// excalidraw.com share link
        #[arg(long)]
        excalidraw_link: Option<String>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit fields of a project (requires login)
    Edit {
        /// Project ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tech stack (replaces the current one)
        #[arg(long)]
        tech: Option<String>,
        #[arg(long, conflicts_with = "clear_github")]
        github: Option<String>,
        #[arg(long)]
        clear_github: bool,
        #[arg(long, conflicts_with = "clear_live")]
        live: Option<String>,
        #[arg(long)]
        clear_live: bool,
        #[arg(long)]
        date: Option<String>,
        /// One highlight per line (replaces the current ones)
        #[arg(long)]
        highlights: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, conflicts_with = "clear_link")]
        excalidraw_link: Option<String>,
        #[arg(long)]
        clear_link: bool,
    },
    /// Delete a project and its diagram (requires login)
    Delete {
        /// Project ID
        id: String,
        /// Confirm deletion
        #[arg(long)]
        confirm: bool,
    },
    /// Attach a diagram from a .excalidraw or .json file (requires login)
    Attach {
        /// Project ID
        id: String,
        /// Scene file
        path: PathBuf,
    },
    /// Attach a diagram from scene JSON on stdin (requires login)
    Paste {
        /// Project ID
        id: String,
    },
    /// Remove a project's diagram (requires login)
    Detach {
        /// Project ID
        id: String,
    },
    /// Render a project's diagram to SVG with the configured renderer
    Render {
        /// Project ID
        id: String,
        /// Output file (default: <id>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove stored diagrams whose project no longer exists (requires login)
    Prune,
    /// Log in as the site operator
    Login {
        /// Operator identifier (email)
        identifier: String,
        /// Secret; read from stdin when omitted
        #[arg(long)]
        secret: Option<String>,
    },
    /// Log out
    Logout,
    /// Show storage, session and renderer status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = FolioConfig::load(Some(&std::env::current_dir()?))
        .unwrap_or_else(|_| FolioConfig::default_config());

    run(cli, &config).await
}

async fn run(cli: Cli, config: &FolioConfig) -> Result<()> {
    // Init only writes config; it must not create a store as a side effect.
    if let Cli::Init = cli {
        return cmd_init();
    }

    let storage = make_storage(config)?;
    let mut gate = SessionGate::from_config(&storage, &config.session);
    let mut repo = ProjectRepository::load(&storage);

    match cli {
        Cli::Init => cmd_init(),
        Cli::List { json } => cmd_list(&repo, json),
        Cli::Show { id, json } => cmd_show(&repo, &id, json),
        Cli::Add {
            title,
            description,
            subtitle,
            tech,
            github,
            live,
            date,
            highlights,
            color,
            excalidraw_link,
            json,
        } => {
            require_session(&gate)?;
            let input = CreateProjectInput {
                title,
                subtitle,
                description,
                tech: split_tech(&tech),
                github: non_empty(github),
                live: non_empty(live),
                date,
                highlights: split_highlights(&highlights),
                color: parse_color(&color)?,
                excalidraw_link: non_empty(excalidraw_link),
            };
            cmd_add(&mut repo, input, json)
        }
        Cli::Edit {
            id,
            title,
            subtitle,
            description,
            tech,
            github,
            clear_github,
            live,
            clear_live,
            date,
            highlights,
            color,
            excalidraw_link,
            clear_link,
        } => {
            require_session(&gate)?;
            let input = UpdateProjectInput {
                title,
                subtitle,
                description,
                tech: tech.as_deref().map(split_tech),
                github: optional_patch(github, clear_github),
                live: optional_patch(live, clear_live),
                date,
                highlights: highlights.as_deref().map(split_highlights),
                color: color.as_deref().map(parse_color).transpose()?,
                excalidraw_link: optional_patch(excalidraw_link, clear_link),
                diagram_scene: None,
            };
            cmd_edit(&mut repo, &id, &input)
        }
        Cli::Delete { id, confirm } => {
            require_session(&gate)?;
            cmd_delete(&mut repo, &id, confirm)
        }
        Cli::Attach { id, path } => {
            require_session(&gate)?;
            cmd_attach(&mut repo, &id, &path).await
        }
        Cli::Paste { id } => {
            require_session(&gate)?;
            cmd_paste(&mut repo, &id).await
        }
        Cli::Detach { id } => {
            require_session(&gate)?;
            cmd_detach(&mut repo, &id)
        }
        Cli::Render { id, output } => cmd_render(&repo, config, &id, output).await,
        Cli::Prune => {
            require_session(&gate)?;
            cmd_prune(&repo)
        }
        Cli::Login { identifier, secret } => cmd_login(&mut gate, &identifier, secret).await,
        Cli::Logout => {
            gate.logout();
            println!("{}", "Logged out.".dimmed());
            Ok(())
        }
        Cli::Status => cmd_status(&storage, &repo, &gate, config),
    }
}

fn make_storage(config: &FolioConfig) -> Result<Storage> {
    create_backend(config).context("failed to create storage backend")
}

fn require_session<S: KeyValueStore>(gate: &SessionGate<S>) -> Result<()> {
    if !gate.is_authenticated() {
        anyhow::bail!("not logged in. Run `folio login <identifier>` first.");
    }
    Ok(())
}

fn parse_color(s: &str) -> Result<ProjectColor> {
    s.parse::<ProjectColor>().map_err(|_| {
        let valid: Vec<String> = ProjectColor::ALL.iter().map(|c| c.to_string()).collect();
        anyhow::anyhow!("unknown color '{s}'. Valid options: {}", valid.join(", "))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_patch(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(|v| non_empty(Some(v)))
    }
}

fn project_not_found(id: &str) -> anyhow::Error {
    anyhow::anyhow!("no project with id '{id}'. Run `folio list` to see ids.")
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = config::project_config_path(&cwd);

    if config_path.exists() {
        println!("Folio already initialized in this directory.");
        return Ok(());
    }
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let config = FolioConfig::default_config();
    let toml_str = format!(
        "# Set render.command to an SVG exporter to enable `folio render`\n{}",
        config.to_toml()?
    );
    std::fs::write(&config_path, toml_str)?;

    let gitignore_path = cwd.join(".gitignore");
    let entry = ".folio/config.local.toml";
    if gitignore_path.exists() {
        let contents = std::fs::read_to_string(&gitignore_path)?;
        if !contents.lines().any(|l| l.trim() == entry) {
            let mut appended = contents;
            if !appended.ends_with('\n') {
                appended.push('\n');
            }
            appended.push_str(entry);
            appended.push('\n');
            std::fs::write(&gitignore_path, appended)?;
        }
    } else {
        std::fs::write(&gitignore_path, format!("{entry}\n"))?;
    }

    println!("{}", "Initialized Folio in .folio/".green());
    println!("  {}   .folio/config.toml", "Config:".dimmed());
    println!("  {}  {}", "Storage:".dimmed(), config.storage.backend.cyan());
    println!(
        "  {}",
        "Edit .folio/config.local.toml for local overrides (gitignored)".dimmed()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

fn cmd_list<S: KeyValueStore>(repo: &ProjectRepository<S>, json: bool) -> Result<()> {
    let projects = repo.list();

    if json {
        let slim: Vec<Project> = projects.iter().map(Project::slim).collect();
        println!("{}", serde_json::to_string_pretty(&slim)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Add one with `folio add`.");
        return Ok(());
    }

    println!(
        "  {}  {}  {}  {}  {}",
        format!("{:<6}", "ID").dimmed(),
        format!("{:<8}", "Color").dimmed(),
        format!("{:<9}", "Date").dimmed(),
        format!("{:<7}", "Diagram").dimmed(),
        "Title".dimmed(),
    );
    println!("{}", "─".repeat(72).dimmed());

    for p in projects {
        let diagram = if p.has_diagram() { "scene" } else { "" };
        println!(
            "  {}  {:<8}  {:<9}  {:<7}  {}",
            format!("{:<6}", p.id).cyan(),
            p.color.to_string().magenta(),
            p.date,
            diagram.green(),
            p.title,
        );
    }

    println!("{}", "─".repeat(72).dimmed());
    println!(
        "  {} project{}",
        projects.len(),
        if projects.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_show<S: KeyValueStore>(repo: &ProjectRepository<S>, id: &str, json: bool) -> Result<()> {
    let project = repo.get(id).ok_or_else(|| project_not_found(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(project)?);
        return Ok(());
    }

    println!("{}", project.title.bold());
    if !project.subtitle.is_empty() {
        println!("{}", project.subtitle.dimmed());
    }
    println!();
    println!("{}", project.description);

    if !project.highlights.is_empty() {
        println!();
        for h in &project.highlights {
            println!("  {} {}", "•".magenta(), h);
        }
    }

    println!();
    println!("{}", "--- Details ---".dimmed());
    println!("  {}  {}", "ID:".dimmed(), project.id.cyan());
    if !project.date.is_empty() {
        println!("  {}  {}", "Date:".dimmed(), project.date);
    }
    println!(
        "  {}  {} ({})",
        "Color:".dimmed(),
        project.color,
        project.color.palette().accent
    );
    if !project.tech.is_empty() {
        println!("  {}  {}", "Tech:".dimmed(), project.tech.join(", ").cyan());
    }
    if let Some(ref url) = project.github {
        println!("  {}  {}", "GitHub:".dimmed(), url);
    }
    if let Some(ref url) = project.live {
        println!("  {}  {}", "Live:".dimmed(), url);
    }
    if let Some(embed) = project.embed_link() {
        println!("  {}  {}", "Diagram link:".dimmed(), embed);
    }
    match project.diagram_scene {
        Some(ref scene) => println!(
            "  {}  {} element{}",
            "Diagram:".dimmed(),
            scene.elements.len().to_string().green(),
            if scene.elements.len() == 1 { "" } else { "s" }
        ),
        None => println!("  {}  {}", "Diagram:".dimmed(), "none".dimmed()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// add / edit / delete
// ---------------------------------------------------------------------------

fn cmd_add<S: KeyValueStore>(
    repo: &mut ProjectRepository<S>,
    input: CreateProjectInput,
    json: bool,
) -> Result<()> {
    validate_create_input(&input)?;
    let project = repo.create(input);

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        println!(
            "{} {} ({})",
            "Added:".green(),
            project.title,
            project.id.cyan()
        );
    }
    Ok(())
}

fn cmd_edit<S: KeyValueStore>(
    repo: &mut ProjectRepository<S>,
    id: &str,
    input: &UpdateProjectInput,
) -> Result<()> {
    if input.is_empty() {
        anyhow::bail!("nothing to change. Pass at least one field flag, e.g. --title.");
    }
    if repo.get(id).is_none() {
        return Err(project_not_found(id));
    }
    let project = repo.update(id, input)?;
    println!(
        "{} {} ({})",
        "Updated:".green(),
        project.title,
        project.id.cyan()
    );
    Ok(())
}

fn cmd_delete<S: KeyValueStore>(
    repo: &mut ProjectRepository<S>,
    id: &str,
    confirm: bool,
) -> Result<()> {
    let title = repo
        .get(id)
        .map(|p| p.title.clone())
        .ok_or_else(|| project_not_found(id))?;
    if !confirm {
        anyhow::bail!("delete requires --confirm. This removes '{title}' and its diagram.");
    }
    repo.delete(id)?;
    println!("{} {} ({})", "Deleted:".red(), title, id.cyan());
    Ok(())
}

// ---------------------------------------------------------------------------
// diagrams
// ---------------------------------------------------------------------------

async fn cmd_attach<S: KeyValueStore>(
    repo: &mut ProjectRepository<S>,
    id: &str,
    path: &Path,
) -> Result<()> {
    if repo.get(id).is_none() {
        return Err(project_not_found(id));
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let scene = diagram::ingest_from_file(&bytes, &filename)?;
    let count = scene.elements.len();
    repo.attach_scene(id, scene)?;

    println!(
        "{} {} element{} to {}",
        "Attached:".green(),
        count,
        if count == 1 { "" } else { "s" },
        id.cyan()
    );
    Ok(())
}

async fn cmd_paste<S: KeyValueStore>(repo: &mut ProjectRepository<S>, id: &str) -> Result<()> {
    if repo.get(id).is_none() {
        return Err(project_not_found(id));
    }
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read scene from stdin")?;
    if text.trim().is_empty() {
        anyhow::bail!("no scene JSON on stdin");
    }

    let scene = diagram::ingest_from_text(&text)?;
    let count = scene.elements.len();
    repo.attach_scene(id, scene)?;

    println!(
        "{} {} element{} to {}",
        "Attached:".green(),
        count,
        if count == 1 { "" } else { "s" },
        id.cyan()
    );
    Ok(())
}

fn cmd_detach<S: KeyValueStore>(repo: &mut ProjectRepository<S>, id: &str) -> Result<()> {
    let project = repo.get(id).ok_or_else(|| project_not_found(id))?;
    if !project.has_diagram() {
        println!("{} has no diagram.", id.cyan());
        return Ok(());
    }
    repo.detach_scene(id)?;
    println!("{} diagram from {}", "Removed:".red(), id.cyan());
    Ok(())
}

async fn cmd_render<S: KeyValueStore>(
    repo: &ProjectRepository<S>,
    config: &FolioConfig,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let project = repo.get(id).ok_or_else(|| project_not_found(id))?;
    let scene = project
        .diagram_scene
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("{id} has no diagram. Attach one with `folio attach`."))?;
    let renderer = CommandRenderer::from_config(&config.render).ok_or_else(|| {
        anyhow::anyhow!("no renderer configured. Set render.command in .folio/config.toml.")
    })?;

    let options = RenderOptions::from(&config.render);
    let svg = match render_scene(&renderer, scene, &options).await {
        RenderOutput::Svg(svg) => svg,
        RenderOutput::Placeholder => anyhow::bail!(
            "'{}' failed to render the diagram (set FOLIO_LOG=debug for details)",
            renderer.program()
        ),
    };

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{id}.svg")));
    tokio::fs::write(&output, svg)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{} {}", "Rendered:".green(), output.display());
    Ok(())
}

fn cmd_prune<S: KeyValueStore>(repo: &ProjectRepository<S>) -> Result<()> {
    let removed = repo.prune_orphan_scenes();
    println!(
        "{} {} orphaned diagram{}",
        "Pruned".red(),
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// session
// ---------------------------------------------------------------------------

async fn cmd_login<S: KeyValueStore>(
    gate: &mut SessionGate<S>,
    identifier: &str,
    secret: Option<String>,
) -> Result<()> {
    let secret = match secret {
        Some(s) => s,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read secret from stdin")?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if !gate.login(identifier, &secret) {
        anyhow::bail!("Invalid credentials");
    }
    println!("{}", "Logged in.".green());
    Ok(())
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn cmd_status<S: KeyValueStore>(
    storage: &Storage,
    repo: &ProjectRepository<S>,
    gate: &SessionGate<S>,
    config: &FolioConfig,
) -> Result<()> {
    println!("{}", "Folio Status".bold());
    println!();

    let location = storage
        .location()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(in memory)".to_string());
    println!(
        "  {}  {} {}",
        "Storage:".dimmed(),
        storage.backend_name().cyan(),
        location.dimmed()
    );

    let stored_scenes = storage
        .keys(SCENE_KEY_PREFIX)
        .map(|k| k.len())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to count stored scenes");
            0
        });
    let with_diagram = repo.list().iter().filter(|p| p.has_diagram()).count();
    println!("  {}  {}", "Projects:".dimmed(), repo.len());
    println!(
        "  {}  {} attached, {} stored",
        "Diagrams:".dimmed(),
        with_diagram,
        stored_scenes
    );

    let session = if gate.is_authenticated() {
        "logged in".green().to_string()
    } else {
        "logged out".yellow().to_string()
    };
    println!("  {}  {}", "Session:".dimmed(), session);

    match config.render.command {
        Some(ref cmd) => println!("  {}  {}", "Renderer:".dimmed(), cmd.cyan()),
        None => println!("  {}  {}", "Renderer:".dimmed(), "not configured".dimmed()),
    }
    Ok(())
}
