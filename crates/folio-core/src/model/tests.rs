use serde_json::json;

use crate::model::project::{validate_create_input, MAX_TITLE_LENGTH};
use crate::model::*;

fn sample_input() -> CreateProjectInput {
    CreateProjectInput {
        title: "SocialHub".into(),
        subtitle: "Event-Driven Social Platform".into(),
        description: "Kafka-backed microservices".into(),
        tech: vec!["Kafka".into(), "Redis".into()],
        github: Some("https://github.com/example/socialhub".into()),
        live: None,
        date: "Aug 2025".into(),
        highlights: vec!["500+ msg/sec".into()],
        color: ProjectColor::Cyan,
        excalidraw_link: None,
    }
}

#[test]
fn test_project_from_input() {
    let project = Project::from_input("p1", sample_input());
    assert_eq!(project.id, "p1");
    assert_eq!(project.title, "SocialHub");
    assert_eq!(project.tech, vec!["Kafka", "Redis"]);
    assert_eq!(project.color, ProjectColor::Cyan);
    assert!(project.diagram_scene.is_none());
}

#[test]
fn test_project_serializes_camel_case() {
    let mut project = Project::new("p1", "X");
    project.excalidraw_link = Some("https://excalidraw.com/#json=abc".into());
    project.diagram_scene = Some(Scene::new(vec![json!({"type": "rectangle", "id": "a"})]));

    let value = serde_json::to_value(&project).unwrap();
    assert!(value.get("excalidrawLink").is_some());
    assert!(value.get("diagramScene").is_some());
    assert!(value.get("github").is_none(), "absent URLs are skipped");
}

#[test]
fn test_slim_drops_scene_only() {
    let mut project = Project::new("p1", "X").with_date("Jan 2025");
    project.diagram_scene = Some(Scene::new(vec![json!({"id": "e1"})]));

    let slim = project.slim();
    assert!(slim.diagram_scene.is_none());
    assert_eq!(slim.title, project.title);
    assert_eq!(slim.date, project.date);
}

#[test]
fn test_project_empty_urls_read_as_absent() {
    let raw = json!({
        "id": "2",
        "title": "SocialHub",
        "github": "https://github.com/example/",
        "live": "",
        "excalidraw": "",
        "color": "cyan"
    });
    let project: Project = serde_json::from_value(raw).unwrap();
    assert_eq!(project.github.as_deref(), Some("https://github.com/example/"));
    assert!(project.live.is_none());
    assert!(project.excalidraw_link.is_none());
}

#[test]
fn test_project_reads_legacy_scene_key() {
    let raw = json!({
        "id": "1",
        "title": "VerifyDev",
        "excalidrawScene": {"elements": [{"id": "a"}]}
    });
    let project: Project = serde_json::from_value(raw).unwrap();
    let scene = project.diagram_scene.expect("scene should be read");
    assert_eq!(scene.elements, vec![json!({"id": "a"})]);
}

#[test]
fn test_color_roundtrip() {
    for color in ProjectColor::ALL {
        let s = color.to_string();
        let parsed: ProjectColor = s.parse().unwrap();
        assert_eq!(color, parsed);
    }
}

#[test]
fn test_unknown_color_falls_back_to_default() {
    let project: Project =
        serde_json::from_value(json!({"id": "1", "title": "t", "color": "chartreuse"})).unwrap();
    assert_eq!(project.color, ProjectColor::Orange);

    let missing: Project = serde_json::from_value(json!({"id": "1", "title": "t"})).unwrap();
    assert_eq!(missing.color, ProjectColor::default());

    assert_eq!(ProjectColor::parse_lenient("Emerald"), ProjectColor::Emerald);
    assert_eq!(ProjectColor::parse_lenient("nope"), ProjectColor::Orange);
}

#[test]
fn test_color_palette() {
    assert_eq!(ProjectColor::Purple.palette().accent, "#8b5cf6");
    assert_eq!(ProjectColor::Orange.palette().accent, "#f97316");
    assert!(ProjectColor::Cyan.palette().border.starts_with("rgba("));
}

#[test]
fn test_update_applies_only_listed_fields() {
    let before = Project::from_input("p1", sample_input());
    let mut after = before.clone();
    UpdateProjectInput::title("Renamed").apply_to(&mut after);

    assert_eq!(after.title, "Renamed");
    assert_eq!(after.id, before.id);
    assert_eq!(after.subtitle, before.subtitle);
    assert_eq!(after.description, before.description);
    assert_eq!(after.tech, before.tech);
    assert_eq!(after.github, before.github);
    assert_eq!(after.highlights, before.highlights);
    assert_eq!(after.color, before.color);
}

#[test]
fn test_update_can_clear_optional_fields() {
    let mut project = Project::from_input("p1", sample_input());
    project.diagram_scene = Some(Scene::default());

    let input = UpdateProjectInput {
        github: Some(None),
        diagram_scene: Some(None),
        ..Default::default()
    };
    input.apply_to(&mut project);

    assert!(project.github.is_none());
    assert!(project.diagram_scene.is_none());
}

#[test]
fn test_update_input_is_empty() {
    assert!(UpdateProjectInput::default().is_empty());
    assert!(!UpdateProjectInput::title("x").is_empty());
}

#[test]
fn test_split_tech() {
    assert_eq!(
        split_tech("Node.js, Kafka,  Redis ,,"),
        vec!["Node.js", "Kafka", "Redis"]
    );
    assert!(split_tech("").is_empty());
}

#[test]
fn test_split_highlights() {
    assert_eq!(
        split_highlights("500+ msg/sec\n\n  60% DB load reduction  \n"),
        vec!["500+ msg/sec", "60% DB load reduction"]
    );
}

#[test]
fn test_embed_url() {
    assert_eq!(
        embed_url("https://excalidraw.com/#json=abc,def"),
        "https://excalidraw.com/embed/#json=abc,def"
    );
    assert_eq!(
        embed_url("https://example.com/diagram.svg"),
        "https://example.com/diagram.svg"
    );
}

#[test]
fn test_validate_create_input() {
    assert!(validate_create_input(&sample_input()).is_ok());

    let mut blank = sample_input();
    blank.title = "   ".into();
    assert!(validate_create_input(&blank).is_err());

    let mut no_desc = sample_input();
    no_desc.description.clear();
    assert!(validate_create_input(&no_desc).is_err());

    let mut long = sample_input();
    long.title = "x".repeat(MAX_TITLE_LENGTH + 1);
    assert!(validate_create_input(&long).is_err());
}

#[test]
fn test_scene_defaults_missing_sections() {
    let scene: Scene = serde_json::from_value(json!({"type": "excalidraw"})).unwrap();
    assert!(scene.elements.is_empty());
    assert!(scene.app_state.is_empty());
    assert!(scene.files.is_empty());
    assert_eq!(scene.extra.get("type"), Some(&json!("excalidraw")));
}

#[test]
fn test_scene_null_files_default() {
    let scene: Scene =
        serde_json::from_value(json!({"elements": [], "appState": null, "files": null})).unwrap();
    assert!(scene.app_state.is_empty());
    assert!(scene.files.is_empty());
}

#[test]
fn test_scene_preserves_unknown_keys() {
    let raw = json!({
        "type": "excalidraw",
        "version": 2,
        "source": "https://excalidraw.com",
        "elements": [{"type": "rectangle", "id": "a", "customData": {"k": [1, 2]}}],
        "appState": {"zoom": 2, "gridSize": null},
        "files": {"f1": {"mimeType": "image/png", "dataURL": "data:image/png;base64,AAAA"}}
    });
    let scene: Scene = serde_json::from_value(raw.clone()).unwrap();
    let back = serde_json::to_value(&scene).unwrap();
    assert_eq!(back, raw);
}

#[test]
fn test_render_app_state_forces_export_options() {
    let mut state = serde_json::Map::new();
    state.insert("zoom".into(), json!(2));
    state.insert("theme".into(), json!("dark"));
    state.insert("exportBackground".into(), json!(false));
    let scene = Scene::default().with_app_state(state);

    let rendered = scene.render_app_state();
    assert_eq!(rendered["zoom"], json!(2));
    assert_eq!(rendered["exportBackground"], json!(true));
    assert_eq!(rendered["exportWithDarkMode"], json!(false));
    assert_eq!(rendered["theme"], json!("light"));
    // The stored scene is untouched.
    assert_eq!(scene.app_state["theme"], json!("dark"));
}

#[test]
fn test_seed_projects_order() {
    let seeds = seed_projects();
    let ids: Vec<&str> = seeds.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(seeds.iter().all(|p| p.diagram_scene.is_none()));
    assert_eq!(seeds[1].title, "SocialHub");
}
