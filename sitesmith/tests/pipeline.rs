//! Integration tests for the template pipeline
//!
//! Exercises the flow a command would drive: parse a template config,
//! merge form data with defaults, validate, render, and pack, plus the
//! edit-coalescing path from batcher to scheduler to renderer.

use parking_lot::Mutex;
use serde_json::json;
use sitesmith::form::{FieldValue, FormData};
use sitesmith::github::TemplateFile;
use sitesmith::preview::{FieldBatcher, PreviewScheduler, UpdateStrategy};
use sitesmith::render::archive::pack_archive;
use sitesmith::render::{generate_readme, process_template_files};
use sitesmith::store::Store;
use sitesmith::template::{validate_form, TemplateConfig};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn portfolio_config() -> TemplateConfig {
    let raw = json!({
        "name": "Minimal Portfolio",
        "formConfig": {
            "steps": [
                {
                    "title": "About You",
                    "fields": [
                        { "name": "name", "label": "Name", "type": "text", "required": true },
                        { "name": "email", "label": "Email", "type": "email", "required": true },
                        { "name": "tagline", "type": "text", "default": "Building things" },
                        { "name": "skills", "type": "array" }
                    ]
                }
            ]
        }
    });
    TemplateConfig::parse(&raw).unwrap()
}

fn portfolio_files() -> Vec<TemplateFile> {
    let file = |path: &str, content: &str| TemplateFile {
        path: path.to_string(),
        original_path: path.to_string(),
        content: content.to_string(),
        size: None,
    };
    vec![
        file(
            "index.html",
            "<h1>{{name}}</h1><p>{{tagline}}</p><ul>{{skills}}</ul>",
        ),
        file("js/app.js", "const skills = {{skills}};\nconst who = \"{{user.name}}\";"),
        file("logo.png", "{{name}} stays as-is in opaque files"),
    ]
}

fn filled_form(config: &TemplateConfig) -> FormData {
    let mut data = FormData::new();
    data.insert("name".to_string(), "Ada Lovelace".into());
    data.insert("email".to_string(), "ada@example.com".into());
    data.insert(
        "skills".to_string(),
        FieldValue::List(vec!["Rust".to_string(), "Math".to_string()]),
    );
    config.merge_with_defaults(&data)
}

#[test]
fn test_config_to_archive_flow() {
    let config = portfolio_config();
    let data = filled_form(&config);

    // defaults flow in where the user said nothing
    assert_eq!(
        data.get("tagline"),
        Some(&FieldValue::Text("Building things".to_string()))
    );

    let report = validate_form(&data, &config.form);
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);

    let rendered = process_template_files(&portfolio_files(), &data);
    let by_path = |path: &str| {
        rendered
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
            .unwrap()
    };

    assert_eq!(
        by_path("index.html"),
        "<h1>Ada Lovelace</h1><p>Building things</p><ul>Rust, Math</ul>"
    );
    assert_eq!(
        by_path("js/app.js"),
        "const skills = [\"Rust\",\"Math\"];\nconst who = \"Ada Lovelace\";"
    );
    assert_eq!(
        by_path("logo.png"),
        "{{name}} stays as-is in opaque files"
    );

    let readme = generate_readme(config.name.as_deref(), &data);
    assert!(readme.contains("Ada Lovelace"));
    assert!(readme.contains("Minimal Portfolio"));

    let bytes = pack_archive(&rendered, &readme).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 4);
    let mut content = String::new();
    archive
        .by_name("README.md")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, readme);
}

#[test]
fn test_missing_required_field_blocks_the_flow() {
    let config = portfolio_config();
    let mut data = FormData::new();
    data.insert("name".to_string(), "Ada".into());
    let data = config.merge_with_defaults(&data);

    let report = validate_form(&data, &config.form);
    assert!(!report.is_valid);
    assert_eq!(
        report.errors.get("email").map(String::as_str),
        Some("Email is required")
    );
}

#[test]
fn test_draft_survives_a_second_session() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let config = portfolio_config();
    let data = filled_form(&config);

    store.save_draft("octocat/portfolio", &data).unwrap();

    // a later invocation opens the same directory
    let reopened = Store::open(dir.path()).unwrap();
    assert_eq!(reopened.draft("octocat/portfolio").unwrap(), Some(data));
}

#[tokio::test(start_paused = true)]
async fn test_edit_burst_renders_once() {
    const WINDOW: Duration = Duration::from_millis(50);
    const DELAY: Duration = Duration::from_millis(1000);

    let config = portfolio_config();
    let files = portfolio_files();

    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    let scheduler = Arc::new(PreviewScheduler::new(
        UpdateStrategy::Debounced(DELAY),
        move |data: &FormData| {
            sink.lock().push(process_template_files(&files, data));
        },
    ));

    let accumulated = Arc::new(Mutex::new(config.default_values()));
    let queue_target = Arc::clone(&scheduler);
    let batcher = FieldBatcher::new(WINDOW, move |updates: FormData| {
        let mut merged = accumulated.lock();
        merged.extend(updates);
        queue_target.queue_update(merged.clone());
    });

    // a burst of keystrokes across two fields
    batcher.batch_update("name", "A".into());
    batcher.batch_update("name", "Ada".into());
    batcher.batch_update("email", "ada@example.com".into());

    tokio::time::sleep(WINDOW + DELAY + Duration::from_millis(2)).await;

    let renders = renders.lock();
    assert_eq!(renders.len(), 1, "burst must coalesce into one render");
    let index = renders[0].iter().find(|f| f.path == "index.html").unwrap();
    assert!(index.content.contains("<h1>Ada</h1>"));
    assert_eq!(scheduler.update_count(), 1);
}
