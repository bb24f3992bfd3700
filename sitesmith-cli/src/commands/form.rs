//! Interactive form filling with live preview
//!
//! Each accepted answer is saved to the draft and fed through the
//! batcher/scheduler pair, so the preview directory re-renders after a
//! quiet period instead of on every answer.

use crate::session::{Session, Template};
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use parking_lot::Mutex;
use sitesmith::form::{FieldValue, FormData};
use sitesmith::preview::{FieldBatcher, PreviewScheduler, UpdateStrategy};
use sitesmith::render::process_template_files;
use sitesmith::template::{validate_field, validate_form, FieldKind, FieldSpec};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Fill in a template's form interactively
pub struct FormCommand {
    repo_url: String,
    branch: Option<String>,
    folder: Option<String>,
    preview_dir: PathBuf,
}

impl FormCommand {
    /// Create a new command instance
    #[must_use]
    pub fn new(
        repo_url: String,
        branch: Option<String>,
        folder: Option<String>,
        preview_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            repo_url,
            branch,
            folder,
            preview_dir: preview_dir.unwrap_or_else(|| PathBuf::from(".sitesmith-preview")),
        }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for a failed fetch, a store failure, or an
    /// interrupted prompt.
    pub async fn execute(&self) -> Result<()> {
        let session = Session::load()?;
        let source = session.source(&self.repo_url, self.branch.as_deref(), self.folder.as_deref());
        let template = session.load_template(&source).await?;
        let id = session.template_id(&self.repo_url)?;

        let draft = session.store.draft(&id)?.unwrap_or_default();
        if !draft.is_empty() {
            println!("{}", style("Resuming from saved draft").dim());
        }
        let mut data = template.config.merge_with_defaults(&draft);

        let (batcher, scheduler) =
            preview_pipeline(&session, &template, &self.preview_dir, data.clone());

        // pre-render the preview with the starting values
        scheduler.queue_update(data.clone());

        for step in &template.config.form.steps {
            println!();
            println!(
                "{} {}",
                style(format!("Step {}:", step.id)).green().bold(),
                style(&step.title).bold()
            );
            for field in &step.fields {
                let value = prompt_field(field, data.get(&field.name))?;
                data.insert(field.name.clone(), value.clone());
                session.store.save_draft(&id, &data)?;
                batcher.batch_update(field.name.clone(), value);
            }
        }

        batcher.flush();
        scheduler.force_update();

        let report = validate_form(&data, &template.config.form);
        if report.is_valid {
            println!();
            println!("{}", style("✓ Form complete").green().bold());
            println!(
                "Preview rendered to {}",
                style(self.preview_dir.display()).cyan()
            );
        } else {
            println!();
            println!("{}", style("Form has validation errors:").red().bold());
            for (field, message) in &report.errors {
                println!("  {field}: {message}");
            }
        }
        Ok(())
    }
}

/// Wire a batcher into a scheduler that re-renders the preview directory
fn preview_pipeline(
    session: &Session,
    template: &Template,
    preview_dir: &Path,
    initial: FormData,
) -> (FieldBatcher, Arc<PreviewScheduler>) {
    let files = template.files.clone();
    let dir = preview_dir.to_path_buf();
    let scheduler = Arc::new(PreviewScheduler::new(
        UpdateStrategy::Debounced(Duration::from_millis(session.config.preview.debounce_ms)),
        move |data: &FormData| {
            if let Err(e) = write_preview(&dir, &files, data) {
                warn!(error = %e, "preview render failed");
            }
        },
    ));

    let accumulated = Arc::new(Mutex::new(initial));
    let queue_target = Arc::clone(&scheduler);
    let batcher = FieldBatcher::new(
        Duration::from_millis(session.config.preview.batch_window_ms),
        move |updates: FormData| {
            let mut merged = accumulated.lock();
            merged.extend(updates);
            queue_target.queue_update(merged.clone());
        },
    );
    (batcher, scheduler)
}

fn write_preview(dir: &Path, files: &[sitesmith::github::TemplateFile], data: &FormData) -> Result<()> {
    for file in process_template_files(files, data) {
        let path = dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write preview file: {}", path.display()))?;
    }
    Ok(())
}

/// Prompt for one field, re-prompting until the value validates
fn prompt_field(spec: &FieldSpec, current: Option<&FieldValue>) -> Result<FieldValue> {
    loop {
        let value = read_value(spec, current)?;
        let errors = validate_field(Some(&value), spec);
        if errors.is_empty() {
            return Ok(value);
        }
        for message in errors {
            println!("  {}", style(message).red());
        }
    }
}

fn read_value(spec: &FieldSpec, current: Option<&FieldValue>) -> Result<FieldValue> {
    let label = spec.display_label();
    match spec.kind {
        FieldKind::Checkbox => {
            let default = matches!(current, Some(FieldValue::Flag(true)));
            let answer = Confirm::new()
                .with_prompt(label)
                .default(default)
                .interact()?;
            Ok(FieldValue::Flag(answer))
        }
        FieldKind::Select => {
            let options = spec.options.clone().unwrap_or_default();
            if options.is_empty() {
                return read_text(label, current);
            }
            let default = current
                .and_then(FieldValue::as_text)
                .and_then(|text| options.iter().position(|o| o == text))
                .unwrap_or(0);
            let index = Select::new()
                .with_prompt(label)
                .items(&options)
                .default(default)
                .interact()?;
            Ok(FieldValue::Text(options[index].clone()))
        }
        FieldKind::Array => read_list(spec, label),
        FieldKind::Number => {
            let text: String = Input::new()
                .with_prompt(label)
                .allow_empty(true)
                .interact_text()?;
            if text.trim().is_empty() {
                return Ok(FieldValue::Null);
            }
            // keep the raw text when it does not parse; validation reports it
            Ok(text
                .trim()
                .parse::<f64>()
                .map_or_else(|_| FieldValue::Text(text), FieldValue::Number))
        }
        FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Textarea => {
            read_text(label, current)
        }
    }
}

fn read_text(label: &str, current: Option<&FieldValue>) -> Result<FieldValue> {
    let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
    if let Some(text) = current.and_then(FieldValue::as_text) {
        if !text.is_empty() {
            input = input.default(text.to_string());
        }
    }
    let answer = input.interact_text()?;
    if answer.trim().is_empty() {
        Ok(FieldValue::Null)
    } else {
        Ok(FieldValue::Text(answer))
    }
}

fn read_list(spec: &FieldSpec, label: &str) -> Result<FieldValue> {
    let cap = spec.max_items.unwrap_or(usize::MAX);
    println!(
        "{} {}",
        style(label).bold(),
        style("(one entry per line, empty line to finish)").dim()
    );
    let mut items = Vec::new();
    while items.len() < cap {
        let entry: String = Input::new()
            .with_prompt(format!("  {}", items.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        if entry.trim().is_empty() {
            break;
        }
        items.push(entry);
    }
    Ok(FieldValue::List(items))
}
