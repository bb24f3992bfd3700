//! Zip export command

use crate::session::Session;
use anyhow::{bail, Context, Result};
use console::style;
use sitesmith::render::archive::{archive_file_name, pack_archive};
use sitesmith::render::{generate_readme, process_template_files};
use sitesmith::template::validate_form;
use std::fs;
use std::path::PathBuf;

/// Render the template with the saved draft and write a zip archive
pub struct ExportCommand {
    repo_url: String,
    branch: Option<String>,
    folder: Option<String>,
    output: Option<PathBuf>,
}

impl ExportCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(
        repo_url: String,
        branch: Option<String>,
        folder: Option<String>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            repo_url,
            branch,
            folder,
            output,
        }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for a failed fetch, an invalid form, or a
    /// failed archive write.
    pub async fn execute(&self) -> Result<()> {
        let session = Session::load()?;
        let source = session.source(&self.repo_url, self.branch.as_deref(), self.folder.as_deref());
        let template = session.load_template(&source).await?;
        let id = session.template_id(&self.repo_url)?;

        let draft = session.store.draft(&id)?.unwrap_or_default();
        let data = template.config.merge_with_defaults(&draft);

        let report = validate_form(&data, &template.config.form);
        if !report.is_valid {
            for (field, message) in &report.errors {
                println!("  {}: {}", style(field).bold(), style(message).red());
            }
            bail!("Form data is incomplete; run `sitesmith form` first");
        }

        let rendered = process_template_files(&template.files, &data);
        let readme = generate_readme(template.config.name.as_deref(), &data);
        let bytes = pack_archive(&rendered, &readme)?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(archive_file_name(&data)));
        fs::write(&output, &bytes)
            .with_context(|| format!("Failed to write archive: {}", output.display()))?;

        println!(
            "{} {} ({} file(s), {} bytes)",
            style("✓ Exported").green().bold(),
            style(output.display()).cyan().bold(),
            rendered.len(),
            bytes.len()
        );
        Ok(())
    }
}
