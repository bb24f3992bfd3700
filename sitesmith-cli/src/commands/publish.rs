//! GitHub publish command

use crate::session::{network_spinner, Session};
use anyhow::{bail, Result};
use console::style;
use dialoguer::Confirm;
use sitesmith::publish::{create_and_push, push_to_existing};
use sitesmith::render::process_template_files;
use sitesmith::template::validate_form;

/// Render the template and push it to a GitHub repository
pub struct PublishCommand {
    repo_url: String,
    branch: Option<String>,
    folder: Option<String>,
    repo_name: String,
    owner: Option<String>,
    existing: bool,
    description: Option<String>,
    yes: bool,
}

impl PublishCommand {
    /// Create a new command instance
    #[must_use]
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub const fn new(
        repo_url: String,
        branch: Option<String>,
        folder: Option<String>,
        repo_name: String,
        owner: Option<String>,
        existing: bool,
        description: Option<String>,
        yes: bool,
    ) -> Self {
        Self {
            repo_url,
            branch,
            folder,
            repo_name,
            owner,
            existing,
            description,
            yes,
        }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for a missing token, an invalid form, or a
    /// failed upload (carrying the partial-publish state).
    pub async fn execute(&self) -> Result<()> {
        if self.existing && self.owner.is_none() {
            bail!("--existing requires --owner");
        }

        let session = Session::load()?;
        let client = session.client()?;
        if !client.is_authenticated() {
            bail!("No GitHub token stored; run `sitesmith auth` first");
        }

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

        let target = if self.existing {
            let owner = self.owner.as_deref().unwrap_or_default();
            format!("{owner}/{}", self.repo_name)
        } else {
            format!("new repository '{}'", self.repo_name)
        };
        if !self.yes {
            let proceed = Confirm::new()
                .with_prompt(format!(
                    "Publish {} file(s) to {target}?",
                    rendered.len()
                ))
                .default(false)
                .interact()?;
            if !proceed {
                println!("{}", style("Aborted").yellow());
                return Ok(());
            }
        }

        let spinner = network_spinner("Uploading files...")?;
        let outcome = if let (true, Some(owner)) = (self.existing, self.owner.as_deref()) {
            push_to_existing(&client, &rendered, owner, &self.repo_name).await?
        } else {
            let description = self
                .description
                .clone()
                .unwrap_or_else(|| "Personal website built with sitesmith".to_string());
            create_and_push(&client, &rendered, &self.repo_name, &description).await?
        };
        spinner.finish_and_clear();

        println!(
            "{} {} file(s) to {}",
            style("✓ Published").green().bold(),
            outcome.uploaded,
            style(&outcome.repo_url).cyan().bold()
        );
        Ok(())
    }
}
