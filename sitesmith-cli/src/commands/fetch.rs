//! Template inspection command

use crate::session::Session;
use anyhow::Result;
use console::style;

/// Fetch a template and print its form summary
pub struct FetchCommand {
    repo_url: String,
    branch: Option<String>,
    folder: Option<String>,
}

impl FetchCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(repo_url: String, branch: Option<String>, folder: Option<String>) -> Self {
        Self {
            repo_url,
            branch,
            folder,
        }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error for a bad repository URL or a failed fetch.
    pub async fn execute(&self) -> Result<()> {
        let session = Session::load()?;
        let source = session.source(&self.repo_url, self.branch.as_deref(), self.folder.as_deref());
        let template = session.load_template(&source).await?;

        let name = template.config.name.as_deref().unwrap_or("(unnamed)");
        println!(
            "{} {}",
            style("Template:").bold(),
            style(name).cyan().bold()
        );
        println!(
            "{} {} file(s)",
            style("Files:").bold(),
            template.files.len()
        );
        println!();

        for step in &template.config.form.steps {
            println!(
                "{} {}",
                style(format!("Step {}:", step.id)).green().bold(),
                style(&step.title).bold()
            );
            for field in &step.fields {
                let required = if field.required {
                    style(" (required)").red().to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {} {} [{}]{}",
                    style("-").dim(),
                    field.display_label(),
                    field.kind,
                    required
                );
            }
            println!();
        }

        Ok(())
    }
}
