//! Shared command context
//!
//! Every subcommand needs the same trio: loaded configuration, the
//! on-disk store, and a GitHub client carrying the stored token. The
//! session also owns the TTL-cached template load so `fetch`, `form`,
//! `export` and `publish` all hit the cache the same way.

use crate::token;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use sitesmith::config::SitesmithConfig;
use sitesmith::github::{GitHubClient, RepoRef, TemplateFetcher, TemplateFile, TemplateSource};
use sitesmith::store::Store;
use sitesmith::template::TemplateConfig;
use std::time::Duration;

/// A fetched template, as cached on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Normalized template configuration
    pub config: TemplateConfig,
    /// Template file contents
    pub files: Vec<TemplateFile>,
}

/// Configuration, store and authenticated client for one invocation
pub struct Session {
    /// Loaded configuration
    pub config: SitesmithConfig,
    /// On-disk store for cache, drafts and the token
    pub store: Store,
}

impl Session {
    /// Load configuration and open the default store
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is malformed or the
    /// store directory cannot be created.
    pub fn load() -> Result<Self> {
        let config = SitesmithConfig::load().context("Failed to load configuration")?;
        let store = Store::open_default().context("Failed to open data store")?;
        Ok(Self { config, store })
    }

    /// Build a GitHub client, attaching the stored token when present
    ///
    /// # Errors
    ///
    /// Returns an error when the stored token cannot be read.
    pub fn client(&self) -> Result<GitHubClient> {
        let client = GitHubClient::new(&self.config.github);
        Ok(match token::load(&self.store)? {
            Some(token) => client.with_token(token),
            None => client,
        })
    }

    /// Build a template source from CLI arguments
    #[must_use]
    pub fn source(&self, repo_url: &str, branch: Option<&str>, folder: Option<&str>) -> TemplateSource {
        let branch = branch.unwrap_or(&self.config.github.default_branch);
        let source = TemplateSource::new(repo_url, branch);
        match folder {
            Some(folder) => source.in_folder(folder),
            None => source,
        }
    }

    /// Fetch a template's config and files, consulting the TTL cache
    ///
    /// # Errors
    ///
    /// Returns an error for a bad repository URL or a failed tree
    /// fetch. Per-file failures degrade to omission inside the fetch.
    pub async fn load_template(&self, source: &TemplateSource) -> Result<Template> {
        let id = template_id(&source.repo_url)?;

        if let Some(template) = self.store.cached_template::<Template>(&id)? {
            println!(
                "{} {}",
                style("Using cached template").dim(),
                style(&id).dim().bold()
            );
            return Ok(template);
        }

        let spinner = network_spinner("Fetching template...")?;
        let fetcher = TemplateFetcher::new(self.client()?);
        let config = fetcher.fetch_config(source).await?;
        spinner.set_message("Downloading template files...");
        let files = fetcher.fetch_all_content(source).await?;
        spinner.finish_and_clear();

        let template = Template { config, files };
        let ttl = Duration::from_secs(self.config.cache.ttl_hours * 3600);
        self.store.cache_template(&id, &template, ttl)?;
        Ok(template)
    }

    /// Stable store id for a template repository
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is not a GitHub repository URL.
    pub fn template_id(&self, repo_url: &str) -> Result<String> {
        template_id(repo_url)
    }
}

fn template_id(repo_url: &str) -> Result<String> {
    let repo = RepoRef::parse(repo_url)?;
    Ok(format!("{}/{}", repo.owner, repo.repo))
}

/// Spinner for network phases, styled like the rest of the CLI
///
/// # Errors
///
/// Returns an error when the progress template is invalid.
pub fn network_spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Failed to set progress style")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_from_url() {
        assert_eq!(
            template_id("https://github.com/octocat/portfolio").unwrap(),
            "octocat/portfolio"
        );
        assert!(template_id("https://example.com/nope").is_err());
    }
}
