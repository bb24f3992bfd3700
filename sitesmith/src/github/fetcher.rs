//! Template fetching
//!
//! Resolves a GitHub repository URL into a normalized template: the
//! parsed `template.config.json` (or the built-in fallback) and the
//! filtered file tree with contents.

use crate::error::{FetchError, SitesmithError};
use crate::github::client::{EntryKind, GitHubClient, TreeEntry};
use crate::template::TemplateConfig;
use futures_util::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("repo url pattern is valid")
});

const CONFIG_FILE: &str = "template.config.json";

/// Directories never treated as template content
const EXCLUDED_SEGMENTS: [&str; 4] = ["node_modules", ".next", "dist", "build"];

/// Owner/repo pair extracted from a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Extract owner and repository name from a GitHub URL
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRepoUrl`] when the URL does not
    /// contain a `github.com/<owner>/<repo>` segment.
    pub fn parse(repo_url: &str) -> Result<Self, FetchError> {
        let caps = REPO_URL
            .captures(repo_url)
            .ok_or_else(|| FetchError::InvalidRepoUrl(repo_url.to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].trim_end_matches(".git").to_string(),
        })
    }
}

/// Where a template lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// GitHub repository URL
    pub repo_url: String,
    /// Branch or ref to read from
    pub branch: String,
    /// Optional subfolder holding the template
    pub folder: Option<String>,
}

impl TemplateSource {
    /// A source reading the given repository at the given branch
    #[must_use]
    pub fn new(repo_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
            folder: None,
        }
    }

    /// Restrict the source to a subfolder of the repository
    #[must_use]
    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    fn config_path(&self) -> String {
        self.folder.as_ref().map_or_else(
            || CONFIG_FILE.to_string(),
            |folder| format!("{folder}/{CONFIG_FILE}"),
        )
    }
}

/// A fetched template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Path shown to the user, with any source subfolder stripped
    pub path: String,
    /// Path within the source repository
    pub original_path: String,
    /// Decoded file text
    pub content: String,
    /// Blob size in bytes as reported by the tree
    pub size: Option<u64>,
}

/// Template-level operations over a [`GitHubClient`]
#[derive(Debug, Clone)]
pub struct TemplateFetcher {
    client: GitHubClient,
}

impl TemplateFetcher {
    /// Wrap a client
    #[must_use]
    pub const fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Fetch and normalize the template's config document
    ///
    /// A template without a readable `template.config.json` is still
    /// usable: any failure past URL parsing falls back to
    /// [`TemplateConfig::fallback`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRepoUrl`] when the source URL is
    /// not a GitHub repository URL.
    pub async fn fetch_config(
        &self,
        source: &TemplateSource,
    ) -> Result<TemplateConfig, SitesmithError> {
        let repo = RepoRef::parse(&source.repo_url)?;
        let config_path = source.config_path();

        let raw = match self
            .client
            .get_file_content(&repo.owner, &repo.repo, &config_path, &source.branch)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %config_path, error = %e, "template config not found, using defaults");
                return Ok(TemplateConfig::fallback());
            }
        };

        match serde_json::from_str(&raw).map_err(|e| e.to_string()).and_then(|value| {
            TemplateConfig::parse(&value).map_err(|e| e.to_string())
        }) {
            Ok(config) => Ok(config),
            Err(reason) => {
                warn!(path = %config_path, %reason, "malformed template config, using defaults");
                Ok(TemplateConfig::fallback())
            }
        }
    }

    /// List the template's files, excluding VCS metadata and
    /// dependency/build directories
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRepoUrl`] for a bad source URL and
    /// any [`FetchError`] from the tree request.
    pub async fn fetch_files(
        &self,
        source: &TemplateSource,
    ) -> Result<Vec<TreeEntry>, SitesmithError> {
        let repo = RepoRef::parse(&source.repo_url)?;
        let tree = self
            .client
            .get_repo_tree(&repo.owner, &repo.repo, &source.branch)
            .await
            .map_err(SitesmithError::from)?;

        let files: Vec<TreeEntry> = tree
            .into_iter()
            .filter(|entry| is_template_entry(entry, source.folder.as_deref()))
            .collect();
        debug!(count = files.len(), "filtered template tree");
        Ok(files)
    }

    /// Fetch every template file's content concurrently
    ///
    /// Individual file failures are logged and dropped from the result
    /// rather than aborting the whole fetch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRepoUrl`] for a bad source URL and
    /// any [`FetchError`] from the tree request.
    pub async fn fetch_all_content(
        &self,
        source: &TemplateSource,
    ) -> Result<Vec<TemplateFile>, SitesmithError> {
        let files = self.fetch_files(source).await?;
        let repo = RepoRef::parse(&source.repo_url)?;

        let fetches = files.into_iter().map(|entry| {
            let repo = repo.clone();
            async move {
                match self
                    .client
                    .get_file_content(&repo.owner, &repo.repo, &entry.path, &source.branch)
                    .await
                {
                    Ok(content) => Some(TemplateFile {
                        path: display_path(&entry.path, source.folder.as_deref()),
                        original_path: entry.path,
                        content,
                        size: entry.size,
                    }),
                    Err(e) => {
                        warn!(path = %entry.path, error = %e, "could not fetch template file");
                        None
                    }
                }
            }
        });

        Ok(join_all(fetches).await.into_iter().flatten().collect())
    }
}

fn is_template_entry(entry: &TreeEntry, folder: Option<&str>) -> bool {
    if let Some(folder) = folder {
        if !entry.path.starts_with(&format!("{folder}/")) {
            return false;
        }
    }

    entry.kind == EntryKind::Blob
        && !entry.path.starts_with(".git")
        && !EXCLUDED_SEGMENTS
            .iter()
            .any(|segment| entry.path.contains(segment))
}

fn display_path(path: &str, folder: Option<&str>) -> String {
    folder
        .and_then(|folder| path.strip_prefix(&format!("{folder}/")))
        .unwrap_or(path)
        .to_string()
}
