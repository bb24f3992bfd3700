//! GitHub integration
//!
//! An explicit [`GitHubClient`] wraps the REST API calls (contents,
//! trees, repository creation, file upload); the [`fetcher`] layer
//! builds template-level operations on top of it.

pub mod client;
pub mod fetcher;

pub use client::{EntryKind, GitHubClient, GitHubUser, Repository, TreeEntry};
pub use fetcher::{RepoRef, TemplateFetcher, TemplateFile, TemplateSource};
