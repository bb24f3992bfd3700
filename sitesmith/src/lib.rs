//! Core library for sitesmith: turn a GitHub template repository plus
//! a filled-in form into a rendered website, then export it as a zip
//! archive or publish it back to GitHub.
//!
//! The pipeline is fetch (template repo and its config), collect (form
//! data validated against the config), render (placeholder
//! substitution per file kind), and deliver (archive or publish).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sitesmith::config::SitesmithConfig;
//! use sitesmith::github::{GitHubClient, TemplateFetcher, TemplateSource};
//! use sitesmith::render::process_template_files;
//! use sitesmith::form::FormData;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = SitesmithConfig::load()?;
//! let client = GitHubClient::new(&config.github);
//! let fetcher = TemplateFetcher::new(client);
//!
//! let source = TemplateSource::new("https://github.com/octocat/portfolio", "main");
//! let template_config = fetcher.fetch_config(&source).await?;
//! let files = fetcher.fetch_all_content(&source).await?;
//!
//! let mut data = FormData::new();
//! data.insert("name".to_string(), "Ada Lovelace".into());
//! let data = template_config.merge_with_defaults(&data);
//!
//! let rendered = process_template_files(&files, &data);
//! # let _ = rendered;
//! # Ok(())
//! # }
//! ```

// Configuration and observability
pub mod config;
pub mod error;
pub mod observability;

// Template pipeline
pub mod form;
pub mod github;
pub mod placeholder;
pub mod render;
pub mod template;

// Delivery and persistence
pub mod publish;
pub mod store;

// Live preview scheduling
pub mod preview;

/// Commonly used types, re-exported for convenient glob import
pub mod prelude {
    pub use crate::config::SitesmithConfig;
    pub use crate::error::SitesmithError;
    pub use crate::form::{FieldValue, FormData};
    pub use crate::github::{
        GitHubClient, RepoRef, TemplateFetcher, TemplateFile, TemplateSource,
    };
    pub use crate::placeholder::FileKind;
    pub use crate::preview::{FieldBatcher, PreviewScheduler, UpdateStrategy};
    pub use crate::publish::PublishOutcome;
    pub use crate::render::{generate_readme, process_template_files};
    pub use crate::store::Store;
    pub use crate::template::{TemplateConfig, ValidationReport};
}
