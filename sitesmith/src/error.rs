//! Error types and error handling

use thiserror::Error;

/// Template configuration error
///
/// Raised while normalizing a fetched `template.config.json`. Callers that
/// fetch configs remotely recover from this locally by falling back to
/// [`crate::template::TemplateConfig::fallback`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config document has no `formConfig.steps` array
    #[error("invalid template config: missing formConfig.steps")]
    MissingSteps,

    /// The config document is not structured as expected
    #[error("invalid template config: {0}")]
    Malformed(String),
}

/// Remote fetch error (GitHub API)
#[derive(Debug, Error)]
pub enum FetchError {
    /// The given URL is not a GitHub repository URL
    #[error("invalid GitHub repository URL: {0}")]
    InvalidRepoUrl(String),

    /// The remote returned a non-success status
    #[error("GitHub API returned {status} for {path}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request path that failed
        path: String,
    },

    /// The request could not be performed
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The requested path resolved to something other than a file
    #[error("path is not a file: {0}")]
    NotAFile(String),

    /// The response body could not be decoded
    #[error("malformed response for {path}: {reason}")]
    Decode {
        /// Request path whose response was malformed
        path: String,
        /// What went wrong while decoding
        reason: String,
    },
}

/// Authentication error
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token is configured for an operation that requires one
    #[error("not authenticated")]
    MissingToken,

    /// The remote rejected the configured token
    #[error("token rejected by GitHub")]
    InvalidToken,
}

/// Publish failure, carrying the partial-publish state.
///
/// Uploads are sequential and fail-fast: `uploaded` files were confirmed
/// before `path` failed, and no later file was attempted. There is no
/// automatic rollback; the remote repository is left partially populated.
#[derive(Debug, Error)]
#[error("publish failed at '{path}' after {uploaded} uploaded file(s): {source}")]
pub struct PublishError {
    /// Path of the file whose upload failed
    pub path: String,
    /// Number of files confirmed uploaded before the failure
    pub uploaded: usize,
    /// Underlying fetch/auth failure
    #[source]
    pub source: SitesmithError,
}

/// Local store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be (de)serialized
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Archive packaging error
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Zip writer failure
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Filesystem failure while writing the archive
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library error type
#[derive(Debug, Error)]
pub enum SitesmithError {
    /// Template configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Authentication error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Publish error
    #[error("Publish error: {0}")]
    Publish(#[from] Box<PublishError>),

    /// Local store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Archive packaging error
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}
