//! GitHub REST API client

use crate::config::GitHubSettings;
use crate::error::{AuthError, FetchError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

const USER_AGENT: &str = "sitesmith";

/// Authenticated GitHub user
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubUser {
    /// Account login name
    pub login: String,
    /// Numeric account id
    pub id: i64,
    /// Display name, if set
    pub name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// A repository as returned by the API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Browser URL
    pub html_url: String,
    /// Whether the repository is private
    pub private: bool,
    /// Repository description
    pub description: Option<String>,
}

/// Kind of a git tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A file
    Blob,
    /// A directory
    Tree,
    /// A submodule commit
    Commit,
    /// Anything the API adds later
    #[serde(other)]
    Other,
}

/// One entry of a recursive repository tree
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Blob size in bytes, absent for trees
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    content: Option<String>,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
}

/// GitHub REST API client
///
/// Read operations (contents, trees) work anonymously; repository
/// creation and uploads require a token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create an unauthenticated client
    #[must_use]
    pub fn new(settings: &GitHubSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach an access token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whether a token is attached
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.api_url))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn require_token(&self) -> Result<(), AuthError> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(AuthError::MissingToken)
        }
    }

    /// Fetch the authenticated user's profile
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] without a token,
    /// [`AuthError::InvalidToken`] when GitHub rejects it, or a
    /// [`FetchError`] for transport/decoding failures.
    pub async fn get_user(&self) -> Result<GitHubUser, crate::error::SitesmithError> {
        self.require_token()?;

        let response = self
            .request(reqwest::Method::GET, "/user")
            .send()
            .await
            .map_err(FetchError::from)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken.into());
        }
        let response = Self::check_status(response, "/user")?;

        let user = response
            .json()
            .await
            .map_err(|e| FetchError::Decode {
                path: "/user".to_string(),
                reason: e.to_string(),
            })?;
        Ok(user)
    }

    /// Fetch a single content entry's decoded file text
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotAFile`] when the path resolves to a
    /// directory or submodule, [`FetchError::Status`] for non-success
    /// responses, and [`FetchError::Decode`] when the base64 body
    /// cannot be decoded as UTF-8 text.
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<String, FetchError> {
        let entry = self.get_content_entry(owner, repo, path, Some(reference)).await?;

        if entry.kind != "file" {
            return Err(FetchError::NotAFile(path.to_string()));
        }
        let encoded = entry
            .content
            .ok_or_else(|| FetchError::Decode {
                path: path.to_string(),
                reason: "missing content body".to_string(),
            })?;

        decode_content(path, &encoded)
    }

    /// Fetch the full recursive tree of a reference
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for non-success responses and
    /// [`FetchError::Decode`] for malformed bodies.
    pub async fn get_repo_tree(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Vec<TreeEntry>, FetchError> {
        let path = format!("/repos/{owner}/{repo}/git/trees/{reference}");
        let response = self
            .request(reqwest::Method::GET, &path)
            .query(&[("recursive", "1")])
            .send()
            .await?;
        let response = Self::check_status(response, &path)?;

        let tree: TreeResponse = response.json().await.map_err(|e| FetchError::Decode {
            path,
            reason: e.to_string(),
        })?;
        Ok(tree.tree)
    }

    /// Create a repository for the authenticated user
    ///
    /// The repository is auto-initialized so that content uploads have
    /// a ref to build on.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] without a token,
    /// [`AuthError::InvalidToken`] when GitHub rejects it, or a
    /// [`FetchError`] otherwise.
    pub async fn create_repo(
        &self,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<Repository, crate::error::SitesmithError> {
        self.require_token()?;

        let response = self
            .request(reqwest::Method::POST, "/user/repos")
            .json(&json!({
                "name": name,
                "description": description,
                "private": private,
                "auto_init": true,
            }))
            .send()
            .await
            .map_err(FetchError::from)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken.into());
        }
        let response = Self::check_status(response, "/user/repos")?;

        let repo = response
            .json()
            .await
            .map_err(|e| FetchError::Decode {
                path: "/user/repos".to_string(),
                reason: e.to_string(),
            })?;
        Ok(repo)
    }

    /// Create or update a single file in a repository
    ///
    /// Looks up the current blob sha first so that updates to an
    /// existing path succeed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] without a token, or a
    /// [`FetchError`] for transport/status failures.
    pub async fn upload_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), crate::error::SitesmithError> {
        self.require_token()?;

        let existing_sha = match self.get_content_entry(owner, repo, path, None).await {
            Ok(entry) => Some(entry.sha),
            Err(FetchError::Status { status: 404, .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
        });
        if let (Some(sha), Some(map)) = (existing_sha, body.as_object_mut()) {
            map.insert("sha".to_string(), json!(sha));
        }

        let api_path = format!("/repos/{owner}/{repo}/contents/{path}");
        let response = self
            .request(reqwest::Method::PUT, &api_path)
            .json(&body)
            .send()
            .await
            .map_err(FetchError::from)?;
        Self::check_status(response, &api_path)?;

        Ok(())
    }

    /// List the authenticated user's repositories, most recently
    /// updated first
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] without a token, or a
    /// [`FetchError`] for transport/status failures.
    pub async fn list_repositories(
        &self,
    ) -> Result<Vec<Repository>, crate::error::SitesmithError> {
        self.require_token()?;

        let response = self
            .request(reqwest::Method::GET, "/user/repos")
            .query(&[("sort", "updated"), ("per_page", "100")])
            .send()
            .await
            .map_err(FetchError::from)?;
        let response = Self::check_status(response, "/user/repos")?;

        let repos = response
            .json()
            .await
            .map_err(|e| FetchError::Decode {
                path: "/user/repos".to_string(),
                reason: e.to_string(),
            })?;
        Ok(repos)
    }

    async fn get_content_entry(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<ContentEntry, FetchError> {
        let api_path = format!("/repos/{owner}/{repo}/contents/{path}");
        let mut builder = self.request(reqwest::Method::GET, &api_path);
        if let Some(reference) = reference {
            builder = builder.query(&[("ref", reference)]);
        }

        let response = builder.send().await?;
        let response = Self::check_status(response, &api_path)?;

        response.json().await.map_err(|e| FetchError::Decode {
            path: api_path,
            reason: e.to_string(),
        })
    }

    fn check_status(
        response: reqwest::Response,
        path: &str,
    ) -> Result<reqwest::Response, FetchError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            })
        }
    }
}

/// Decode a base64 contents body (which GitHub wraps with newlines)
fn decode_content(path: &str, encoded: &str) -> Result<String, FetchError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
