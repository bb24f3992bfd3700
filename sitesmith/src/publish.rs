//! Publishing a rendered site to GitHub
//!
//! Uploads are sequential and fail-fast: parallel contents-API writes
//! race on the branch ref. A failure carries the partial-publish state
//! (which file failed, how many were confirmed before it) and performs
//! no rollback.

use crate::error::{PublishError, SitesmithError};
use crate::github::{GitHubClient, TemplateFile};
use tracing::info;

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Browser URL of the repository
    pub repo_url: String,
    /// Repository name
    pub repo_name: String,
    /// Owner login
    pub owner: String,
    /// Number of files uploaded
    pub uploaded: usize,
}

/// Create a new repository and upload the rendered set into it
///
/// # Errors
///
/// Returns auth/fetch errors from repository creation, or a
/// [`PublishError`] when an upload fails partway.
pub async fn create_and_push(
    client: &GitHubClient,
    files: &[TemplateFile],
    repo_name: &str,
    description: &str,
) -> Result<PublishOutcome, SitesmithError> {
    let repo = client.create_repo(repo_name, description, false).await?;
    let user = client.get_user().await?;

    let uploaded = upload_all(client, files, &user.login, repo_name, "Add").await?;
    info!(repo = %repo.full_name, uploaded, "published new repository");

    Ok(PublishOutcome {
        repo_url: repo.html_url,
        repo_name: repo.name,
        owner: user.login,
        uploaded,
    })
}

/// Upload the rendered set into an existing repository
///
/// # Errors
///
/// Returns a [`PublishError`] when an upload fails partway.
pub async fn push_to_existing(
    client: &GitHubClient,
    files: &[TemplateFile],
    owner: &str,
    repo_name: &str,
) -> Result<PublishOutcome, SitesmithError> {
    let uploaded = upload_all(client, files, owner, repo_name, "Update").await?;
    info!(repo = %format!("{owner}/{repo_name}"), uploaded, "pushed to existing repository");

    Ok(PublishOutcome {
        repo_url: format!("https://github.com/{owner}/{repo_name}"),
        repo_name: repo_name.to_string(),
        owner: owner.to_string(),
        uploaded,
    })
}

async fn upload_all(
    client: &GitHubClient,
    files: &[TemplateFile],
    owner: &str,
    repo_name: &str,
    verb: &str,
) -> Result<usize, SitesmithError> {
    for (uploaded, file) in files.iter().enumerate() {
        let message = format!("{verb} {}", file.path);
        if let Err(source) = client
            .upload_file(owner, repo_name, &file.path, &file.content, &message)
            .await
        {
            return Err(Box::new(PublishError {
                path: file.path.clone(),
                uploaded,
                source,
            })
            .into());
        }
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, FetchError};

    #[test]
    fn test_publish_error_carries_partial_state() {
        let err = PublishError {
            path: "css/site.css".to_string(),
            uploaded: 1,
            source: FetchError::Status {
                status: 502,
                path: "/repos/a/b/contents/css/site.css".to_string(),
            }
            .into(),
        };

        let message = err.to_string();
        assert!(message.contains("css/site.css"));
        assert!(message.contains("1 uploaded file(s)"));
        assert!(message.contains("502"));
    }

    #[tokio::test]
    async fn test_upload_all_requires_token() {
        let client = GitHubClient::new(&crate::config::GitHubSettings::default());
        let files = vec![TemplateFile {
            path: "index.html".to_string(),
            original_path: "index.html".to_string(),
            content: "<h1>hi</h1>".to_string(),
            size: None,
        }];

        // fails on the very first file, before any upload is confirmed
        let err = upload_all(&client, &files, "ada", "site", "Add")
            .await
            .unwrap_err();
        match err {
            SitesmithError::Publish(publish) => {
                assert_eq!(publish.uploaded, 0);
                assert_eq!(publish.path, "index.html");
                assert!(matches!(
                    publish.source,
                    SitesmithError::Auth(AuthError::MissingToken)
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
