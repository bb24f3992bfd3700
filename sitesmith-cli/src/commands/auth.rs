//! Token management against the OAuth broker

use crate::session::Session;
use crate::token;
use anyhow::{bail, Context, Result};
use console::style;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AuthorizeUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Manage the stored GitHub token
pub enum AuthCommand {
    /// Print the browser authorization URL from the broker
    Url,
    /// Exchange an OAuth code for a token via the broker and store it
    Exchange {
        /// Authorization code from the OAuth callback
        code: String,
    },
    /// Store a token obtained elsewhere (e.g. a personal access token)
    Token {
        /// The token to store
        token: String,
    },
    /// Forget the stored token
    Clear,
}

impl AuthCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error when the broker is unreachable, the exchange
    /// fails, or the store cannot be written.
    pub async fn execute(self, broker: Option<String>) -> Result<()> {
        let session = Session::load()?;
        let broker =
            broker.unwrap_or_else(|| format!("http://{}", session.config.broker.bind_addr));

        match self {
            Self::Url => {
                let response: AuthorizeUrl = http_client()?
                    .get(format!("{broker}/auth/github/url"))
                    .send()
                    .await
                    .context("Broker is unreachable")?
                    .json()
                    .await
                    .context("Broker returned an unexpected response")?;
                println!("{}", style("Open this URL in a browser:").bold());
                println!("{}", style(&response.url).cyan());
            }
            Self::Exchange { code } => {
                let response = http_client()?
                    .post(format!("{broker}/auth/github"))
                    .json(&serde_json::json!({ "code": code }))
                    .send()
                    .await
                    .context("Broker is unreachable")?;

                let body: TokenResponse = response
                    .json()
                    .await
                    .context("Broker returned an unexpected response")?;
                if let Some(error) = body.error {
                    let detail = body.error_description.unwrap_or_default();
                    bail!("Token exchange failed: {error} {detail}");
                }
                let Some(access_token) = body.access_token else {
                    bail!("Token exchange failed: no access token in response");
                };
                token::save(&session.store, &access_token)?;
                println!("{}", style("✓ Token stored").green().bold());
            }
            Self::Token { token: value } => {
                token::save(&session.store, &value)?;
                println!("{}", style("✓ Token stored").green().bold());
            }
            Self::Clear => {
                token::clear(&session.store)?;
                println!("{}", style("✓ Token cleared").green().bold());
            }
        }
        Ok(())
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("sitesmith")
        .build()
        .context("Failed to build HTTP client")
}
