//! GitHub OAuth token broker
//!
//! A thin service that holds the OAuth client secret so the CLI never
//! sees it. It exposes the authorization URL and exchanges callback
//! codes for access tokens against GitHub.
//!
//! The authorization code and the exchanged token are never logged.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sitesmith::config::BrokerSettings;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use url::Url;

const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const OAUTH_SCOPE: &str = "repo user";

/// Shared handler state
#[derive(Clone)]
pub struct BrokerState {
    http: reqwest::Client,
    settings: BrokerSettings,
    token_url: String,
}

impl BrokerState {
    /// Build state from broker settings
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(settings: BrokerSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("sitesmith-broker")
            .build()?;
        Ok(Self {
            http,
            settings,
            token_url: GITHUB_TOKEN_URL.to_string(),
        })
    }

    /// Override the token exchange endpoint
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

/// Build the broker router
pub fn router(state: BrokerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/auth/github", post(exchange_code))
        .route("/auth/github/url", get(authorize_url))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    #[serde(default)]
    code: Option<String>,
}

/// What GitHub returns from the token endpoint, success or failure
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenExchange {
    /// The granted access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token type, normally `bearer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Granted scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Error code reported by GitHub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_description: Option<String>,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            error_description: None,
        }),
    )
        .into_response()
}

/// Map GitHub's token response onto the broker's reply
///
/// GitHub reports OAuth failures as 200 responses with an `error`
/// field, so the status is decided from the body alone.
#[must_use]
pub fn classify_exchange(body: TokenExchange) -> Response {
    if let Some(error) = body.error {
        info!(%error, "token exchange rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error,
                error_description: body.error_description,
            }),
        )
            .into_response();
    }
    if body.access_token.is_none() {
        return error_response(StatusCode::BAD_REQUEST, "Failed to obtain access token");
    }
    info!("token exchange succeeded");
    (StatusCode::OK, Json(body)).into_response()
}

async fn exchange_code(
    State(state): State<BrokerState>,
    Json(request): Json<ExchangeRequest>,
) -> Response {
    let Some(code) = request.code.filter(|code| !code.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Code is required");
    };

    let result = state
        .http
        .post(&state.token_url)
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "client_id": state.settings.client_id,
            "client_secret": state.settings.client_secret,
            "code": code,
        }))
        .send()
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "token endpoint unreachable");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "GitHub OAuth failed");
        }
    };

    match response.json::<TokenExchange>().await {
        Ok(body) => classify_exchange(body),
        Err(e) => {
            error!(error = %e, "token endpoint returned an unreadable body");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "GitHub OAuth failed")
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthorizeUrl {
    url: String,
}

async fn authorize_url(State(state): State<BrokerState>) -> Response {
    match build_authorize_url(&state.settings) {
        Ok(url) => (StatusCode::OK, Json(AuthorizeUrl { url })).into_response(),
        Err(e) => {
            error!(error = %e, "authorize URL construction failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build authorization URL",
            )
        }
    }
}

fn build_authorize_url(settings: &BrokerSettings) -> Result<String, url::ParseError> {
    let state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    let mut url = Url::parse(GITHUB_AUTHORIZE_URL)?;
    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", &settings.redirect_uri)
        .append_pair("scope", OAUTH_SCOPE)
        .append_pair("state", &state);
    Ok(url.into())
}

async fn index() -> &'static str {
    "sitesmith OAuth broker - running"
}
