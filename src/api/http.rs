//! HTTP backend for the story service.
//!
//! Every request carries the bearer token in `X-Access-Token`. No call is
//! retried; a 401/403 anywhere means the token is no longer accepted and is
//! reported as [`AppError::Auth`].
//!
//! Failures are logged at `debug` only; `main` prints the error itself.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ActionInput, CreateSession, SessionCatalog, SessionStart, StoryEntry};
use crate::config::ApiConfig;
use crate::error::AppError;

const TOKEN_HEADER: &str = "x-access-token";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend authenticated with `bearer_token`.
    pub fn new(api: &ApiConfig, bearer_token: &str) -> Result<Self, AppError> {
        let mut token = HeaderValue::from_str(bearer_token)
            .map_err(|e| AppError::Config(format!("auth_token is not a valid header value: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let client = client_builder(api)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url: api.base_url.clone() })
    }

    pub async fn session_catalog(&self) -> Result<SessionCatalog, AppError> {
        let url = format!("{}/sessions/*/config", self.base_url);
        debug!(%url, "fetching session config");
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        decode(check_status(response).await?).await
    }

    pub async fn create_session(&self, body: &CreateSession) -> Result<SessionStart, AppError> {
        let url = format!("{}/sessions", self.base_url);
        debug!(%url, story_mode = %body.story_mode, "creating story session");
        let response = self.client.post(&url).json(body).send().await.map_err(transport_error)?;
        decode(check_status(response).await?).await
    }

    pub async fn send_input(&self, session_id: &str, text: &str) -> Result<Vec<StoryEntry>, AppError> {
        let url = format!("{}/sessions/{session_id}/inputs", self.base_url);
        debug!(%url, text_len = text.len(), "sending player action");
        let response = self
            .client
            .post(&url)
            .json(&ActionInput { text })
            .send()
            .await
            .map_err(transport_error)?;
        decode(check_status(response).await?).await
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

/// Exchange an email/password pair for a bearer token (`POST /users`).
pub async fn login(api: &ApiConfig, email: &str, password: &str) -> Result<String, AppError> {
    let client = client_builder(api)
        .build()
        .map_err(|e| AppError::Remote(format!("failed to build HTTP client: {e}")))?;
    let url = format!("{}/users", api.base_url);
    debug!(%url, "logging in");

    let response = client
        .post(&url)
        .json(&LoginRequest { email, password })
        .send()
        .await
        .map_err(transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        debug!(%status, "login rejected");
        return Err(AppError::Auth(
            "Failed to log in using provided credentials. Check your email and password.".into(),
        ));
    }

    let parsed: LoginResponse = decode(response).await?;
    Ok(parsed.access_token)
}

fn client_builder(api: &ApiConfig) -> reqwest::ClientBuilder {
    let mut builder = Client::builder();
    if let Some(secs) = api.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
}

fn transport_error(e: reqwest::Error) -> AppError {
    debug!(error = %e, "story service request failed (transport)");
    if e.is_connect() || e.is_timeout() {
        AppError::Remote(format!("Lost connection to the story servers: {e}"))
    } else {
        AppError::Remote(e.to_string())
    }
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    debug!(%status, %body, "story service returned HTTP error");
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(format!(
            "HTTP {status}: the access token was rejected; log in again to refresh auth_token"
        )),
        _ => AppError::Remote(format!("HTTP {status}: {body}")),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!(error = %e, "failed to deserialize story service response");
        AppError::Remote(format!("malformed response: {e}"))
    })
}
