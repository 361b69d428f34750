//! Story service transport.
//!
//! `StoryBackend` is an enum over concrete backends: the HTTP client used in
//! production and, under test, a scripted in-memory service. Enum dispatch
//! keeps the controller free of trait objects and `async-trait`.
//!
//! Wire types live here because both backends speak them.

pub mod http;
#[cfg(test)]
pub mod scripted;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

// ── Wire types ────────────────────────────────────────────────────────────────

/// `GET /sessions/*/config`: available modes in server order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionCatalog {
    pub modes: Map<String, Value>,
}

impl SessionCatalog {
    /// Mode names, in the order the service listed them.
    pub fn mode_names(&self) -> Vec<String> {
        self.modes.keys().cloned().collect()
    }

    /// Character names offered for `mode`, in server order.
    /// `None` when the mode is unknown.
    pub fn characters(&self, mode: &str) -> Option<Vec<String>> {
        let entry = self.modes.get(mode)?;
        let names = entry
            .get("characters")
            .and_then(Value::as_object)
            .map(|chars| chars.keys().cloned().collect())
            .unwrap_or_default();
        Some(names)
    }
}

/// `POST /sessions` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    pub story_mode: String,
    pub character_type: Option<String>,
    pub name: Option<String>,
    pub custom_prompt: Option<String>,
    pub prompt_id: Option<String>,
}

/// One entry of the remote story log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoryEntry {
    #[serde(default)]
    pub value: Option<String>,
}

/// `POST /sessions` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStart {
    #[serde(rename = "userId", deserialize_with = "id_string")]
    pub user_id: String,
    #[serde(rename = "id", alias = "sessionId", deserialize_with = "id_string")]
    pub session_id: String,
    #[serde(rename = "publicId", deserialize_with = "id_string")]
    pub public_id: String,
    pub story: Vec<StoryEntry>,
}

/// `POST /sessions/{id}/inputs` body.
#[derive(Debug, Clone, Serialize)]
pub struct ActionInput<'a> {
    pub text: &'a str,
}

/// Remote ids arrive as strings or numbers; both become strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

// ── Backend enum ──────────────────────────────────────────────────────────────

/// All available story backends.
#[derive(Debug, Clone)]
pub enum StoryBackend {
    Http(http::HttpBackend),
    #[cfg(test)]
    Scripted(scripted::ScriptedBackend),
}

impl StoryBackend {
    /// Fetch the available modes and their characters.
    pub async fn session_catalog(&self) -> Result<SessionCatalog, AppError> {
        match self {
            StoryBackend::Http(b) => b.session_catalog().await,
            #[cfg(test)]
            StoryBackend::Scripted(b) => b.session_catalog(),
        }
    }

    /// Create a story from its configuration.
    pub async fn create_session(&self, body: &CreateSession) -> Result<SessionStart, AppError> {
        match self {
            StoryBackend::Http(b) => b.create_session(body).await,
            #[cfg(test)]
            StoryBackend::Scripted(b) => b.create_session(body),
        }
    }

    /// Send one player action; returns the whole story log so far.
    pub async fn send_input(&self, session_id: &str, text: &str) -> Result<Vec<StoryEntry>, AppError> {
        match self {
            StoryBackend::Http(b) => b.send_input(session_id, text).await,
            #[cfg(test)]
            StoryBackend::Scripted(b) => b.send_input(session_id, text),
        }
    }
}
