//! Scripted in-memory story service for tests.
//!
//! Responses are queued up front; every call is recorded so tests can assert
//! which requests were (or were not) made.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{CreateSession, SessionCatalog, SessionStart, StoryEntry};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Catalog,
    Create(CreateSession),
    Input { session_id: String, text: String },
}

#[derive(Debug, Default)]
struct Script {
    catalog: Option<SessionCatalog>,
    start: Option<Result<SessionStart, String>>,
    turns: VecDeque<Result<Vec<StoryEntry>, String>>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, json: &str) -> Self {
        let catalog = serde_json::from_str(json).expect("test catalog is valid json");
        self.lock().catalog = Some(catalog);
        self
    }

    pub fn with_start(self, json: &str) -> Self {
        let start = serde_json::from_str(json).map_err(|e| format!("malformed response: {e}"));
        self.lock().start = Some(start);
        self
    }

    /// Queue the story log returned by the next `send_input`.
    pub fn push_turn(self, log: &[&str]) -> Self {
        let entries = log
            .iter()
            .map(|v| StoryEntry { value: Some((*v).to_string()) })
            .collect();
        self.lock().turns.push_back(Ok(entries));
        self
    }

    /// Queue a raw story log (entries may lack `value`).
    pub fn push_raw_turn(self, entries: Vec<StoryEntry>) -> Self {
        self.lock().turns.push_back(Ok(entries));
        self
    }

    pub fn push_failure(self, message: &str) -> Self {
        self.lock().turns.push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn input_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Input { .. })).count()
    }

    pub(super) fn session_catalog(&self) -> Result<SessionCatalog, AppError> {
        let mut script = self.lock();
        script.calls.push(Call::Catalog);
        script
            .catalog
            .clone()
            .ok_or_else(|| AppError::Remote("no catalog scripted".into()))
    }

    pub(super) fn create_session(&self, body: &CreateSession) -> Result<SessionStart, AppError> {
        let mut script = self.lock();
        script.calls.push(Call::Create(body.clone()));
        match script.start.clone() {
            Some(Ok(start)) => Ok(start),
            Some(Err(msg)) => Err(AppError::Remote(msg)),
            None => Err(AppError::Remote("no session scripted".into())),
        }
    }

    pub(super) fn send_input(&self, session_id: &str, text: &str) -> Result<Vec<StoryEntry>, AppError> {
        let mut script = self.lock();
        script.calls.push(Call::Input {
            session_id: session_id.to_string(),
            text: text.to_string(),
        });
        match script.turns.pop_front() {
            Some(Ok(entries)) => Ok(entries),
            Some(Err(msg)) => Err(AppError::Remote(msg)),
            None => Err(AppError::Remote("no turn scripted".into())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("script mutex poisoned")
    }
}
