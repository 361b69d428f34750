//! Session controller. Owns one story from creation to `/quit`.
//!
//! ```text
//! Uninitialized ──init_story──► Active ──/quit──► Terminated
//! ```
//!
//! The remote story log gains one player entry and one narrator entry per
//! turn, and entry 0 is the opening pitch. The narrative for turn `n` is
//! therefore at index `2n`: the turn counter advances by two and is
//! committed only once the entry was found.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::{debug, info, warn};

use crate::api::StoryBackend;
use crate::console::{Console, is_quit};
use crate::error::AppError;
use crate::story_config::StoryConfiguration;

/// Log entries appended by the service per turn (player + narrator).
pub const ENTRIES_PER_TURN: u64 = 2;

/// Identifiers assigned by the service on story creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub user_id: String,
    pub session_id: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active(SessionHandle),
    Terminated(SessionHandle),
}

#[derive(Debug)]
pub struct SessionController {
    backend: StoryBackend,
    state: SessionState,
    turn_counter: u64,
}

impl SessionController {
    pub fn new(backend: StoryBackend) -> Self {
        Self { backend, state: SessionState::Uninitialized, turn_counter: 0 }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, SessionState::Terminated(_))
    }

    pub fn handle(&self) -> Option<&SessionHandle> {
        match &self.state {
            SessionState::Uninitialized => None,
            SessionState::Active(h) | SessionState::Terminated(h) => Some(h),
        }
    }

    /// Create the story and print its opening.
    pub async fn init_story<R, W>(
        &mut self,
        console: &mut Console<R, W>,
        config: StoryConfiguration,
    ) -> Result<&SessionHandle, AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if self.state != SessionState::Uninitialized {
            return Err(AppError::Session("story already initialized".into()));
        }

        console.say("Generating story... Please wait...")?;

        let start = self.backend.create_session(&config.to_request()).await?;
        let pitch = start
            .story
            .first()
            .and_then(|entry| entry.value.as_deref())
            .ok_or_else(|| AppError::Remote("story response has no opening entry".into()))?;

        console.say(pitch)?;

        let handle = SessionHandle {
            user_id: start.user_id,
            session_id: start.session_id,
            public_id: start.public_id,
        };
        info!(session_id = %handle.session_id, public_id = %handle.public_id, "story started");

        self.state = SessionState::Active(handle);
        self.handle()
            .ok_or_else(|| AppError::Session("story state lost during init".into()))
    }

    /// Play one turn. `/quit` terminates the session without a request.
    pub async fn turn<R, W>(&mut self, console: &mut Console<R, W>, input: &str) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let handle = match &self.state {
            SessionState::Uninitialized => {
                return Err(AppError::Session("turn before the story was initialized".into()));
            }
            SessionState::Terminated(_) => {
                debug!("turn ignored after termination");
                return Ok(());
            }
            SessionState::Active(h) => h.clone(),
        };

        if is_quit(input) {
            info!(turns = self.turn_counter / ENTRIES_PER_TURN, "session terminated by user");
            self.state = SessionState::Terminated(handle);
            return Ok(());
        }

        let entries = self.backend.send_input(&handle.session_id, input).await?;

        let next = self.turn_counter + ENTRIES_PER_TURN;
        let narrative = usize::try_from(next)
            .ok()
            .and_then(|i| entries.get(i))
            .and_then(|entry| entry.value.as_deref())
            .ok_or_else(|| {
                warn!(index = next, log_len = entries.len(), "story log missing expected entry");
                AppError::Remote(format!(
                    "story log has no narrative at entry {next} ({} entries returned)",
                    entries.len()
                ))
            })?;

        console.say(narrative)?;
        self.turn_counter = next;
        debug!(turn_counter = self.turn_counter, "turn complete");
        Ok(())
    }

    /// Read actions and play turns until the user quits.
    pub async fn run<R, W>(&mut self, console: &mut Console<R, W>) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if self.handle().is_none() {
            return Err(AppError::Session("run before the story was initialized".into()));
        }
        while !self.is_terminated() {
            let input = console.read_line().await?;
            self.turn(console, &input).await?;
        }
        Ok(())
    }
}
