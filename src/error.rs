//! Application-wide error types.
//!
//! Every failure inside the client propagates as an [`AppError`] up to
//! `main`, which maps each variant to exactly one terminal action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// `/quit` typed at an interactive prompt.
    #[error("quit requested")]
    UserQuit,

    /// Ctrl-C from the terminal.
    #[error("interrupted")]
    Interrupted,

    /// stdin reached end-of-file while a line was expected.
    #[error("input closed")]
    InputClosed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// `true` for control-flow signals that end the program without failure.
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, AppError::UserQuit | AppError::Interrupted | AppError::InputClosed)
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean_exit() { 0 } else { 1 }
    }

    /// Message printed to the user before exiting.
    pub fn farewell(&self) -> String {
        match self {
            AppError::UserQuit | AppError::InputClosed => "Bye Bye!".to_string(),
            AppError::Interrupted => "Received Keyboard Interrupt. Bye Bye...".to_string(),
            other => format!("error: {other}"),
        }
    }
}
