//! Selection engine: validate a menu choice typed at the console.
//!
//! A choice may be typed as its menu index (`"2"`) or as the option itself
//! (`"fantasy"`). Index lookup is tried first, so an option whose text is
//! also a valid index never shadows the numbered entry.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::console::{Console, is_quit};
use crate::error::AppError;

pub const INVALID_SELECTION: &str = "Please enter a valid selection.";

/// An ordered set of `(key, value)` pairs offered to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices {
    entries: Vec<(String, String)>,
}

impl Choices {
    /// Number `options` from 1, in order.
    pub fn numbered<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = options
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), v.into()))
            .collect();
        Self { entries }
    }

    /// Build from explicit pairs (keys need not be numbers).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Menu lines as printed: `"1) fantasy"`.
    pub fn menu_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|(k, v)| format!("{k}) {v}"))
    }

    /// Resolve trimmed input: key first, then literal value.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        self.entries
            .iter()
            .find(|(k, _)| k == input)
            .or_else(|| self.entries.iter().find(|(_, v)| v == input))
            .map(|(_, v)| v.as_str())
    }
}

/// Read lines until one resolves against `choices`.
///
/// Invalid input re-prompts without limit; `/quit` fails with
/// [`AppError::UserQuit`].
pub async fn choose<R, W>(console: &mut Console<R, W>, choices: &Choices) -> Result<String, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let input = console.read_line().await?;
        if is_quit(&input) {
            return Err(AppError::UserQuit);
        }
        if let Some(value) = choices.resolve(&input) {
            return Ok(value.to_string());
        }
        debug!(input = %input.trim(), "invalid selection");
        console.say(INVALID_SELECTION)?;
    }
}
