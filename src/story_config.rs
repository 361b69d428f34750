//! Configuration builder. Walks the user from mode to character to name,
//! or to a free-text prompt when the `custom` mode is picked.
//!
//! ```text
//! SelectMode ──► SelectCharacter ──► NameCharacter ──► Done(Structured)
//!     │
//!     └─ "custom" ──► CustomPrompt ──► Done(Custom)
//! ```
//!
//! `/quit` at any step aborts with [`AppError::UserQuit`]; nothing partial
//! is returned.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::{debug, info};

use crate::api::{CreateSession, SessionCatalog, StoryBackend};
use crate::console::{Console, is_quit};
use crate::error::AppError;
use crate::selection::{Choices, choose};

pub const CUSTOM_MODE: &str = "custom";

const CUSTOM_PROMPT_HELP: &str = "Enter a prompt that describes who you are and the first couple \
sentences of where you start out ex: 'You are a knight in the kingdom of Larion. You are hunting \
the evil dragon who has been terrorizing the kingdom. You enter the forest searching for the \
dragon and see'";

/// How a story is seeded. Exactly one form per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryConfiguration {
    Structured { mode: String, character: String, name: String },
    Custom { prompt: String },
}

impl StoryConfiguration {
    pub fn kind(&self) -> &'static str {
        match self {
            StoryConfiguration::Structured { .. } => "structured",
            StoryConfiguration::Custom { .. } => "custom",
        }
    }

    /// Request body for `POST /sessions`.
    pub fn to_request(&self) -> CreateSession {
        match self {
            StoryConfiguration::Structured { mode, character, name } => CreateSession {
                story_mode: mode.clone(),
                character_type: Some(character.clone()),
                name: Some(name.clone()),
                custom_prompt: None,
                prompt_id: None,
            },
            StoryConfiguration::Custom { prompt } => CreateSession {
                story_mode: CUSTOM_MODE.to_string(),
                character_type: None,
                name: None,
                custom_prompt: Some(prompt.clone()),
                prompt_id: None,
            },
        }
    }
}

enum Step {
    SelectMode,
    CustomPrompt,
    SelectCharacter { mode: String },
    NameCharacter { mode: String, character: String },
    Done(StoryConfiguration),
}

/// Fetch the mode catalog from the service, then run the builder.
pub async fn build<R, W>(
    console: &mut Console<R, W>,
    backend: &StoryBackend,
) -> Result<StoryConfiguration, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let catalog = backend.session_catalog().await?;
    configure(console, &catalog).await
}

/// Run the builder against an already fetched catalog.
pub async fn configure<R, W>(
    console: &mut Console<R, W>,
    catalog: &SessionCatalog,
) -> Result<StoryConfiguration, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut step = Step::SelectMode;

    loop {
        step = match step {
            Step::SelectMode => {
                let modes = Choices::numbered(catalog.mode_names());
                if modes.is_empty() {
                    return Err(AppError::Remote("session config lists no modes".into()));
                }
                console.line("Pick a setting...\n")?;
                show_menu(console, &modes)?;
                let mode = choose(console, &modes).await?;
                debug!(%mode, "mode selected");
                if mode == CUSTOM_MODE {
                    Step::CustomPrompt
                } else {
                    Step::SelectCharacter { mode }
                }
            }

            Step::CustomPrompt => {
                console.say(CUSTOM_PROMPT_HELP)?;
                let prompt = read_free_text(console).await?;
                Step::Done(StoryConfiguration::Custom { prompt })
            }

            Step::SelectCharacter { mode } => {
                let names = catalog.characters(&mode).unwrap_or_default();
                if names.is_empty() {
                    return Err(AppError::Remote(format!("mode '{mode}' offers no characters")));
                }
                let characters = Choices::numbered(names);
                console.line("Select a character...\n")?;
                show_menu(console, &characters)?;
                let character = choose(console, &characters).await?;
                debug!(%character, "character selected");
                Step::NameCharacter { mode, character }
            }

            Step::NameCharacter { mode, character } => {
                console.line("Enter your character's name...\n")?;
                let name = read_free_text(console).await?;
                Step::Done(StoryConfiguration::Structured { mode, character, name })
            }

            Step::Done(config) => {
                info!(kind = config.kind(), "story configured");
                return Ok(config);
            }
        };
    }
}

fn show_menu<R, W>(console: &mut Console<R, W>, choices: &Choices) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    for line in choices.menu_lines() {
        console.line(&line)?;
    }
    console.line("")
}

async fn read_free_text<R, W>(console: &mut Console<R, W>) -> Result<String, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let text = console.read_line().await?;
    if is_quit(&text) {
        return Err(AppError::UserQuit);
    }
    Ok(text)
}
