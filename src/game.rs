//! One game: configure a story, start it, play until `/quit`.

use std::io::Write;

use tokio::io::AsyncBufRead;

use crate::api::StoryBackend;
use crate::console::Console;
use crate::error::AppError;
use crate::session::SessionController;
use crate::story_config;

/// Run a whole game against `backend`.
///
/// Returns `Ok(())` when the player quits from the turn loop. A quit during
/// configuration surfaces as [`AppError::UserQuit`] and no story is created.
pub async fn play<R, W>(console: &mut Console<R, W>, backend: StoryBackend) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let config = story_config::build(console, &backend).await?;

    let mut controller = SessionController::new(backend);
    controller.init_story(console, config).await?;
    controller.run(console).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::{Call, ScriptedBackend};
    use crate::console::testing::{output, scripted};

    const CATALOG: &str = r#"{"modes": {
        "fantasy": {"characters": {"knight": {}, "wizard": {}}},
        "custom": {}
    }}"#;
    const START: &str = r#"{"userId": "u", "id": "s-7", "publicId": "p",
        "story": [{"value": "The forest is dark."}]}"#;

    #[tokio::test]
    async fn full_structured_game() {
        let backend = ScriptedBackend::new()
            .with_catalog(CATALOG)
            .with_start(START)
            .push_turn(&["The forest is dark.", "> light a torch", "Shadows flee."]);
        let mut console = scripted("1\nwizard\nMerla\nlight a torch\n/quit\n");

        play(&mut console, StoryBackend::Scripted(backend.clone())).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Catalog);
        assert!(matches!(&calls[1], Call::Create(body)
            if body.story_mode == "fantasy" && body.name.as_deref() == Some("Merla")));
        assert_eq!(calls[2], Call::Input { session_id: "s-7".into(), text: "light a torch".into() });

        let text = output(console);
        assert!(text.contains("Generating story... Please wait..."));
        assert!(text.contains("The forest is dark."));
        assert!(text.contains("Shadows flee."));
    }

    #[tokio::test]
    async fn custom_game_sends_prompt() {
        let backend = ScriptedBackend::new().with_catalog(CATALOG).with_start(START);
        let mut console = scripted("custom\nYou wake on a ship.\n/quit\n");

        play(&mut console, StoryBackend::Scripted(backend.clone())).await.unwrap();

        assert!(backend.calls().iter().any(|c| matches!(c, Call::Create(body)
            if body.story_mode == "custom"
                && body.custom_prompt.as_deref() == Some("You wake on a ship.")
                && body.character_type.is_none())));
    }

    #[tokio::test]
    async fn quit_at_name_prompt_never_creates_story() {
        let backend = ScriptedBackend::new().with_catalog(CATALOG).with_start(START);
        let mut console = scripted("1\n1\n/quit\n");

        let err = play(&mut console, StoryBackend::Scripted(backend.clone())).await.unwrap_err();

        assert!(matches!(err, AppError::UserQuit));
        assert_eq!(backend.calls(), vec![Call::Catalog]);
    }

    #[tokio::test]
    async fn remote_failure_mid_game_is_fatal() {
        let backend = ScriptedBackend::new()
            .with_catalog(CATALOG)
            .with_start(START)
            .push_turn(&["The forest is dark.", "> look"]);
        let mut console = scripted("1\n1\nA\nlook\nlook again\n");

        let err = play(&mut console, StoryBackend::Scripted(backend.clone())).await.unwrap_err();

        assert!(matches!(err, AppError::Remote(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(backend.input_calls(), 1);
    }
}
