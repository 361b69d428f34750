//! Interactive console: prompted line input and word-wrapped output.
//!
//! Generic over the reader and writer so the selection engine, the
//! configuration builder and the session controller can be driven from
//! in-memory buffers in tests. Production uses tokio's stdin and
//! `std::io::stdout`.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::trace;

use crate::error::AppError;
use crate::format::wrap_text;

/// Universal session-termination command, recognised at every prompt.
pub const QUIT_COMMAND: &str = "/quit";

/// `true` when `input` is the quit command (surrounding whitespace ignored).
pub fn is_quit(input: &str) -> bool {
    input.trim() == QUIT_COMMAND
}

pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
    prompt: String,
    width: usize,
}

/// The console attached to the process's terminal.
pub type StdConsole = Console<BufReader<Stdin>, std::io::Stdout>;

impl StdConsole {
    pub fn stdio(prompt: impl Into<String>, width: usize) -> Self {
        Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout(), prompt, width)
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(reader: R, out: W, prompt: impl Into<String>, width: usize) -> Self {
        Self { lines: reader.lines(), out, prompt: prompt.into(), width }
    }

    /// Print the prompt and wait for one line of input.
    ///
    /// The line terminator is stripped; other whitespace is left for the
    /// caller. End of input is [`AppError::InputClosed`].
    pub async fn read_line(&mut self) -> Result<String, AppError> {
        write!(self.out, "{}", self.prompt)?;
        self.out.flush()?;

        let line = self.lines.next_line().await?.ok_or(AppError::InputClosed)?;
        writeln!(self.out)?;

        let line = line.trim_end_matches('\r').to_string();
        trace!(len = line.len(), "console line read");
        Ok(line)
    }

    /// Print `text` word-wrapped to the console width, followed by a blank line.
    pub fn say(&mut self, text: &str) -> Result<(), AppError> {
        for line in wrap_text(text, self.width) {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Print one line verbatim.
    pub fn line(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Give back the output sink (tests inspect what was printed).
    pub fn into_output(self) -> W {
        self.out
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{output, scripted};
    use super::*;

    #[test]
    fn quit_detection_trims() {
        assert!(is_quit("/quit"));
        assert!(is_quit("  /quit \n"));
        assert!(!is_quit("/quitter"));
        assert!(!is_quit("quit"));
    }

    #[tokio::test]
    async fn read_line_prints_prompt_and_strips_terminator() {
        let mut console = scripted("look around\r\nnext\n");
        assert_eq!(console.read_line().await.unwrap(), "look around");
        assert_eq!(console.read_line().await.unwrap(), "next");
        assert_eq!(output(console), "> \n> \n");
    }

    #[tokio::test]
    async fn end_of_input_is_input_closed() {
        let mut console = scripted("");
        let err = console.read_line().await.unwrap_err();
        assert!(matches!(err, AppError::InputClosed));
    }

    #[test]
    fn say_wraps_and_adds_blank_line() {
        let mut console = scripted("");
        console
            .say("The dragon circles overhead and lands on the ruined tower.")
            .unwrap();
        let text = output(console);
        assert!(text.ends_with("\n\n"));
        for line in text.lines() {
            assert!(line.chars().count() <= 40);
        }
    }
}
