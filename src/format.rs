//! Narrative output formatting.

/// Width used when stdout is not a terminal.
pub const DEFAULT_WIDTH: usize = 80;

/// Columns of the attached terminal, or [`DEFAULT_WIDTH`].
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
        .filter(|cols| *cols > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Greedy word wrap into lines of at most `width` characters.
///
/// Each input line is wrapped on its own and blank lines are kept, so the
/// paragraph breaks of generated text survive. Words longer than `width`
/// are split on character boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > width {
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(width).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        lines.push(piece);
                    } else {
                        current_len = chunk.len();
                        current = piece;
                    }
                }
            } else {
                current.push_str(word);
                current_len = word_len;
            }
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}
