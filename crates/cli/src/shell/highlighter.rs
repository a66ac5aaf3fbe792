use exprscope_core::tokenizer::is_keyword;
use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

pub struct ExpressionHighlighter {
    commands: Vec<String>,
}

impl ExpressionHighlighter {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    fn highlight_command(&self, line: &str, styled_text: &mut StyledText) {
        let (name, rest) = line.split_at(line.find(char::is_whitespace).unwrap_or(line.len()));
        let style = if self.commands.iter().any(|c| c == name) {
            Style::new().fg(Color::LightGreen).bold()
        } else {
            Style::new().fg(Color::Red)
        };
        styled_text.push((style, name.to_string()));
        styled_text.push((Style::new(), rest.to_string()));
    }
}

/// Style for one lexical run of an expression.
fn word_style(word: &str) -> Style {
    if is_keyword(word) {
        Style::new().fg(Color::Magenta).bold()
    } else if word.starts_with(|c: char| c.is_ascii_digit()) {
        Style::new().fg(Color::LightBlue)
    } else if word.starts_with(|c: char| c.is_uppercase()) {
        Style::new().fg(Color::Yellow)
    } else {
        Style::new()
    }
}

impl Highlighter for ExpressionHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        if line.starts_with(':') {
            self.highlight_command(line, &mut styled_text);
            return styled_text;
        }

        let mut chars = line.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            let mut end = start + c.len_utf8();
            if c == '"' || c == '\'' {
                // Literal up to the matching quote, honouring escapes
                let mut escaped = false;
                for (i, next) in chars.by_ref() {
                    end = i + next.len_utf8();
                    if !escaped && next == c {
                        break;
                    }
                    escaped = !escaped && next == '\\';
                }
                styled_text.push((Style::new().fg(Color::Green), line[start..end].to_string()));
            } else if c.is_alphanumeric() || c == '_' || c == '$' {
                while let Some((i, next)) = chars.peek().copied() {
                    if !(next.is_alphanumeric() || next == '_' || next == '$') {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &line[start..end];
                styled_text.push((word_style(word), word.to_string()));
            } else {
                styled_text.push((Style::new(), line[start..end].to_string()));
            }
        }
        styled_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_preserves_text() {
        let highlighter = ExpressionHighlighter::new(vec![":vars".to_string()]);
        for line in ["new int[] {1, 2}", "\"a\\\"b\" + x", ":vars", "'é'.x"] {
            let styled = highlighter.highlight(line, 0);
            let text: String = styled.buffer.iter().map(|(_, s)| s.as_str()).collect();
            assert_eq!(text, line);
        }
    }
}
