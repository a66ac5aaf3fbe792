//! Lazy lexer over the expression text.
//!
//! A [`TokenStream`] is a cheap, cloneable cursor. Parsers try alternatives by
//! cloning the stream; a failed read never moves the cursor. Every read that
//! can host a completion takes a hook which is called instead of the normal
//! success/failure path when the caret lies inside the token being read.

use crate::completion::CompletionSuggestions;
use crate::parser::result::{ParseError, ParseSignal};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Operator,
    Punctuation,
}

/// A lexical unit with its `[start, end)` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub contains_caret: bool,
}

/// Where a completion was requested and what has been typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionInfo {
    pub token_start: usize,
    pub token_end: usize,
    pub caret: usize,
    /// Text of the token between its start and the caret
    pub prefix: String,
    pub token_text: String,
}

pub const KEYWORDS: &[&str] = &[
    "new",
    "instanceof",
    "this",
    "null",
    "true",
    "false",
    "boolean",
    "char",
    "byte",
    "short",
    "int",
    "long",
    "float",
    "double",
    "void",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[derive(Debug, Clone)]
pub struct TokenStream {
    text: Arc<str>,
    position: usize,
    caret: Option<usize>,
}

impl TokenStream {
    pub fn new(text: impl Into<Arc<str>>, caret: Option<usize>) -> Self {
        Self {
            text: text.into(),
            position: 0,
            caret,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Arc<str> {
        self.text.clone()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn caret(&self) -> Option<usize> {
        self.caret
    }

    /// A copy of this stream positioned at `position`.
    pub fn at(&self, position: usize) -> Self {
        Self {
            text: self.text.clone(),
            position: position.min(self.text.len()),
            caret: self.caret,
        }
    }

    /// True when the caret lies inside `[start, end]`.
    pub fn caret_within(&self, start: usize, end: usize) -> bool {
        self.caret.is_some_and(|c| start <= c && c <= end)
    }

    /// True when the caret lies before `position`, i.e. a parser that reached
    /// `position` has passed the completion point.
    pub fn caret_before(&self, position: usize) -> bool {
        self.caret.is_some_and(|c| c < position)
    }

    fn rest(&self) -> &str {
        &self.text[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let skipped = self.rest().len() - self.rest().trim_start().len();
        self.position += skipped;
    }

    /// Position of the next token, after whitespace.
    pub fn next_token_start(&self) -> usize {
        let mut lookahead = self.clone();
        lookahead.skip_whitespace();
        lookahead.position
    }

    pub fn is_at_end(&self) -> bool {
        self.next_token_start() >= self.text.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.text[self.next_token_start()..].chars().next()
    }

    /// Check whether the upcoming text starts with `s` (after whitespace).
    pub fn peek_str(&self, s: &str) -> bool {
        self.text[self.next_token_start()..].starts_with(s)
    }

    /// Peek the identifier at the cursor without consuming it.
    pub fn peek_identifier(&self) -> Option<String> {
        let start = self.next_token_start();
        let rest = &self.text[start..];
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if is_identifier_start(c) => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !is_identifier_part(*c))
            .map_or(rest.len(), |(i, _)| i);
        Some(rest[..end].to_string())
    }

    pub fn syntax_error(&self, message: impl Into<String>) -> ParseSignal {
        ParseSignal::Failed(ParseError::syntax(self.next_token_start(), message))
    }

    fn completion_info(&self, start: usize, end: usize) -> CompletionInfo {
        let caret = self.caret.unwrap_or(end).clamp(start, end);
        CompletionInfo {
            token_start: start,
            token_end: end,
            caret,
            prefix: self.text[start..caret].to_string(),
            token_text: self.text[start..end].to_string(),
        }
    }

    /// Read an identifier (keywords included). An empty identifier is accepted
    /// only to trigger completion when the caret sits at the cursor.
    pub fn read_identifier<H>(&mut self, hook: H, expected: &str) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        self.skip_whitespace();
        let start = self.position;
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let len = match chars.next() {
            Some((_, c)) if is_identifier_start(c) => chars
                .find(|(_, c)| !is_identifier_part(*c))
                .map_or(rest.len(), |(i, _)| i),
            _ => 0,
        };
        let end = start + len;
        if self.caret_within(start, end) {
            let info = self.completion_info(start, end);
            return Err(ParseSignal::Completions(hook(&info)));
        }
        if len == 0 {
            return Err(self.syntax_error(format!("Expected {expected}")));
        }
        self.position = end;
        let text = self.text[start..end].to_string();
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(Token {
            kind,
            text,
            start,
            end,
            contains_caret: false,
        })
    }

    /// Read exactly `keyword`, offering completions through `hook` at the caret.
    pub fn read_keyword<H>(&mut self, keyword: &str, hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        let mut lookahead = self.clone();
        let token = lookahead.read_identifier(hook, &format!("'{keyword}'"))?;
        if token.text != keyword {
            return Err(self.syntax_error(format!("Expected '{keyword}'")));
        }
        *self = lookahead;
        Ok(Token {
            kind: TokenKind::Keyword,
            ..token
        })
    }

    /// Read the single punctuation character `c`.
    pub fn read_char(&mut self, c: char) -> Result<Token, ParseSignal> {
        self.skip_whitespace();
        if !self.rest().starts_with(c) {
            let found = self
                .rest()
                .chars()
                .next()
                .map_or("end of input".to_string(), |f| format!("'{f}'"));
            return Err(self.syntax_error(format!("Expected '{c}', found {found}")));
        }
        let start = self.position;
        self.position += c.len_utf8();
        Ok(Token {
            kind: TokenKind::Punctuation,
            text: c.to_string(),
            start,
            end: self.position,
            contains_caret: false,
        })
    }

    /// Peek the longest of `candidates` at the cursor.
    pub fn peek_operator<'o>(&self, candidates: &[&'o str]) -> Option<&'o str> {
        let rest = &self.text[self.next_token_start()..];
        candidates
            .iter()
            .filter(|op| rest.starts_with(**op))
            .max_by_key(|op| op.len())
            .copied()
    }

    /// Consume the longest of `candidates`; the cursor is unchanged if none matches.
    pub fn read_operator(&mut self, candidates: &[&str]) -> Option<Token> {
        let op = self.peek_operator(candidates)?;
        self.skip_whitespace();
        let start = self.position;
        self.position += op.len();
        Some(Token {
            kind: TokenKind::Operator,
            text: op.to_string(),
            start,
            end: self.position,
            contains_caret: false,
        })
    }

    /// Read a string literal; the token text is the unescaped content.
    pub fn read_string_literal<H>(&mut self, hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        self.read_quoted('"', hook)
    }

    /// Read a character literal; the token text is the unescaped character.
    pub fn read_char_literal<H>(&mut self, hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        let token = self.read_quoted('\'', hook)?;
        if token.text.chars().count() != 1 {
            return Err(ParseSignal::Failed(ParseError::syntax(
                token.start,
                "Character literal must contain exactly one character",
            )));
        }
        Ok(token)
    }

    fn read_quoted<H>(&mut self, quote: char, hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        self.skip_whitespace();
        let start = self.position;
        let rest = self.rest();
        if !rest.starts_with(quote) {
            return Err(self.syntax_error(format!("Expected {quote}")));
        }
        let mut content = String::new();
        let mut chars = rest.char_indices().skip(1);
        let mut end = None;
        while let Some((i, c)) = chars.next() {
            match c {
                c if c == quote => {
                    end = Some(start + i + c.len_utf8());
                    break;
                }
                '\\' => {
                    let Some((j, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        'n' => content.push('\n'),
                        't' => content.push('\t'),
                        'r' => content.push('\r'),
                        'b' => content.push('\u{8}'),
                        'f' => content.push('\u{c}'),
                        '0' => content.push('\0'),
                        '\\' | '\'' | '"' => content.push(escaped),
                        'u' => {
                            let digits: String = rest[j + 1..].chars().take(4).collect();
                            let code = u32::from_str_radix(&digits, 16).ok();
                            match code.and_then(char::from_u32) {
                                Some(ch) if digits.len() == 4 => {
                                    content.push(ch);
                                    for _ in 0..4 {
                                        chars.next();
                                    }
                                }
                                _ => {
                                    return Err(ParseSignal::Failed(ParseError::syntax(
                                        start + j,
                                        "Invalid unicode escape sequence",
                                    )));
                                }
                            }
                        }
                        other => {
                            return Err(ParseSignal::Failed(ParseError::syntax(
                                start + j,
                                format!("Invalid escape sequence '\\{other}'"),
                            )));
                        }
                    }
                }
                c => content.push(c),
            }
        }
        let token_end = end.unwrap_or(self.text.len());
        if self.caret.is_some_and(|c| start < c && (c < token_end || end.is_none())) {
            let info = self.completion_info(start, token_end);
            return Err(ParseSignal::Completions(hook(&info)));
        }
        let Some(end) = end else {
            return Err(ParseSignal::Failed(ParseError::syntax(
                start,
                format!("Unterminated literal, missing closing {quote}"),
            )));
        };
        self.position = end;
        Ok(Token {
            kind: TokenKind::Literal,
            text: content,
            start,
            end,
            contains_caret: false,
        })
    }

    /// Read raw text up to one of `terminators` (or the end of input); the
    /// token text is trimmed and may be empty.
    pub fn read_until<H>(&mut self, terminators: &[char], hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        self.skip_whitespace();
        let start = self.position;
        let rest = self.rest();
        let len = rest.find(|c| terminators.contains(&c)).unwrap_or(rest.len());
        let end = start + rest[..len].trim_end().len();
        if self.caret_within(start, end) {
            let info = self.completion_info(start, end);
            return Err(ParseSignal::Completions(hook(&info)));
        }
        self.position = end;
        Ok(Token {
            kind: TokenKind::Identifier,
            text: self.text[start..end].to_string(),
            start,
            end,
            contains_caret: false,
        })
    }

    /// Read the raw text of a numeric literal (sign excluded).
    pub fn read_number_literal<H>(&mut self, hook: H) -> Result<Token, ParseSignal>
    where
        H: FnOnce(&CompletionInfo) -> CompletionSuggestions,
    {
        self.skip_whitespace();
        let start = self.position;
        let bytes = self.rest().as_bytes();
        if bytes.first().is_none_or(|b| !b.is_ascii_digit()) {
            return Err(self.syntax_error("Expected numeric literal"));
        }
        let mut len = 0;
        let is_radix_prefixed = bytes.len() > 1
            && bytes[0] == b'0'
            && matches!(bytes[1], b'x' | b'X' | b'b' | b'B');
        if is_radix_prefixed {
            len = 2;
            while len < bytes.len() && (bytes[len].is_ascii_hexdigit() || bytes[len] == b'_') {
                len += 1;
            }
        } else {
            while len < bytes.len() && (bytes[len].is_ascii_digit() || bytes[len] == b'_') {
                len += 1;
            }
            if len + 1 < bytes.len() && bytes[len] == b'.' && bytes[len + 1].is_ascii_digit() {
                len += 1;
                while len < bytes.len() && (bytes[len].is_ascii_digit() || bytes[len] == b'_') {
                    len += 1;
                }
            }
            if len < bytes.len() && matches!(bytes[len], b'e' | b'E') {
                let mut exp = len + 1;
                if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                    exp += 1;
                }
                if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    len = exp;
                    while len < bytes.len() && bytes[len].is_ascii_digit() {
                        len += 1;
                    }
                }
            }
        }
        if len < bytes.len() && matches!(bytes[len], b'l' | b'L' | b'f' | b'F' | b'd' | b'D') {
            len += 1;
        }
        if len < bytes.len() && is_identifier_part(char::from(bytes[len])) {
            return Err(ParseSignal::Failed(ParseError::syntax(
                start + len,
                "Invalid character in numeric literal",
            )));
        }
        let end = start + len;
        if self.caret_within(start + 1, end) {
            let info = self.completion_info(start, end);
            return Err(ParseSignal::Completions(hook(&info)));
        }
        self.position = end;
        Ok(Token {
            kind: TokenKind::Literal,
            text: self.text[start..end].to_string(),
            start,
            end,
            contains_caret: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_completions(info: &CompletionInfo) -> CompletionSuggestions {
        CompletionSuggestions::empty(info.token_start)
    }

    #[test]
    fn test_read_identifier_advances() {
        let mut tokens = TokenStream::new("  foo.bar", None);
        let token = tokens.read_identifier(no_completions, "identifier").unwrap();
        assert_eq!(token.text, "foo");
        assert_eq!((token.start, token.end), (2, 5));
        assert_eq!(tokens.peek_char(), Some('.'));
    }

    #[test]
    fn test_failed_read_does_not_advance() {
        let mut tokens = TokenStream::new("(x", None);
        assert!(tokens.read_identifier(no_completions, "identifier").is_err());
        assert_eq!(tokens.position(), 0);
        assert!(tokens.read_operator(&["+", "-"]).is_none());
        assert_eq!(tokens.position(), 0);
    }

    #[test]
    fn test_caret_inside_identifier_fires_hook() {
        let mut tokens = TokenStream::new("abc", Some(2));
        let result = tokens.read_identifier(
            |info| {
                assert_eq!(info.prefix, "ab");
                assert_eq!(info.token_text, "abc");
                CompletionSuggestions::empty(info.token_start)
            },
            "identifier",
        );
        assert!(matches!(result, Err(ParseSignal::Completions(_))));
    }

    #[test]
    fn test_empty_identifier_at_caret_fires_hook() {
        let mut tokens = TokenStream::new("a.", Some(2));
        tokens.read_identifier(no_completions, "identifier").unwrap();
        tokens.read_char('.').unwrap();
        let result = tokens.read_identifier(no_completions, "identifier");
        assert!(matches!(result, Err(ParseSignal::Completions(_))));
    }

    #[test]
    fn test_longest_operator_wins() {
        let mut tokens = TokenStream::new(">>>= 1", None);
        let token = tokens.read_operator(&[">", ">>", ">>>", ">>>="]).unwrap();
        assert_eq!(token.text, ">>>=");
    }

    #[test]
    fn test_string_literal_escapes() {
        let mut tokens = TokenStream::new(r#""a\"b\nA" + 1"#, None);
        let token = tokens.read_string_literal(no_completions).unwrap();
        assert_eq!(token.text, "a\"b\nA");
        assert_eq!(tokens.peek_char(), Some('+'));
    }

    #[test]
    fn test_unterminated_string_is_syntax_error() {
        let mut tokens = TokenStream::new("\"abc", None);
        assert!(matches!(
            tokens.read_string_literal(no_completions),
            Err(ParseSignal::Failed(_))
        ));
    }

    #[test]
    fn test_read_until_trims() {
        let mut tokens = TokenStream::new("{ first node # second}", None);
        tokens.read_char('{').unwrap();
        let token = tokens.read_until(&['#', '}'], no_completions).unwrap();
        assert_eq!(token.text, "first node");
        assert_eq!(tokens.peek_char(), Some('#'));
    }

    #[test]
    fn test_number_literals() {
        for (text, expected) in [
            ("123 ", "123"),
            ("1.5e3f+", "1.5e3f"),
            ("0x1F_FFL)", "0x1F_FFL"),
            ("7.toString", "7"),
        ] {
            let mut tokens = TokenStream::new(text, None);
            let token = tokens.read_number_literal(no_completions).unwrap();
            assert_eq!(token.text, expected);
        }
    }
}
