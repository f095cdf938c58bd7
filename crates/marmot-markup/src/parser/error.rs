use std::borrow::Cow;
use std::fmt::Write;

use strum_macros::Display;
use thiserror::Error;

use crate::tokenizer::{Token, TokenType};

/// Lines of source shown on each side of the offending line.
const CONTEXT_LINES: usize = 5;

/// Rendered source lines are cut to this many characters.
const MAX_LINE_WIDTH: usize = 80;

/// Appended to a rendered line that was cut.
const TRUNCATION_MARKER: &str = "...";

/// The construct the tree builder was reducing when it met an unexpected
/// token. Decides which closing token an `END_OF_INPUT` was standing in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Construct {
    /// Top level of the document.
    Document,
    /// An element's start tag, attributes or children.
    Element,
    /// A comment body.
    Comment,
    /// A CDATA body.
    Cdata,
    /// A doctype declaration.
    Doctype,
    /// An XML declaration.
    XmlDeclaration,
}

impl Construct {
    /// The token that would have closed this construct, in words.
    #[must_use]
    pub const fn closing_phrase(self) -> Option<&'static str> {
        match self {
            Self::Document => None,
            Self::Element => Some("element closing tag"),
            Self::Comment => Some("comment closing tag"),
            Self::Cdata => Some("CDATA closing tag"),
            Self::Doctype => Some("doctype closing tag"),
            Self::XmlDeclaration => Some("XML declaration closing tag"),
        }
    }
}

/// How a token is named in an error message.
///
/// `END_OF_INPUT` reads as "end of input, expected <closer> instead" when a
/// construct was left open; every other token uses its raw name.
#[must_use]
pub fn token_phrase(token_type: TokenType, construct: Construct) -> Cow<'static, str> {
    match token_type {
        TokenType::EndOfInput => match construct.closing_phrase() {
            Some(closer) => Cow::Owned(format!("end of input, expected {closer} instead")),
            None => Cow::Borrowed("end of input"),
        },
        other => Cow::Borrowed(other.into()),
    }
}

/// The single fatal error of a parse: a token the grammar does not accept
/// where it appeared.
///
/// No partial tree accompanies it; fix the input and parse again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    line: usize,
}

impl ParseError {
    /// Build the diagnostic for `token`, met while reducing `construct`.
    ///
    /// The message names the token, its value when it has one, and its line.
    /// Unless the token is `END_OF_INPUT`, it is followed by the surrounding
    /// source lines as rendered by [`render_context`].
    #[must_use]
    pub fn unexpected(token: &Token, construct: Construct, source: &str) -> Self {
        let mut message = format!("Unexpected {}", token_phrase(token.token_type, construct));
        if let Some(value) = token.value() {
            let _ = write!(message, " with value {value:?}");
        }
        let _ = write!(message, " on line {}", token.line);

        if !token.is_end_of_input() {
            let context = render_context(source, token.line);
            if !context.is_empty() {
                let _ = write!(message, ":\n\n{}", context.trim_end());
            }
        }

        Self {
            message,
            line: token.line,
        }
    }

    /// The full diagnostic.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line of the offending token.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

/// Render up to five source lines before and after `line`.
///
/// Each rendered line reads `"{prefix}{number}: {text}"`; the offending line
/// is prefixed with `=> `, the others with three spaces. Text is trimmed and
/// cut to 80 characters plus `...`.
#[must_use]
pub fn render_context(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let first = line.saturating_sub(CONTEXT_LINES).max(1);
    let last = line.saturating_add(CONTEXT_LINES).min(lines.len());

    let mut rendered = String::new();
    for number in first..=last {
        let prefix = if number == line { "=> " } else { "   " };
        let text = truncate(lines[number - 1].trim());
        let _ = writeln!(rendered, "{prefix}{number}: {text}");
    }
    rendered
}

fn truncate(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_LINE_WIDTH) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// An unexpected token, before it is rendered against the source text.
///
/// Returned by [`super::TreeBuilder::build`], which only sees tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedToken {
    /// The token the grammar rejected.
    pub token: Token,
    /// What was being reduced when it arrived.
    pub construct: Construct,
}

impl UnexpectedToken {
    /// Render this into a [`ParseError`] using the parsed source.
    #[must_use]
    pub fn into_parse_error(self, source: &str) -> ParseError {
        ParseError::unexpected(&self.token, self.construct, source)
    }
}
