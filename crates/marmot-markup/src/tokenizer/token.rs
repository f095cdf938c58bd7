use core::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// The closed set of token kinds the tokenizer emits.
///
/// Displayed in `SCREAMING_SNAKE_CASE` (`ELEM_END`), which is also the raw name
/// used in parse error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// A quoted or unquoted attribute value, or a doctype identifier.
    String,
    /// Character data, also used for CDATA bodies.
    Text,
    /// `<!DOCTYPE`
    DoctypeStart,
    /// The `>` closing a doctype.
    DoctypeEnd,
    /// The keyword after the doctype name (`PUBLIC`, `SYSTEM`).
    DoctypeType,
    /// The doctype's root element name.
    DoctypeName,
    /// `<![CDATA[`
    CdataStart,
    /// `]]>`
    CdataEnd,
    /// `<!--`
    CommentStart,
    /// `-->`
    CommentEnd,
    /// One fragment of a comment body.
    CommentBody,
    /// The `<` opening a start tag.
    ElemStart,
    /// An element's local name.
    ElemName,
    /// An element's namespace prefix.
    ElemNs,
    /// `/>` or `</name>`.
    ElemEnd,
    /// An attribute name.
    Attr,
    /// `<?xml`
    XmlDeclStart,
    /// `?>`
    XmlDeclEnd,
    /// Synthetic marker after the last real token.
    EndOfInput,
}

/// A typed, line-tagged unit of markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// What kind of token this is.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Payload, when the kind carries one.
    pub value: Option<String>,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    /// Create a token without a value.
    #[must_use]
    pub const fn new(token_type: TokenType, line: usize) -> Self {
        Self {
            token_type,
            value: None,
            line,
        }
    }

    /// Create a token carrying a value.
    #[must_use]
    pub fn with_value(token_type: TokenType, value: impl Into<String>, line: usize) -> Self {
        Self {
            token_type,
            value: Some(value.into()),
            line,
        }
    }

    /// Create an end-of-input token.
    #[must_use]
    pub const fn end_of_input(line: usize) -> Self {
        Self::new(TokenType::EndOfInput, line)
    }

    /// Returns true if this is the end-of-input marker.
    #[must_use]
    pub fn is_end_of_input(&self) -> bool {
        self.token_type == TokenType::EndOfInput
    }

    /// The value as a string slice, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({value:?}) @{}", self.token_type, self.line),
            None => write!(f, "{} @{}", self.token_type, self.line),
        }
    }
}
