use std::collections::VecDeque;

use super::token::{Token, TokenType};

/// HTML elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true for HTML void element names (ASCII case-insensitive).
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Token adapter that closes HTML void elements.
///
/// Sits between the tokenizer and the tree builder in HTML mode. After the
/// name of an un-prefixed void element (`<br>`, `<img src="...">`) it lets the
/// tag's attributes through and, unless the element is already closed by
/// `/>` or a matching `</name>`, inserts a synthetic `ELEM_END` before the
/// next token. The grammar is unaware of this step.
pub struct VoidElements<I> {
    inner: I,
    pending: VecDeque<Token>,
    /// Name and line of the void element whose tag is being read.
    open_void: Option<(String, usize)>,
    /// The element being opened has a namespace prefix.
    prefixed: bool,
}

impl<I: Iterator<Item = Token>> VoidElements<I> {
    /// Wrap a token stream.
    #[must_use]
    pub const fn new(inner: I) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
            open_void: None,
            prefixed: false,
        }
    }

    /// Track element names so void elements can be recognized.
    fn observe(&mut self, token: &Token) {
        match token.token_type {
            TokenType::ElemStart => self.prefixed = false,
            TokenType::ElemNs => self.prefixed = true,
            TokenType::ElemName => {
                if let Some(name) = token.value()
                    && !self.prefixed
                    && is_void_element(name)
                {
                    self.open_void = Some((name.to_string(), token.line));
                }
                self.prefixed = false;
            }
            _ => {}
        }
    }

    /// Whether `token` closes the open void element itself.
    fn closes(token: &Token, name: &str) -> bool {
        token.token_type == TokenType::ElemEnd
            && token.value().is_none_or(|end| end.eq_ignore_ascii_case(name))
    }
}

impl<I: Iterator<Item = Token>> Iterator for VoidElements<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        let token = self.inner.next()?;
        let Some((name, line)) = self.open_void.take() else {
            self.observe(&token);
            return Some(token);
        };

        match token.token_type {
            TokenType::Attr | TokenType::String => {
                self.open_void = Some((name, line));
                Some(token)
            }
            _ if Self::closes(&token, &name) => Some(token),
            _ => {
                self.observe(&token);
                self.pending.push_back(token);
                Some(Token::with_value(TokenType::ElemEnd, name, line))
            }
        }
    }
}
