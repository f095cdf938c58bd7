//! Helper functions for the markup tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling, with line counting
//! - Buffer and token emission
//! - Warnings for recoverable oddities

use marmot_common::warning::warn_once;

use super::core::{MarkupTokenizer, TokenizerState};
use super::token::{Token, TokenType};
use crate::issue::ParseIssue;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl MarkupTokenizer {
    /// Transitions to a new state. The next character will be consumed on the
    /// next step.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl MarkupTokenizer {
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    ///
    /// Every `\n` consumed here bumps the line counter, so line numbers stay
    /// exact inside comment, CDATA and attribute bodies too.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        self.current_line = self.line;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// Check if the next few characters match the target string using
    /// ASCII case-insensitive comparison.
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|next| next.eq_ignore_ascii_case(target))
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        // Safe for the ASCII, newline-free markers this is used with
        // ("!--", "![CDATA[", "!DOCTYPE", "?xml", ...).
        self.current_pos += target.len();
    }

    /// How many times `c` repeats starting at the current position.
    pub(super) fn count_ahead(&self, c: char) -> usize {
        self.input[self.current_pos..]
            .chars()
            .take_while(|&next| next == c)
            .count()
    }

    /// Consume `count` characters, keeping the line counter up to date.
    pub(super) fn skip_ahead(&mut self, count: usize) {
        for _ in 0..count {
            if self.consume().is_none() {
                break;
            }
        }
    }

    /// Whitespace separating tag and doctype parts.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\r' | '\x0C')
    }

    /// Characters that may follow `<` to open a start tag.
    pub(super) fn is_name_start_char(input_char: char) -> bool {
        input_char.is_alphabetic() || input_char == '_'
    }
}

// =============================================================================
// Buffer and Token Emission Helpers
// =============================================================================

impl MarkupTokenizer {
    /// Append a character to the buffer, remembering the line the buffer
    /// started on.
    pub(super) fn append(&mut self, c: char) {
        if self.buffer.is_empty() {
            self.token_line = self.current_line;
        }
        self.buffer.push(c);
    }

    /// Start a markup construct at the `<` just consumed. Pending text is
    /// flushed first.
    pub(super) fn begin_markup(&mut self) {
        self.flush_text();
        self.token_line = self.current_line;
    }

    /// Start a quoted value at the quote just consumed.
    pub(super) fn begin_quoted(&mut self) {
        self.buffer.clear();
        self.token_line = self.current_line;
    }

    pub(super) fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Emit the buffer as a token of `token_type`, if it holds anything.
    pub(super) fn flush_as(&mut self, token_type: TokenType) {
        if !self.buffer.is_empty() {
            let value = self.take_buffer();
            self.emit_value(token_type, value);
        }
    }

    /// Emit pending character data as a `TEXT` token.
    pub(super) fn flush_text(&mut self) {
        self.flush_as(TokenType::Text);
    }

    /// Emit a value-less token on the current token line.
    pub(super) fn emit(&mut self, token_type: TokenType) {
        self.last_token_line = self.token_line;
        self.token_stream
            .push_back(Token::new(token_type, self.token_line));
    }

    /// Emit a token carrying `value` on the current token line.
    pub(super) fn emit_value(&mut self, token_type: TokenType, value: String) {
        self.last_token_line = self.token_line;
        self.token_stream
            .push_back(Token::with_value(token_type, value, self.token_line));
    }

    /// Emit the buffer as a token of `token_type`, even when empty.
    pub(super) fn emit_buffer(&mut self, token_type: TokenType) {
        let value = self.take_buffer();
        self.emit_value(token_type, value);
    }

    /// Emit an attribute value or doctype identifier.
    pub(super) fn emit_string(&mut self) {
        self.emit_buffer(TokenType::String);
    }

    /// Emit the buffered tag name, split at the first `:` into a namespace
    /// prefix and a local name.
    pub(super) fn emit_element_name(&mut self) {
        let name = self.take_buffer();
        let split = name
            .split_once(':')
            .filter(|(prefix, local)| !prefix.is_empty() && !local.is_empty())
            .map(|(prefix, local)| (prefix.to_string(), local.to_string()));
        match split {
            Some((prefix, local)) => {
                self.emit_value(TokenType::ElemNs, prefix);
                self.emit_value(TokenType::ElemName, local);
            }
            None => self.emit_value(TokenType::ElemName, name),
        }
    }

    /// Emit the end-of-input marker. Nothing is emitted after it.
    ///
    /// It carries the line of the last real token, so trailing newlines
    /// never push it past the end of the document.
    pub(super) fn emit_eof_token(&mut self) {
        self.token_stream
            .push_back(Token::end_of_input(self.last_token_line));
        self.at_eof = true;
    }
}

// =============================================================================
// Warnings
// =============================================================================

impl MarkupTokenizer {
    /// Tokenizer oddities are never fatal. Each one is stored with its line
    /// for [`MarkupTokenizer::issues`] and logged through the marmot-common
    /// warning system, and tokenization continues.
    pub(super) fn warn(&mut self, message: &str) {
        warn_once("Tokenizer", message);
        self.issues.push(ParseIssue::new(message, self.current_line));
    }
}
