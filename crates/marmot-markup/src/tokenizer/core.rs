use std::collections::VecDeque;
use std::io::{self, Read};

use strum_macros::Display;

use super::token::{Token, TokenType};
use crate::issue::ParseIssue;

/// The tokenizer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Character data between constructs. The initial state.
    Text,
    /// After `<`, reading the element name.
    TagName,
    /// After `</`, reading up to `>`.
    EndTagName,
    /// Inside a start tag or XML declaration, between attributes.
    BeforeAttributeName,
    /// Reading an attribute name.
    AttributeName,
    /// After an attribute name, looking for `=`.
    AfterAttributeName,
    /// After `=`, looking for the start of the value.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// After `/` inside a start tag.
    SelfClosingStartTag,
    /// After `<!--`, up to `-->`.
    CommentBody,
    /// After `<![CDATA[`, up to `]]>`.
    CdataBody,
    /// After `<!DOCTYPE`.
    BeforeDoctypeName,
    /// Reading the doctype name.
    DoctypeName,
    /// Between doctype parts.
    AfterDoctypeName,
    /// Reading a doctype keyword such as `PUBLIC`.
    DoctypeKeyword,
    /// Inside a `"..."` doctype identifier.
    DoctypeIdentifierDoubleQuoted,
    /// Inside a `'...'` doctype identifier.
    DoctypeIdentifierSingleQuoted,
}

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Permissive HTML mode. Tokenization itself is identical in both modes;
    /// the flag travels with the tokenizer so the tree builder can pick its
    /// HTML-specific token adapters.
    pub html: bool,
}

/// Pull-based tokenizer for XML and HTML markup.
///
/// Each call to [`MarkupTokenizer::advance`] runs the state machine until at
/// least one token is ready and returns the oldest one. Once the input is
/// exhausted every further call returns `END_OF_INPUT`. The tokenizer never
/// fails: unterminated constructs simply end in `END_OF_INPUT`, and it is the
/// tree builder that reports the missing closing token.
pub struct MarkupTokenizer {
    pub(super) options: TokenizerOptions,
    pub(super) state: TokenizerState,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    // When true, the next step will not consume a new character.
    pub(super) reconsume: bool,

    /// Line of the next character to be consumed.
    pub(super) line: usize,
    /// Line of `current_input_character`.
    pub(super) current_line: usize,
    /// Line on which the contents of `buffer` started.
    pub(super) token_line: usize,
    /// Line of the last token emitted; `END_OF_INPUT` is stamped with it.
    pub(super) last_token_line: usize,
    /// Text, name or value being accumulated for the next token.
    pub(super) buffer: String,

    /// Inside `<?xml ... ?>` rather than a start tag.
    pub(super) in_xml_decl: bool,
    pub(super) at_eof: bool,
    /// Set once the iterator has yielded `END_OF_INPUT`.
    finished: bool,
    pub(super) token_stream: VecDeque<Token>,
    /// Recoverable oddities met since the last reset.
    pub(super) issues: Vec<ParseIssue>,
}

impl MarkupTokenizer {
    /// Create a new tokenizer for the given input.
    #[must_use]
    pub fn new(input: impl Into<String>, options: TokenizerOptions) -> Self {
        Self {
            options,
            state: TokenizerState::Text,
            input: input.into(),
            current_pos: 0,
            current_input_character: None,
            reconsume: false,
            line: 1,
            current_line: 1,
            token_line: 1,
            last_token_line: 1,
            buffer: String::new(),
            in_xml_decl: false,
            at_eof: false,
            finished: false,
            token_stream: VecDeque::new(),
            issues: Vec::new(),
        }
    }

    /// Create a tokenizer over everything `reader` produces.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if reading fails or the data is not UTF-8.
    pub fn from_reader<R: Read>(mut reader: R, options: TokenizerOptions) -> io::Result<Self> {
        let mut input = String::new();
        let _ = reader.read_to_string(&mut input)?;
        Ok(Self::new(input, options))
    }

    /// The options this tokenizer was built with.
    #[must_use]
    pub const fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// The source text being tokenized.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The current state of the state machine.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Recoverable oddities met since the last reset, in input order.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Return to the start of the input: line 1, text state, nothing queued.
    pub fn reset(&mut self) {
        self.state = TokenizerState::Text;
        self.current_pos = 0;
        self.current_input_character = None;
        self.reconsume = false;
        self.line = 1;
        self.current_line = 1;
        self.token_line = 1;
        self.last_token_line = 1;
        self.buffer.clear();
        self.in_xml_decl = false;
        self.at_eof = false;
        self.finished = false;
        self.token_stream.clear();
        self.issues.clear();
    }

    /// Replace the input and reset.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.reset();
    }

    /// Produce the next token.
    pub fn advance(&mut self) -> Token {
        loop {
            if let Some(token) = self.token_stream.pop_front() {
                return token;
            }
            if self.at_eof {
                return Token::end_of_input(self.last_token_line);
            }
            self.step();
        }
    }

    /// Consume the tokenizer and return every remaining token, including the
    /// final `END_OF_INPUT`.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.collect()
    }

    /// Run one transition of the state machine.
    fn step(&mut self) {
        // Each state begins by consuming the next input character,
        // unless we're reconsuming from a previous state transition.
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.consume();
        }

        match self.state {
            TokenizerState::Text => self.handle_text_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::EndTagName => self.handle_end_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => self.handle_attribute_value_quoted_state('"'),
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'');
            }
            TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::CommentBody => self.handle_comment_body_state(),
            TokenizerState::CdataBody => self.handle_cdata_body_state(),
            TokenizerState::BeforeDoctypeName => self.handle_before_doctype_name_state(),
            TokenizerState::DoctypeName => self.handle_doctype_name_state(),
            TokenizerState::AfterDoctypeName => self.handle_after_doctype_name_state(),
            TokenizerState::DoctypeKeyword => self.handle_doctype_keyword_state(),
            TokenizerState::DoctypeIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_state('"');
            }
            TokenizerState::DoctypeIdentifierSingleQuoted => {
                self.handle_doctype_identifier_state('\'');
            }
        }
    }

    fn handle_text_state(&mut self) {
        match self.current_input_character {
            Some('<') => self.handle_markup_open(),
            None => {
                self.flush_text();
                self.emit_eof_token();
            }
            Some(c) => self.append(c),
        }
    }

    /// Decide what a `<` in text opens. The `<` itself has been consumed.
    fn handle_markup_open(&mut self) {
        if self.next_few_characters_are("!--") {
            self.begin_markup();
            self.consume_string("!--");
            self.emit(TokenType::CommentStart);
            self.switch_to(TokenizerState::CommentBody);
        } else if self.next_few_characters_are("![CDATA[") {
            self.begin_markup();
            self.consume_string("![CDATA[");
            self.emit(TokenType::CdataStart);
            self.switch_to(TokenizerState::CdataBody);
        } else if self.next_few_characters_are_case_insensitive("!DOCTYPE") {
            self.begin_markup();
            self.consume_string("!DOCTYPE");
            self.emit(TokenType::DoctypeStart);
            self.switch_to(TokenizerState::BeforeDoctypeName);
        } else if self.next_few_characters_are("?xml")
            && self
                .peek_codepoint(4)
                .is_some_and(|c| c == '?' || Self::is_whitespace_char(c))
        {
            self.begin_markup();
            self.consume_string("?xml");
            self.emit(TokenType::XmlDeclStart);
            self.in_xml_decl = true;
            self.switch_to(TokenizerState::BeforeAttributeName);
        } else if self.next_few_characters_are("/") {
            self.begin_markup();
            self.consume_string("/");
            self.switch_to(TokenizerState::EndTagName);
        } else if self.peek_codepoint(0).is_some_and(Self::is_name_start_char) {
            self.begin_markup();
            self.emit(TokenType::ElemStart);
            self.switch_to(TokenizerState::TagName);
        } else {
            self.warn("'<' does not open any markup; treated as text");
            self.append('<');
        }
    }

    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.emit_element_name();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => {
                self.emit_element_name();
                self.token_line = self.current_line;
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.emit_element_name();
                self.switch_to(TokenizerState::Text);
            }
            None => {
                self.emit_element_name();
                self.emit_eof_token();
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_end_tag_name_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                let name = self.take_buffer();
                let name = name.trim();
                if name.is_empty() {
                    self.emit(TokenType::ElemEnd);
                } else {
                    self.emit_value(TokenType::ElemEnd, name.to_string());
                }
                self.switch_to(TokenizerState::Text);
            }
            None => self.emit_eof_token(),
            Some(c) => self.append(c),
        }
    }

    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('?') if self.in_xml_decl && self.next_few_characters_are(">") => {
                self.token_line = self.current_line;
                self.consume_string(">");
                self.emit(TokenType::XmlDeclEnd);
                self.in_xml_decl = false;
                self.switch_to(TokenizerState::Text);
            }
            Some('/') if !self.in_xml_decl => {
                self.token_line = self.current_line;
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                if self.in_xml_decl {
                    self.warn("XML declaration closed with '>' instead of '?>'");
                    self.in_xml_decl = false;
                }
                self.switch_to(TokenizerState::Text);
            }
            None => self.emit_eof_token(),
            Some(_) => self.reconsume_in(TokenizerState::AttributeName),
        }
    }

    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.emit_buffer(TokenType::Attr);
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('=') if !self.buffer.is_empty() => {
                self.emit_buffer(TokenType::Attr);
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            Some('/') if !self.in_xml_decl => {
                self.emit_buffer(TokenType::Attr);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some('>') | None => {
                self.emit_buffer(TokenType::Attr);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some('?') if self.in_xml_decl && self.next_few_characters_are(">") => {
                self.emit_buffer(TokenType::Attr);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            _ => self.reconsume_in(TokenizerState::BeforeAttributeName),
        }
    }

    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => {
                self.begin_quoted();
                self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            Some('\'') => {
                self.begin_quoted();
                self.switch_to(TokenizerState::AttributeValueSingleQuoted);
            }
            Some('>') | None => self.reconsume_in(TokenizerState::BeforeAttributeName),
            Some(_) => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => {
                self.emit_string();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            None => self.emit_eof_token(),
            Some(c) => self.buffer.push(c),
        }
    }

    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.emit_string();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if !self.in_xml_decl && self.next_few_characters_are(">") => {
                self.emit_string();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some('?') if self.in_xml_decl && self.next_few_characters_are(">") => {
                self.emit_string();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some('>') | None => {
                self.emit_string();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.emit(TokenType::ElemEnd);
                self.switch_to(TokenizerState::Text);
            }
            _ => {
                self.warn("'/' is not followed by '>'; ignored");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// A dash run closes the comment only when it is at least `--` and is
    /// immediately followed by `>`. Any other dash run becomes its own body
    /// fragment, so `-` and `--` inside a comment never end it.
    fn handle_comment_body_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                let run = 1 + self.count_ahead('-');
                if run >= 2 && self.peek_codepoint(run - 1) == Some('>') {
                    for _ in 2..run {
                        self.append('-');
                    }
                    self.flush_as(TokenType::CommentBody);
                    self.token_line = self.current_line;
                    self.skip_ahead(run);
                    self.emit(TokenType::CommentEnd);
                    self.switch_to(TokenizerState::Text);
                } else {
                    self.flush_as(TokenType::CommentBody);
                    self.token_line = self.current_line;
                    self.skip_ahead(run - 1);
                    self.emit_value(TokenType::CommentBody, "-".repeat(run));
                }
            }
            None => {
                self.flush_as(TokenType::CommentBody);
                self.emit_eof_token();
            }
            Some(c) => self.append(c),
        }
    }

    /// The body ends at the first `]]>`; any extra `]` before it is text.
    fn handle_cdata_body_state(&mut self) {
        match self.current_input_character {
            Some(']') => {
                let run = 1 + self.count_ahead(']');
                let closes = run >= 2 && self.peek_codepoint(run - 1) == Some('>');
                let literal = if closes { run - 2 } else { run };
                for _ in 0..literal {
                    self.append(']');
                }
                if closes {
                    self.flush_as(TokenType::Text);
                    self.token_line = self.current_line;
                    self.skip_ahead(run);
                    self.emit(TokenType::CdataEnd);
                    self.switch_to(TokenizerState::Text);
                } else {
                    self.skip_ahead(run - 1);
                }
            }
            None => {
                self.flush_as(TokenType::Text);
                self.emit_eof_token();
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => self.emit_doctype_end(),
            None => self.emit_eof_token(),
            Some(_) => self.reconsume_in(TokenizerState::DoctypeName),
        }
    }

    fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.emit_buffer(TokenType::DoctypeName);
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some('>') => {
                self.emit_buffer(TokenType::DoctypeName);
                self.emit_doctype_end();
            }
            None => {
                self.emit_buffer(TokenType::DoctypeName);
                self.emit_eof_token();
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => {
                self.begin_quoted();
                self.switch_to(TokenizerState::DoctypeIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.begin_quoted();
                self.switch_to(TokenizerState::DoctypeIdentifierSingleQuoted);
            }
            Some('>') => self.emit_doctype_end(),
            None => self.emit_eof_token(),
            Some(_) => self.reconsume_in(TokenizerState::DoctypeKeyword),
        }
    }

    fn handle_doctype_keyword_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.emit_buffer(TokenType::DoctypeType);
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some('>' | '"' | '\'') | None => {
                self.emit_buffer(TokenType::DoctypeType);
                self.reconsume_in(TokenizerState::AfterDoctypeName);
            }
            Some(c) => self.append(c),
        }
    }

    fn handle_doctype_identifier_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => {
                self.emit_string();
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            None => self.emit_eof_token(),
            Some(c) => self.buffer.push(c),
        }
    }

    fn emit_doctype_end(&mut self) {
        self.token_line = self.current_line;
        self.emit(TokenType::DoctypeEnd);
        self.switch_to(TokenizerState::Text);
    }
}

impl Iterator for MarkupTokenizer {
    type Item = Token;

    /// Yields every token up to and including `END_OF_INPUT`, then `None`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.advance();
        if token.is_end_of_input() {
            self.finished = true;
        }
        Some(token)
    }
}

/// Tokenize `input` in one go.
#[must_use]
pub fn tokenize(input: &str, options: TokenizerOptions) -> Vec<Token> {
    MarkupTokenizer::new(input, options).into_tokens()
}
