//! Markup parser module for tree construction.

/// Grammar-driven tree builder.
pub mod core;
/// Parse errors and their rendering.
pub mod error;

pub use self::core::{TreeBuilder, print_tree};
pub use error::{Construct, ParseError, UnexpectedToken, render_context, token_phrase};

use marmot_dom::DomTree;

use crate::issue::ParseIssue;
use crate::tokenizer::{MarkupTokenizer, TokenizerOptions, VoidElements};

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Permissive HTML mode. Void elements (`<br>`, `<img>`, ...) are closed
    /// by an adapter between the tokenizer and the tree builder; everything
    /// else parses exactly as in strict XML mode.
    pub html: bool,
}

impl ParserOptions {
    /// Strict XML parsing.
    #[must_use]
    pub const fn xml() -> Self {
        Self { html: false }
    }

    /// Permissive HTML parsing.
    #[must_use]
    pub const fn html() -> Self {
        Self { html: true }
    }
}

impl From<ParserOptions> for TokenizerOptions {
    fn from(options: ParserOptions) -> Self {
        Self { html: options.html }
    }
}

/// Tokenizer and tree builder for one source text.
///
/// [`MarkupParser::parse`] always starts from the beginning of the input, so
/// the same instance can parse its source any number of times, or be handed
/// a new source with [`MarkupParser::parse_source`].
///
/// Recoverable issues of the last parse are kept on the parser and read with
/// [`MarkupParser::issues`].
pub struct MarkupParser {
    options: ParserOptions,
    tokenizer: MarkupTokenizer,
    issues: Vec<ParseIssue>,
}

impl MarkupParser {
    /// Create a parser for `source`.
    #[must_use]
    pub fn new(source: impl Into<String>, options: ParserOptions) -> Self {
        Self {
            options,
            tokenizer: MarkupTokenizer::new(source, options.into()),
            issues: Vec::new(),
        }
    }

    /// The options this parser was built with.
    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// The source text this parser reads.
    #[must_use]
    pub fn source(&self) -> &str {
        self.tokenizer.input()
    }

    /// Issues noticed by the tokenizer and the tree builder during the last
    /// parse, ordered by line. Empty before the first parse.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Rewind the tokenizer to the start of the source and forget the
    /// issues of the last parse.
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.issues.clear();
    }

    /// Parse the source into a tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for the first token the grammar rejects.
    /// No partial tree is returned.
    pub fn parse(&mut self) -> Result<DomTree, ParseError> {
        self.reset();
        let (result, builder_issues) = if self.options.html {
            TreeBuilder::new(VoidElements::new(&mut self.tokenizer)).build_with_issues()
        } else {
            TreeBuilder::new(&mut self.tokenizer).build_with_issues()
        };

        self.issues = self.tokenizer.issues().to_vec();
        self.issues.extend(builder_issues);
        // Stable, so issues on one line keep tokenizer-then-builder order
        self.issues.sort_by_key(|issue| issue.line);

        result.map_err(|unexpected| unexpected.into_parse_error(self.tokenizer.input()))
    }

    /// Replace the source and parse it.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for the first token the grammar rejects.
    pub fn parse_source(&mut self, source: impl Into<String>) -> Result<DomTree, ParseError> {
        self.tokenizer.set_input(source);
        self.parse()
    }
}

/// Parse strict XML.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first token the grammar rejects.
pub fn parse(source: &str) -> Result<DomTree, ParseError> {
    parse_with_options(source, ParserOptions::xml())
}

/// Parse permissive HTML.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first token the grammar rejects.
pub fn parse_html(source: &str) -> Result<DomTree, ParseError> {
    parse_with_options(source, ParserOptions::html())
}

/// Parse with explicit options.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first token the grammar rejects.
pub fn parse_with_options(source: &str, options: ParserOptions) -> Result<DomTree, ParseError> {
    MarkupParser::new(source, options).parse()
}
