//! XML/HTML tokenizer and tree builder for the Marmot markup parser.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** - a pull-based state machine producing typed, line-tagged
//!   tokens for text, tags, attributes, comments, CDATA sections, doctypes and
//!   XML declarations
//! - **Void element adapter** - closes HTML void elements in HTML mode
//! - **Tree builder** - a grammar-driven reducer with an explicit stack of
//!   open elements, building a `marmot-dom` tree and linking parent/sibling
//!   references
//! - **Issues** - recoverable oddities collected per parse as [`ParseIssue`]s
//! - **Error reporter** - one fatal [`ParseError`] with line number and a
//!   window of surrounding source
//!
//! # Not Implemented
//!
//! - Entity and character reference decoding
//! - Namespace URI resolution
//! - Serialization back to markup
//! - Encoding detection
//! - Error recovery: the first grammar violation ends the parse

/// Recoverable issues collected during a parse.
pub mod issue;
/// Tree construction and parse errors.
pub mod parser;
/// Markup tokenizer for converting input into tokens.
pub mod tokenizer;

pub use issue::ParseIssue;
pub use parser::{
    Construct, MarkupParser, ParseError, ParserOptions, TreeBuilder, UnexpectedToken, parse,
    parse_html, parse_with_options, print_tree,
};
pub use tokenizer::{MarkupTokenizer, Token, TokenType, TokenizerOptions, VoidElements, tokenize};
