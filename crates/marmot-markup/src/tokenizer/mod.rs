//! Markup tokenizer module.
//!
//! Turns XML or HTML source into a pull-based stream of typed, line-tagged
//! tokens for the tree builder.

/// Markup tokenizer state machine implementation.
pub mod core;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;
/// Token adapter that closes HTML void elements.
pub mod void_elements;

pub use self::core::{MarkupTokenizer, TokenizerOptions, TokenizerState, tokenize};
pub use token::{Token, TokenType};
pub use void_elements::{VoidElements, is_void_element};
