use std::fmt;

use serde::Serialize;

/// A recoverable oddity met while tokenizing or building a tree.
///
/// Issues never stop a parse. Each parse keeps its own list, so the same
/// input always reports the same issues no matter what was parsed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    /// What was noticed.
    pub message: String,
    /// Line the issue was found on (1-based).
    pub line: usize,
}

impl ParseIssue {
    /// Create an issue found on `line`.
    #[must_use]
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
