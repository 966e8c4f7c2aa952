//! Token types for text analysis.
//!
//! A [`Token`] is the fundamental unit produced by tokenization: a term
//! string plus its position in the token stream and its byte offsets in the
//! original input. Positions are 0-based and strictly increasing within one
//! field value; offsets always refer to the unmodified input text, so a
//! highlighter can map a token back to the exact bytes it came from.
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::Token;
//!
//! let token = Token::new("hello", 0, 0, 5);
//! assert_eq!(token.text, "hello");
//! assert_eq!(token.position, 0);
//! assert_eq!(token.end_offset, 5);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token.
    pub text: String,

    /// The position of the token in the token stream (0-based).
    pub position: u32,

    /// The byte offset where this token starts in the original text.
    pub start_offset: u32,

    /// The byte offset where this token ends in the original text.
    pub end_offset: u32,
}

impl Token {
    /// Create a new token.
    pub fn new<S: Into<String>>(text: S, position: u32, start_offset: u32, end_offset: u32) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream is a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
