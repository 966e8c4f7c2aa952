//! Tokenizer implementations.
//!
//! Tokenizers split input text into tokens. They are deterministic and
//! restartable: tokenizing the same text twice produces identical output,
//! and no input string is an error (the worst case is an empty stream).
//!
//! # Examples
//!
//! ```
//! use lucerna::analysis::{StandardTokenizer, Token, Tokenizer};
//!
//! let tokenizer = StandardTokenizer::new();
//! let tokens: Vec<Token> = tokenizer.tokenize("Hello, world!").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "Hello");
//! assert_eq!(tokens[1].position, 1);
//! ```

use regex::Regex;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{LucernaError, Result};

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so tokenizers can be shared across
/// concurrent readers.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    ///
    /// Never fails on malformed text; any string tokenizes to a (possibly
    /// empty) sequence.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A tokenizer that splits text on non-alphanumeric boundaries.
///
/// Positions are assigned sequentially starting at 0, and offsets are byte
/// offsets into the original input.
#[derive(Clone, Debug, Default)]
pub struct StandardTokenizer;

impl StandardTokenizer {
    /// Create a new standard tokenizer.
    pub fn new() -> Self {
        StandardTokenizer
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0u32;
        let mut start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            if ch.is_alphanumeric() {
                if start.is_none() {
                    start = Some(idx);
                }
            } else if let Some(s) = start.take() {
                tokens.push(Token::new(&text[s..idx], position, s as u32, idx as u32));
                position += 1;
            }
        }

        if let Some(s) = start {
            tokens.push(Token::new(
                &text[s..],
                position,
                s as u32,
                text.len() as u32,
            ));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

/// A tokenizer that treats the entire input as a single token.
///
/// Used for keyword fields where the whole value is one literal term.
#[derive(Clone, Debug, Default)]
pub struct WholeTokenizer;

impl WholeTokenizer {
    /// Create a new whole tokenizer.
    pub fn new() -> Self {
        WholeTokenizer
    }
}

impl Tokenizer for WholeTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let token = Token::new(text, 0, 0, text.len() as u32);
        Ok(Box::new(std::iter::once(token)))
    }

    fn name(&self) -> &'static str {
        "whole"
    }
}

/// A tokenizer that extracts tokens matching a regular expression.
///
/// Useful when the unit of indexing is not a plain word, e.g. identifiers
/// with embedded punctuation or version strings.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    /// Create a tokenizer from a regex pattern. Each match becomes one
    /// token.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| LucernaError::analysis(format!("invalid token pattern: {e}")))?;
        Ok(RegexTokenizer { pattern })
    }

    /// The pattern this tokenizer matches.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, found)| {
                Token::new(
                    found.as_str(),
                    position as u32,
                    found.start() as u32,
                    found.end() as u32,
                )
            })
            .collect();
        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tokenizer_splits_on_punctuation() {
        let tokenizer = StandardTokenizer::new();
        let tokens: Vec<Token> = tokenizer
            .tokenize("The quick-brown fox, jumps!")
            .unwrap()
            .collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "quick", "brown", "fox", "jumps"]);

        let positions: Vec<u32> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_standard_tokenizer_offsets() {
        let tokenizer = StandardTokenizer::new();
        let text = "hello world";
        let tokens: Vec<Token> = tokenizer.tokenize(text).unwrap().collect();

        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 5);
        assert_eq!(tokens[1].start_offset, 6);
        assert_eq!(tokens[1].end_offset, 11);
        assert_eq!(&text[6..11], "world");
    }

    #[test]
    fn test_standard_tokenizer_empty_and_symbols() {
        let tokenizer = StandardTokenizer::new();
        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
        assert_eq!(tokenizer.tokenize("!!! --- ...").unwrap().count(), 0);
    }

    #[test]
    fn test_standard_tokenizer_deterministic() {
        let tokenizer = StandardTokenizer::new();
        let a: Vec<Token> = tokenizer.tokenize("a b c a").unwrap().collect();
        let b: Vec<Token> = tokenizer.tokenize("a b c a").unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_whole_tokenizer() {
        let tokenizer = WholeTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("/var/data/file.txt").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "/var/data/file.txt");
        assert_eq!(tokens[0].position, 0);

        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
    }

    #[test]
    fn test_regex_tokenizer() {
        let tokenizer = RegexTokenizer::new(r"[\w.]+").unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("serde 1.0.219, regex").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["serde", "1.0.219", "regex"]);
        assert_eq!(tokens[1].start_offset, 6);
        assert_eq!(tokens[1].end_offset, 13);
    }

    #[test]
    fn test_regex_tokenizer_invalid_pattern() {
        assert!(RegexTokenizer::new("[unclosed").is_err());
    }

    #[test]
    fn test_tokenizer_names() {
        assert_eq!(StandardTokenizer::new().name(), "standard");
        assert_eq!(WholeTokenizer::new().name(), "whole");
        assert_eq!(RegexTokenizer::new(r"\w+").unwrap().name(), "regex");
    }
}
