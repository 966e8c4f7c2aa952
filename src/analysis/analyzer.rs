//! Analyzer implementations.
//!
//! An analyzer combines a tokenizer with term normalization. The writer,
//! searcher, and highlighter all take an analyzer value at construction so
//! that indexing and query analysis stay consistent.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer, WholeTokenizer};
use crate::error::Result;

/// Trait for analyzers that produce normalized token streams.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text into a stream of normalized tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &'static str;
}

/// The default analyzer: standard tokenization plus lowercasing.
#[derive(Clone, Debug, Default)]
pub struct StandardAnalyzer {
    tokenizer: StandardTokenizer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer.
    pub fn new() -> Self {
        StandardAnalyzer {
            tokenizer: StandardTokenizer::new(),
        }
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let tokens = self.tokenizer.tokenize(text)?;
        Ok(Box::new(tokens.map(|mut token: Token| {
            if token.text.chars().any(char::is_uppercase) {
                token.text = token.text.to_lowercase();
            }
            token
        })))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

/// An analyzer that emits the whole input as a single unmodified token.
///
/// Keyword fields are matched on the exact literal value, so no
/// lowercasing is applied.
#[derive(Clone, Debug, Default)]
pub struct KeywordAnalyzer {
    tokenizer: WholeTokenizer,
}

impl KeywordAnalyzer {
    /// Create a new keyword analyzer.
    pub fn new() -> Self {
        KeywordAnalyzer {
            tokenizer: WholeTokenizer::new(),
        }
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_analyzer_lowercases() {
        let analyzer = StandardAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("The QUICK Fox").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "quick", "fox"]);
    }

    #[test]
    fn test_standard_analyzer_preserves_offsets() {
        let analyzer = StandardAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("Hello World").unwrap().collect();

        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 5);
        assert_eq!(tokens[1].start_offset, 6);
    }

    #[test]
    fn test_keyword_analyzer_exact() {
        let analyzer = KeywordAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("/Docs/File.TXT").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "/Docs/File.TXT");
    }
}
