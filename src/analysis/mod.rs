//! Text analysis: tokenization and analyzers.
//!
//! Analysis is the first stage of the indexing pipeline. A [`Tokenizer`]
//! splits raw text into [`Token`]s carrying positions and byte offsets, and
//! an [`Analyzer`] wraps a tokenizer with normalization (lowercasing).
//!
//! Analyzers are plain values passed explicitly into writer, searcher, and
//! highlighter construction. There is no process-wide analyzer instance.

pub mod analyzer;
pub mod token;
pub mod tokenizer;

pub use self::analyzer::{Analyzer, KeywordAnalyzer, StandardAnalyzer};
pub use self::token::{Token, TokenStream};
pub use self::tokenizer::{RegexTokenizer, StandardTokenizer, Tokenizer, WholeTokenizer};
