//! # Lucerna
//!
//! A small embeddable full-text search engine for Rust.
//!
//! ## Features
//!
//! - Inverted index with positional and offset information
//! - Per-document term vectors
//! - Boolean, phrase, and span (proximity) queries
//! - TF-IDF scoring with deterministic ranking
//! - Fragment highlighting of stored field text
//! - Pluggable storage backends (file, memory)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lucerna::analysis::StandardAnalyzer;
//! use lucerna::document::Document;
//! use lucerna::index::IndexWriter;
//! use lucerna::query::parser::QueryParser;
//! use lucerna::search::Searcher;
//! use lucerna::storage::memory::MemoryStorage;
//!
//! # fn main() -> lucerna::error::Result<()> {
//! let storage = Arc::new(MemoryStorage::new());
//! let analyzer = Arc::new(StandardAnalyzer::new());
//!
//! let writer = IndexWriter::new(storage.clone(), analyzer.clone())?;
//! writer.add_document(
//!     Document::builder()
//!         .text("content", "the quick brown fox")
//!         .keyword("path", "/docs/fox.txt")
//!         .build(),
//! )?;
//! let segment = writer.commit()?;
//!
//! let searcher = Searcher::new(Arc::new(segment), analyzer.clone());
//! let query = QueryParser::new("content", analyzer).parse("quick")?;
//! let hits = searcher.search(&query, 10)?;
//! assert_eq!(hits[0].doc_id, 0);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod document;
pub mod error;
pub mod highlight;
pub mod index;
pub mod ingest;
pub mod query;
pub mod search;
pub mod storage;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
