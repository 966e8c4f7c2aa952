//! Searching a committed segment.
//!
//! A [`Searcher`] evaluates [`Query`](crate::query::Query) values against
//! one [`Segment`](crate::index::Segment), scores matches with TF-IDF, and
//! returns deterministically ordered [`Hit`]s.

pub mod collector;
pub mod scorer;
pub mod searcher;

pub use self::collector::{Hit, TopDocsCollector};
pub use self::scorer::TfIdfScorer;
pub use self::searcher::{Searcher, SpanMatch};
