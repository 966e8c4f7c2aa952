//! Index construction and segment storage.
//!
//! The [`IndexWriter`] accumulates postings, term vectors, and stored
//! fields in memory, then freezes them into an immutable [`Segment`] at
//! commit. A segment is the unit of persistence: three checksummed binary
//! files plus a commit marker, reopenable by a reader without the writer.

pub mod doc_store;
pub mod postings;
pub mod segment;
pub mod term_vector;
pub mod writer;

pub use self::doc_store::DocumentStore;
pub use self::postings::{InvertedIndex, Posting, PostingList, Term};
pub use self::segment::Segment;
pub use self::term_vector::{TermVector, TermVectorEntry, TermVectors};
pub use self::writer::IndexWriter;
