//! Document and field model.
//!
//! A [`Document`] is an ordered collection of [`Field`]s. Each field pairs a
//! name and value with [`FieldOptions`] controlling how the writer treats
//! it: whether the value is stored, indexed, tokenized, and whether a term
//! vector with positions and offsets is recorded for it.

pub mod document;
pub mod field;

pub use self::document::{Document, DocumentBuilder};
pub use self::field::{Field, FieldOptions, FieldValue};

/// Identifier of a document within a segment.
///
/// Assigned by the index writer: 0-based, strictly increasing, never
/// reused within a writer session.
pub type DocId = u32;
