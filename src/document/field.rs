//! Field values and indexing options.
//!
//! # Field kinds
//!
//! Two option presets cover the common cases:
//!
//! - [`FieldOptions::text`]: full-text content, indexed, tokenized,
//!   stored, with a term vector recording positions and offsets. This is
//!   what phrase queries, span queries, and the highlighter rely on.
//! - [`FieldOptions::keyword`]: a literal string such as a path or file
//!   name, indexed as a single untokenized term and stored.
//!
//! ```
//! use lucerna::document::{Field, FieldOptions};
//!
//! let content = Field::text("content", "the quick brown fox");
//! assert!(content.options.store_term_vectors);
//!
//! let path = Field::keyword("path", "/docs/fox.txt");
//! assert!(!path.options.tokenized);
//! ```

use serde::{Deserialize, Serialize};

/// A value stored in a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// String data.
    Text(String),
    /// Raw byte data. Never indexed, only stored.
    Binary(Vec<u8>),
}

impl FieldValue {
    /// Get the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Binary(_) => None,
        }
    }

    /// Get the value as bytes, if it is binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(b) => Some(b),
            FieldValue::Text(_) => None,
        }
    }
}

/// Options controlling how a field is indexed and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Whether the raw value is kept in the document store.
    pub stored: bool,
    /// Whether the value is indexed at all.
    pub indexed: bool,
    /// Whether the value is tokenized; untokenized indexed fields are
    /// treated as a single literal term.
    pub tokenized: bool,
    /// Whether a per-document term vector is recorded for this field.
    pub store_term_vectors: bool,
    /// Whether token positions are recorded in postings and term vectors.
    pub store_positions: bool,
    /// Whether byte offsets are recorded in postings and term vectors.
    pub store_offsets: bool,
}

impl FieldOptions {
    /// Options for full-text content fields: indexed, tokenized, stored,
    /// with a positional term vector including offsets.
    pub fn text() -> Self {
        FieldOptions {
            stored: true,
            indexed: true,
            tokenized: true,
            store_term_vectors: true,
            store_positions: true,
            store_offsets: true,
        }
    }

    /// Options for keyword fields: the whole value is one literal term,
    /// indexed and stored.
    pub fn keyword() -> Self {
        FieldOptions {
            stored: true,
            indexed: true,
            tokenized: false,
            store_term_vectors: false,
            store_positions: false,
            store_offsets: false,
        }
    }

    /// Options for stored-only fields: never indexed.
    pub fn stored_only() -> Self {
        FieldOptions {
            stored: true,
            indexed: false,
            tokenized: false,
            store_term_vectors: false,
            store_positions: false,
            store_offsets: false,
        }
    }

    /// Disable storing the raw value.
    pub fn without_stored(mut self) -> Self {
        self.stored = false;
        self
    }

    /// Disable the term vector.
    pub fn without_term_vectors(mut self) -> Self {
        self.store_term_vectors = false;
        self
    }
}

/// A named field: a value plus its indexing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The field name.
    pub name: String,
    /// The field value.
    pub value: FieldValue,
    /// The field indexing options.
    pub options: FieldOptions,
}

impl Field {
    /// Create a field with explicit options.
    pub fn new<N: Into<String>>(name: N, value: FieldValue, options: FieldOptions) -> Self {
        Field {
            name: name.into(),
            value,
            options,
        }
    }

    /// Create a full-text content field.
    pub fn text<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Field::new(name, FieldValue::Text(value.into()), FieldOptions::text())
    }

    /// Create a keyword field.
    pub fn keyword<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Field::new(name, FieldValue::Text(value.into()), FieldOptions::keyword())
    }

    /// Create a stored-only field.
    pub fn stored<N: Into<String>>(name: N, value: FieldValue) -> Self {
        Field::new(name, value, FieldOptions::stored_only())
    }
}
