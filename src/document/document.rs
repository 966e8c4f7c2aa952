//! Document structure.

use serde::{Deserialize, Serialize};

use crate::document::field::{Field, FieldValue};

/// A document is an ordered sequence of fields to be indexed.
///
/// Fields keep their insertion order and the same name may appear more
/// than once. A document is owned exclusively by the index writer once
/// added; after commit its stored fields live in the segment's document
/// store and are immutable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document { fields: Vec::new() }
    }

    /// Add a field to the document.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Get all fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get the first field with the given name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get all values for the given field name.
    pub fn get_values(&self, name: &str) -> Vec<&FieldValue> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .map(|f| &f.value)
            .collect()
    }

    /// Check if the document has a field with the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Add a full-text content field.
    pub fn text<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.document.add_field(Field::text(name, value));
        self
    }

    /// Add a keyword field.
    pub fn keyword<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.document.add_field(Field::keyword(name, value));
        self
    }

    /// Add a stored-only field.
    pub fn stored<N: Into<String>>(mut self, name: N, value: FieldValue) -> Self {
        self.document.add_field(Field::stored(name, value));
        self
    }

    /// Add a field with explicit options.
    pub fn field(mut self, field: Field) -> Self {
        self.document.add_field(field);
        self
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        self.document
    }
}
