//! Stored field retrieval.
//!
//! The document store keeps the raw values of stored fields, addressed by
//! document id. Field order within a document is preserved and duplicate
//! field names are allowed, so `get_values` can return every value a
//! multi-valued field was given.

use crate::document::{DocId, FieldValue};
use crate::error::{LucernaError, Result};
use crate::storage::structured::{StructReader, StructWriter};

/// Magic number identifying a stored fields file ("LSTO").
const STORE_MAGIC: u32 = 0x4C53_544F;
/// Stored fields file format version.
const STORE_VERSION: u32 = 1;

/// Stored fields for every document in a segment.
///
/// Documents are appended in doc id order; doc id N is the N-th entry.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<Vec<(String, FieldValue)>>,
}

impl DocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        DocumentStore::default()
    }

    /// Append the stored fields of the next document and return its doc id.
    pub fn add(&mut self, fields: Vec<(String, FieldValue)>) -> DocId {
        let doc_id = self.docs.len() as DocId;
        self.docs.push(fields);
        doc_id
    }

    /// Get the stored fields of a document, in original field order.
    pub fn get(&self, doc_id: DocId) -> Option<&[(String, FieldValue)]> {
        self.docs.get(doc_id as usize).map(Vec::as_slice)
    }

    /// Get every stored value of one field of a document.
    pub fn get_values(&self, doc_id: DocId, field: &str) -> Vec<&FieldValue> {
        self.get(doc_id)
            .map(|fields| {
                fields
                    .iter()
                    .filter(|(name, _)| name == field)
                    .map(|(_, value)| value)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the first stored value of one field of a document.
    pub fn get_first(&self, doc_id: DocId, field: &str) -> Option<&FieldValue> {
        self.get(doc_id)?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Number of documents in the store.
    pub fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    /// Write the store to a segment file.
    pub fn encode(&self, writer: &mut StructWriter) -> Result<()> {
        writer.write_u32(STORE_MAGIC)?;
        writer.write_u32(STORE_VERSION)?;
        writer.write_varint(self.docs.len() as u64)?;

        for fields in &self.docs {
            let bytes = serde_json::to_vec(fields)?;
            writer.write_bytes(&bytes)?;
        }

        Ok(())
    }

    /// Read a store from a segment file.
    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let magic = reader.read_u32()?;
        if magic != STORE_MAGIC {
            return Err(LucernaError::index("invalid stored fields file format"));
        }
        let version = reader.read_u32()?;
        if version != STORE_VERSION {
            return Err(LucernaError::index(format!(
                "unsupported stored fields version: {version}"
            )));
        }

        let doc_count = reader.read_varint()? as usize;
        let mut docs = Vec::with_capacity(doc_count);
        for _ in 0..doc_count {
            let bytes = reader.read_raw_bytes()?;
            docs.push(serde_json::from_slice(&bytes)?);
        }

        Ok(DocumentStore { docs })
    }
}
