//! Immutable index segments.
//!
//! A committed index is one [`Segment`]: the inverted index, the term
//! vectors, and the document store, each in its own checksummed file, plus
//! a small commit marker. The marker is written last, so a crash between
//! files leaves no marker and the segment is simply not there; readers see
//! either the whole commit or nothing.

use std::sync::Arc;

use log::debug;

use crate::document::{DocId, FieldValue};
use crate::error::{LucernaError, Result};
use crate::index::doc_store::DocumentStore;
use crate::index::postings::{InvertedIndex, PostingList};
use crate::index::term_vector::{TermVector, TermVectors};
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

/// Postings file name.
pub const POSTINGS_FILE: &str = "segment.pst";
/// Term vectors file name.
pub const VECTORS_FILE: &str = "segment.tvx";
/// Stored fields file name.
pub const STORE_FILE: &str = "segment.sto";
/// Commit marker file name. Present only after a complete commit.
pub const COMMIT_FILE: &str = "segment.cmt";

/// Magic number identifying a commit marker ("LCMT").
const COMMIT_MAGIC: u32 = 0x4C43_4D54;

/// An immutable, searchable snapshot of the index.
#[derive(Debug)]
pub struct Segment {
    inverted: InvertedIndex,
    vectors: TermVectors,
    store: DocumentStore,
    doc_count: u32,
}

impl Segment {
    /// Assemble a segment from writer state.
    pub(crate) fn new(
        inverted: InvertedIndex,
        vectors: TermVectors,
        store: DocumentStore,
        doc_count: u32,
    ) -> Self {
        Segment {
            inverted,
            vectors,
            store,
            doc_count,
        }
    }

    /// Number of documents in the segment.
    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// The segment's inverted index.
    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    /// Get the posting list for a term.
    pub fn posting_list(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.inverted.posting_list(field, term)
    }

    /// Number of documents containing a term.
    pub fn doc_frequency(&self, field: &str, term: &str) -> u32 {
        self.inverted.doc_frequency(field, term)
    }

    /// Get the term vector for a `(doc_id, field)` pair.
    pub fn term_vector(&self, doc_id: DocId, field: &str) -> Option<&TermVector> {
        self.vectors.vector(doc_id, field)
    }

    /// Get the stored fields of a document, in original order.
    pub fn stored(&self, doc_id: DocId) -> Option<&[(String, FieldValue)]> {
        self.store.get(doc_id)
    }

    /// Get the first stored value of a field.
    pub fn stored_first(&self, doc_id: DocId, field: &str) -> Option<&FieldValue> {
        self.store.get_first(doc_id, field)
    }

    /// Get every stored value of a field.
    pub fn stored_values(&self, doc_id: DocId, field: &str) -> Vec<&FieldValue> {
        self.store.get_values(doc_id, field)
    }

    /// Persist the segment: data files first, commit marker last.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let mut writer = StructWriter::new(storage.create_output(POSTINGS_FILE)?);
        self.inverted.encode(&mut writer)?;
        writer.close()?;

        let mut writer = StructWriter::new(storage.create_output(VECTORS_FILE)?);
        self.vectors.encode(&mut writer)?;
        writer.close()?;

        let mut writer = StructWriter::new(storage.create_output(STORE_FILE)?);
        self.store.encode(&mut writer)?;
        writer.close()?;

        let mut writer = StructWriter::new(storage.create_output(COMMIT_FILE)?);
        writer.write_u32(COMMIT_MAGIC)?;
        writer.write_u32(self.doc_count)?;
        writer.close()?;

        debug!(
            "committed segment: {} docs, {} terms",
            self.doc_count,
            self.inverted.term_count()
        );
        Ok(())
    }

    /// Open the committed segment from storage.
    ///
    /// Fails with an index error when no commit marker exists, and with a
    /// checksum error when any file is corrupt.
    pub fn open(storage: &dyn Storage) -> Result<Arc<Segment>> {
        if !storage.file_exists(COMMIT_FILE) {
            return Err(LucernaError::index("no committed segment in storage"));
        }

        let mut reader = StructReader::new(storage.open_input(COMMIT_FILE)?)?;
        let magic = reader.read_u32()?;
        if magic != COMMIT_MAGIC {
            return Err(LucernaError::index("invalid commit marker format"));
        }
        let doc_count = reader.read_u32()?;

        let mut reader = StructReader::new(storage.open_input(POSTINGS_FILE)?)?;
        let inverted = InvertedIndex::decode(&mut reader)?;

        let mut reader = StructReader::new(storage.open_input(VECTORS_FILE)?)?;
        let vectors = TermVectors::decode(&mut reader)?;

        let mut reader = StructReader::new(storage.open_input(STORE_FILE)?)?;
        let store = DocumentStore::decode(&mut reader)?;

        if store.doc_count() != doc_count {
            return Err(LucernaError::index(format!(
                "segment doc count mismatch: marker says {doc_count}, store has {}",
                store.doc_count()
            )));
        }

        debug!("opened segment: {doc_count} docs, {} terms", inverted.term_count());
        Ok(Arc::new(Segment {
            inverted,
            vectors,
            store,
            doc_count,
        }))
    }
}
