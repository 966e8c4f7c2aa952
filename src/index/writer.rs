//! Index writer.
//!
//! [`IndexWriter`] is the single ingestion point: it analyzes documents,
//! assigns contiguous document ids, and accumulates postings, term vectors,
//! and stored fields until [`commit`](IndexWriter::commit) freezes them
//! into a [`Segment`].
//!
//! There is exactly one writer per storage at a time, enforced by an
//! exclusive storage lock taken in [`IndexWriter::new`] and released when
//! the writer is dropped or consumed by commit. `add_document` takes
//! `&self` and serializes internally, so a writer can be shared across
//! threads behind an `Arc`.

use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use parking_lot::Mutex;

use crate::analysis::Analyzer;
use crate::document::{DocId, Document, FieldValue};
use crate::error::{LucernaError, Result};
use crate::index::doc_store::DocumentStore;
use crate::index::postings::{InvertedIndex, Posting, Term};
use crate::index::segment::Segment;
use crate::index::term_vector::TermVectors;
use crate::storage::{Storage, StorageLock, WRITE_LOCK_NAME};

/// Accumulated occurrences of one term in one field of the current document.
#[derive(Default)]
struct TermAccumulator {
    frequency: u32,
    positions: Vec<u32>,
    offsets: Vec<(u32, u32)>,
    store_positions: bool,
    store_offsets: bool,
    store_term_vectors: bool,
}

/// Running position and byte offset for one field name within a document.
///
/// Repeated fields with the same name continue the counters, so positions
/// stay strictly increasing across the whole field.
#[derive(Default)]
struct FieldCursor {
    position_base: u32,
    offset_base: u32,
}

struct WriterState {
    inverted: InvertedIndex,
    vectors: TermVectors,
    store: DocumentStore,
}

/// Builds an index by accumulating analyzed documents in memory.
pub struct IndexWriter {
    storage: Arc<dyn Storage>,
    analyzer: Arc<dyn Analyzer>,
    state: Mutex<WriterState>,
    _lock: Box<dyn StorageLock>,
}

impl IndexWriter {
    /// Open a writer over the given storage.
    ///
    /// Fails with a storage error when another writer already holds the
    /// write lock.
    pub fn new(storage: Arc<dyn Storage>, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let lock = storage.acquire_lock(WRITE_LOCK_NAME)?;
        debug!("opened index writer with analyzer '{}'", analyzer.name());
        Ok(IndexWriter {
            storage,
            analyzer,
            state: Mutex::new(WriterState {
                inverted: InvertedIndex::new(),
                vectors: TermVectors::new(),
                store: DocumentStore::new(),
            }),
            _lock: lock,
        })
    }

    /// The analyzer documents are indexed with.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// Analyze and index a document, returning its assigned id.
    ///
    /// Ids are contiguous and start at zero. Binary field values are never
    /// indexed; untokenized indexed fields contribute their whole value as
    /// one literal term.
    pub fn add_document(&self, document: Document) -> Result<DocId> {
        let mut accumulators: AHashMap<(String, String), TermAccumulator> = AHashMap::new();
        let mut cursors: AHashMap<String, FieldCursor> = AHashMap::new();
        let mut stored: Vec<(String, FieldValue)> = Vec::new();

        for field in document.fields() {
            if field.options.stored {
                stored.push((field.name.clone(), field.value.clone()));
            }

            if !field.options.indexed {
                continue;
            }
            let Some(text) = field.value.as_text() else {
                continue;
            };

            let cursor = cursors.entry(field.name.clone()).or_default();
            let position_base = cursor.position_base;
            let offset_base = cursor.offset_base;
            let mut token_count = 0u32;

            if field.options.tokenized {
                for token in self.analyzer.analyze(text)? {
                    let accumulator = accumulators
                        .entry((field.name.clone(), token.text.clone()))
                        .or_default();
                    accumulator.frequency += 1;
                    accumulator.store_positions = field.options.store_positions;
                    accumulator.store_offsets = field.options.store_offsets;
                    accumulator.store_term_vectors = field.options.store_term_vectors;
                    if field.options.store_positions {
                        accumulator.positions.push(position_base + token.position);
                    }
                    if field.options.store_offsets {
                        accumulator.offsets.push((
                            offset_base + token.start_offset,
                            offset_base + token.end_offset,
                        ));
                    }
                    token_count = token_count.max(token.position + 1);
                }
            } else if !text.is_empty() {
                let accumulator = accumulators
                    .entry((field.name.clone(), text.to_string()))
                    .or_default();
                accumulator.frequency += 1;
                accumulator.store_positions = field.options.store_positions;
                accumulator.store_offsets = field.options.store_offsets;
                accumulator.store_term_vectors = field.options.store_term_vectors;
                if field.options.store_positions {
                    accumulator.positions.push(position_base);
                }
                if field.options.store_offsets {
                    accumulator
                        .offsets
                        .push((offset_base, offset_base + text.len() as u32));
                }
                token_count = 1;
            }

            // Leave a gap of one position and one byte between repeated
            // fields so phrases never match across value boundaries.
            cursor.position_base = position_base + token_count + 1;
            cursor.offset_base = offset_base + text.len() as u32 + 1;
        }

        let mut state = self.state.lock();
        let doc_id = state.store.add(stored);

        for ((field, term), accumulator) in accumulators {
            if accumulator.store_term_vectors {
                let vector = state.vectors.vector_mut(doc_id, &field);
                let entry = vector.entry_mut(&term);
                entry.frequency = accumulator.frequency;
                entry.positions = accumulator.positions.clone();
                entry.offsets = accumulator.offsets.clone();
            }

            let mut posting = Posting::with_frequency(doc_id, accumulator.frequency);
            if accumulator.store_positions {
                posting.positions = Some(accumulator.positions);
            }
            if accumulator.store_offsets {
                posting.offsets = Some(accumulator.offsets);
            }
            state.inverted.add_posting(Term::new(field, term), posting);
        }

        Ok(doc_id)
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> u32 {
        self.state.lock().store.doc_count()
    }

    /// Freeze the accumulated documents into a segment and persist it.
    ///
    /// Consumes the writer; the write lock is released on return. The
    /// commit marker is written after the data files, so a failed commit
    /// leaves no readable segment behind.
    pub fn commit(self) -> Result<Segment> {
        let state = self.state.into_inner();
        let doc_count = state.store.doc_count();
        if doc_count == 0 {
            return Err(LucernaError::index("cannot commit an empty index"));
        }

        let segment = Segment::new(state.inverted, state.vectors, state.store, doc_count);
        segment.write(self.storage.as_ref())?;
        Ok(segment)
    }

    /// Discard all buffered documents and release the write lock.
    pub fn close(self) {
        debug!("closing index writer without commit");
    }
}
