//! Per-document term vectors.
//!
//! A term vector is the inverted index turned inside out: for one
//! `(document, field)` pair it maps term text to frequency, positions, and
//! offsets. The span evaluator and the highlighter need "what terms are in
//! this document and where", which would otherwise require a scan over
//! every posting list.
//!
//! The sum of frequencies in a field's vector equals the token count the
//! analyzer produced for that field value.

use ahash::AHashMap;

use crate::document::DocId;
use crate::error::{LucernaError, Result};
use crate::storage::structured::{StructReader, StructWriter};

/// Magic number identifying a term vectors file ("LTVX").
const VECTORS_MAGIC: u32 = 0x4C54_5658;
/// Term vectors file format version.
const VECTORS_VERSION: u32 = 1;

/// Frequency, positions, and offsets of one term within one field of one
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermVectorEntry {
    /// Number of occurrences.
    pub frequency: u32,
    /// Token positions, in increasing order. Empty when positions were not
    /// stored for the field.
    pub positions: Vec<u32>,
    /// Byte offset pairs, parallel to `positions` when both are stored.
    pub offsets: Vec<(u32, u32)>,
}

/// The term vector for one `(document, field)` pair.
#[derive(Debug, Clone, Default)]
pub struct TermVector {
    terms: AHashMap<String, TermVectorEntry>,
}

impl TermVector {
    /// Create a new empty term vector.
    pub fn new() -> Self {
        TermVector::default()
    }

    /// Record one occurrence of a term.
    pub fn add_occurrence(
        &mut self,
        term: &str,
        position: Option<u32>,
        offset: Option<(u32, u32)>,
    ) {
        let entry = self.terms.entry(term.to_string()).or_default();
        entry.frequency += 1;
        if let Some(position) = position {
            entry.positions.push(position);
        }
        if let Some(offset) = offset {
            entry.offsets.push(offset);
        }
    }

    /// Get the entry for a term.
    pub fn entry(&self, term: &str) -> Option<&TermVectorEntry> {
        self.terms.get(term)
    }

    /// Get or create the entry for a term.
    pub(crate) fn entry_mut(&mut self, term: &str) -> &mut TermVectorEntry {
        self.terms.entry(term.to_string()).or_default()
    }

    /// Iterate over all terms and their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermVectorEntry)> {
        self.terms.iter().map(|(t, e)| (t.as_str(), e))
    }

    /// Number of unique terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Sum of frequencies over all terms, i.e. the field's token count.
    pub fn total_frequency(&self) -> u64 {
        self.terms.values().map(|e| u64::from(e.frequency)).sum()
    }
}

/// All term vectors of a segment, keyed by `(doc_id, field)`.
#[derive(Debug, Default)]
pub struct TermVectors {
    vectors: AHashMap<(DocId, String), TermVector>,
}

impl TermVectors {
    /// Create a new empty collection.
    pub fn new() -> Self {
        TermVectors::default()
    }

    /// Get or create the vector for a `(doc_id, field)` pair.
    pub fn vector_mut(&mut self, doc_id: DocId, field: &str) -> &mut TermVector {
        self.vectors
            .entry((doc_id, field.to_string()))
            .or_default()
    }

    /// Get the vector for a `(doc_id, field)` pair.
    pub fn vector(&self, doc_id: DocId, field: &str) -> Option<&TermVector> {
        self.vectors.get(&(doc_id, field.to_string()))
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Write all term vectors to a segment file.
    pub fn encode(&self, writer: &mut StructWriter) -> Result<()> {
        writer.write_u32(VECTORS_MAGIC)?;
        writer.write_u32(VECTORS_VERSION)?;
        writer.write_varint(self.vectors.len() as u64)?;

        let mut sorted: Vec<_> = self.vectors.iter().collect();
        sorted.sort_by(|((doc_a, field_a), _), ((doc_b, field_b), _)| {
            doc_a.cmp(doc_b).then_with(|| field_a.cmp(field_b))
        });

        for ((doc_id, field), vector) in sorted {
            writer.write_varint(u64::from(*doc_id))?;
            writer.write_string(field)?;
            writer.write_varint(vector.terms.len() as u64)?;

            let mut terms: Vec<_> = vector.terms.iter().collect();
            terms.sort_by(|(a, _), (b, _)| a.cmp(b));

            for (term, entry) in terms {
                writer.write_string(term)?;
                writer.write_varint(u64::from(entry.frequency))?;
                writer.write_delta_u32s(&entry.positions)?;
                let starts: Vec<u32> = entry.offsets.iter().map(|(s, _)| *s).collect();
                let ends: Vec<u32> = entry.offsets.iter().map(|(_, e)| *e).collect();
                writer.write_delta_u32s(&starts)?;
                writer.write_delta_u32s(&ends)?;
            }
        }

        Ok(())
    }

    /// Read term vectors from a segment file.
    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let magic = reader.read_u32()?;
        if magic != VECTORS_MAGIC {
            return Err(LucernaError::index("invalid term vectors file format"));
        }
        let version = reader.read_u32()?;
        if version != VECTORS_VERSION {
            return Err(LucernaError::index(format!(
                "unsupported term vectors version: {version}"
            )));
        }

        let vector_count = reader.read_varint()? as usize;
        let mut vectors = AHashMap::with_capacity(vector_count);

        for _ in 0..vector_count {
            let doc_id = reader.read_varint()? as DocId;
            let field = reader.read_string()?;
            let term_count = reader.read_varint()? as usize;

            let mut vector = TermVector::new();
            for _ in 0..term_count {
                let term = reader.read_string()?;
                let frequency = reader.read_varint()? as u32;
                let positions = reader.read_delta_u32s()?;
                let starts = reader.read_delta_u32s()?;
                let ends = reader.read_delta_u32s()?;
                vector.terms.insert(
                    term,
                    TermVectorEntry {
                        frequency,
                        positions,
                        offsets: starts.into_iter().zip(ends).collect(),
                    },
                );
            }

            vectors.insert((doc_id, field), vector);
        }

        Ok(TermVectors { vectors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_term_vector_occurrences() {
        let mut vector = TermVector::new();
        vector.add_occurrence("quick", Some(1), Some((4, 9)));
        vector.add_occurrence("fox", Some(3), Some((16, 19)));
        vector.add_occurrence("quick", Some(5), Some((26, 31)));

        let quick = vector.entry("quick").unwrap();
        assert_eq!(quick.frequency, 2);
        assert_eq!(quick.positions, vec![1, 5]);
        assert_eq!(quick.offsets, vec![(4, 9), (26, 31)]);

        assert_eq!(vector.term_count(), 2);
        assert_eq!(vector.total_frequency(), 3);
        assert!(vector.entry("missing").is_none());
    }

    #[test]
    fn test_vectors_keyed_by_doc_and_field() {
        let mut vectors = TermVectors::new();
        vectors.vector_mut(0, "content").add_occurrence("a", Some(0), None);
        vectors.vector_mut(0, "title").add_occurrence("b", Some(0), None);
        vectors.vector_mut(1, "content").add_occurrence("a", Some(0), None);

        assert_eq!(vectors.len(), 3);
        assert!(vectors.vector(0, "content").is_some());
        assert!(vectors.vector(1, "title").is_none());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut vectors = TermVectors::new();
        let v = vectors.vector_mut(2, "content");
        v.add_occurrence("brown", Some(2), Some((10, 15)));
        v.add_occurrence("fox", Some(3), Some((16, 19)));
        v.add_occurrence("fox", Some(8), Some((44, 47)));

        let storage = MemoryStorage::new();
        let mut writer = StructWriter::new(storage.create_output("v.bin").unwrap());
        vectors.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let mut reader = StructReader::new(storage.open_input("v.bin").unwrap()).unwrap();
        let decoded = TermVectors::decode(&mut reader).unwrap();

        let vector = decoded.vector(2, "content").unwrap();
        let fox = vector.entry("fox").unwrap();
        assert_eq!(fox.frequency, 2);
        assert_eq!(fox.positions, vec![3, 8]);
        assert_eq!(fox.offsets, vec![(16, 19), (44, 47)]);
    }
}
