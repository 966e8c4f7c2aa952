//! Posting lists and the inverted index.
//!
//! The inverted index maps a [`Term`] (a field name plus term text) to a
//! [`PostingList`] ordered by ascending document id. That ordering is what
//! makes boolean intersection and union linear-time merges, and it makes
//! every iteration over the index deterministic.

use ahash::AHashMap;

use crate::document::DocId;
use crate::error::{LucernaError, Result};
use crate::storage::structured::{StructReader, StructWriter};

/// Magic number identifying a postings file ("LPST").
const POSTINGS_MAGIC: u32 = 0x4C50_5354;
/// Postings file format version.
const POSTINGS_VERSION: u32 = 1;

/// The indexing unit: a field name and a term text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    /// The field the term was indexed under.
    pub field: String,
    /// The term text.
    pub text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }
}

/// A single posting: where and how often one term occurs in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Document ID.
    pub doc_id: DocId,
    /// Term frequency in the document.
    pub frequency: u32,
    /// Token positions, present when the field stores positions.
    pub positions: Option<Vec<u32>>,
    /// Byte offset pairs, present when the field stores offsets.
    pub offsets: Option<Vec<(u32, u32)>>,
}

impl Posting {
    /// Create a posting with a bare frequency.
    pub fn with_frequency(doc_id: DocId, frequency: u32) -> Self {
        Posting {
            doc_id,
            frequency,
            positions: None,
            offsets: None,
        }
    }

    /// Create a posting with positions; frequency is the position count.
    pub fn with_positions(doc_id: DocId, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            frequency: positions.len() as u32,
            positions: Some(positions),
            offsets: None,
        }
    }

    /// Attach byte offsets to this posting.
    pub fn with_offsets(mut self, offsets: Vec<(u32, u32)>) -> Self {
        self.offsets = Some(offsets);
        self
    }
}

/// All postings for one term, ordered by ascending document id.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    /// The postings in this list.
    pub postings: Vec<Posting>,
    /// Total term frequency across all documents.
    pub total_frequency: u64,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Append a posting, keeping the list sorted by document id.
    ///
    /// The writer assigns strictly increasing doc ids, so the common case
    /// is a push at the end.
    pub fn add_posting(&mut self, posting: Posting) {
        self.total_frequency += u64::from(posting.frequency);

        match self.postings.last() {
            Some(last) if last.doc_id < posting.doc_id => self.postings.push(posting),
            None => self.postings.push(posting),
            _ => {
                let pos = self
                    .postings
                    .partition_point(|p| p.doc_id < posting.doc_id);
                self.postings.insert(pos, posting);
            }
        }
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self) -> u32 {
        self.postings.len() as u32
    }

    /// Look up the posting for a document, if any.
    pub fn posting(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|i| &self.postings[i])
    }

    /// Get the length of the posting list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Iterate over the postings in doc id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    fn encode(&self, writer: &mut StructWriter) -> Result<()> {
        writer.write_varint(self.total_frequency)?;
        writer.write_varint(self.postings.len() as u64)?;

        let mut prev_doc_id = 0u32;
        for posting in &self.postings {
            writer.write_varint(u64::from(posting.doc_id.wrapping_sub(prev_doc_id)))?;
            prev_doc_id = posting.doc_id;
            writer.write_varint(u64::from(posting.frequency))?;

            match &posting.positions {
                Some(positions) => {
                    writer.write_u8(1)?;
                    writer.write_delta_u32s(positions)?;
                }
                None => writer.write_u8(0)?,
            }

            match &posting.offsets {
                Some(offsets) => {
                    writer.write_u8(1)?;
                    let starts: Vec<u32> = offsets.iter().map(|(s, _)| *s).collect();
                    let ends: Vec<u32> = offsets.iter().map(|(_, e)| *e).collect();
                    writer.write_delta_u32s(&starts)?;
                    writer.write_delta_u32s(&ends)?;
                }
                None => writer.write_u8(0)?,
            }
        }

        Ok(())
    }

    fn decode(reader: &mut StructReader) -> Result<Self> {
        let total_frequency = reader.read_varint()?;
        let posting_count = reader.read_varint()? as usize;

        let mut postings = Vec::with_capacity(posting_count);
        let mut prev_doc_id = 0u32;

        for _ in 0..posting_count {
            let delta = reader.read_varint()? as u32;
            let doc_id = prev_doc_id.wrapping_add(delta);
            prev_doc_id = doc_id;
            let frequency = reader.read_varint()? as u32;

            let positions = if reader.read_u8()? != 0 {
                Some(reader.read_delta_u32s()?)
            } else {
                None
            };

            let offsets = if reader.read_u8()? != 0 {
                let starts = reader.read_delta_u32s()?;
                let ends = reader.read_delta_u32s()?;
                Some(starts.into_iter().zip(ends).collect())
            } else {
                None
            };

            postings.push(Posting {
                doc_id,
                frequency,
                positions,
                offsets,
            });
        }

        Ok(PostingList {
            postings,
            total_frequency,
        })
    }
}

/// An in-memory inverted index mapping terms to posting lists.
///
/// Built incrementally by the writer and frozen at commit.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: AHashMap<Term, PostingList>,
}

impl InvertedIndex {
    /// Create a new empty inverted index.
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Add a posting for a term.
    pub fn add_posting(&mut self, term: Term, posting: Posting) {
        self.terms.entry(term).or_default().add_posting(posting);
    }

    /// Get the posting list for a term.
    pub fn posting_list(&self, field: &str, text: &str) -> Option<&PostingList> {
        // Term borrows would need a custom key type; the lookup clone is
        // confined to this accessor.
        self.terms.get(&Term::new(field, text))
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self, field: &str, text: &str) -> u32 {
        self.posting_list(field, text)
            .map(|pl| pl.doc_frequency())
            .unwrap_or(0)
    }

    /// Number of unique terms in the index.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Iterate over all terms.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.keys()
    }

    /// Write the inverted index to a segment file.
    pub fn encode(&self, writer: &mut StructWriter) -> Result<()> {
        writer.write_u32(POSTINGS_MAGIC)?;
        writer.write_u32(POSTINGS_VERSION)?;
        writer.write_varint(self.terms.len() as u64)?;

        // Sorted for deterministic output.
        let mut sorted: Vec<_> = self.terms.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (term, posting_list) in sorted {
            writer.write_string(&term.field)?;
            writer.write_string(&term.text)?;
            posting_list.encode(writer)?;
        }

        Ok(())
    }

    /// Read an inverted index from a segment file.
    pub fn decode(reader: &mut StructReader) -> Result<Self> {
        let magic = reader.read_u32()?;
        if magic != POSTINGS_MAGIC {
            return Err(LucernaError::index("invalid postings file format"));
        }
        let version = reader.read_u32()?;
        if version != POSTINGS_VERSION {
            return Err(LucernaError::index(format!(
                "unsupported postings version: {version}"
            )));
        }

        let term_count = reader.read_varint()? as usize;
        let mut terms = AHashMap::with_capacity(term_count);
        for _ in 0..term_count {
            let field = reader.read_string()?;
            let text = reader.read_string()?;
            let posting_list = PostingList::decode(reader)?;
            terms.insert(Term { field, text }, posting_list);
        }

        Ok(InvertedIndex { terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_posting_list_sorted_by_doc_id() {
        let mut list = PostingList::new();
        list.add_posting(Posting::with_frequency(1, 1));
        list.add_posting(Posting::with_frequency(5, 2));
        list.add_posting(Posting::with_frequency(3, 1));

        let doc_ids: Vec<DocId> = list.iter().map(|p| p.doc_id).collect();
        assert_eq!(doc_ids, vec![1, 3, 5]);
        assert_eq!(list.doc_frequency(), 3);
        assert_eq!(list.total_frequency, 4);
    }

    #[test]
    fn test_posting_lookup() {
        let mut list = PostingList::new();
        list.add_posting(Posting::with_positions(0, vec![2, 7]));
        list.add_posting(Posting::with_positions(4, vec![1]));

        assert_eq!(list.posting(0).unwrap().frequency, 2);
        assert_eq!(list.posting(4).unwrap().positions, Some(vec![1]));
        assert!(list.posting(2).is_none());
    }

    #[test]
    fn test_inverted_index_lookup() {
        let mut index = InvertedIndex::new();
        index.add_posting(
            Term::new("content", "hello"),
            Posting::with_positions(0, vec![0]),
        );
        index.add_posting(
            Term::new("content", "hello"),
            Posting::with_positions(1, vec![3]),
        );
        index.add_posting(
            Term::new("title", "hello"),
            Posting::with_positions(0, vec![0]),
        );

        assert_eq!(index.doc_frequency("content", "hello"), 2);
        assert_eq!(index.doc_frequency("title", "hello"), 1);
        assert_eq!(index.doc_frequency("content", "missing"), 0);
        assert_eq!(index.term_count(), 2);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut index = InvertedIndex::new();
        index.add_posting(
            Term::new("content", "fox"),
            Posting::with_positions(0, vec![3, 9]).with_offsets(vec![(16, 19), (40, 43)]),
        );
        index.add_posting(
            Term::new("content", "fox"),
            Posting::with_positions(2, vec![1]).with_offsets(vec![(4, 7)]),
        );
        index.add_posting(Term::new("path", "/a.txt"), Posting::with_frequency(0, 1));

        let storage = MemoryStorage::new();
        let mut writer = StructWriter::new(storage.create_output("p.bin").unwrap());
        index.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let mut reader = StructReader::new(storage.open_input("p.bin").unwrap()).unwrap();
        let decoded = InvertedIndex::decode(&mut reader).unwrap();

        assert_eq!(decoded.term_count(), 2);
        let list = decoded.posting_list("content", "fox").unwrap();
        assert_eq!(list.doc_frequency(), 2);
        assert_eq!(list.posting(0).unwrap().positions, Some(vec![3, 9]));
        assert_eq!(
            list.posting(0).unwrap().offsets,
            Some(vec![(16, 19), (40, 43)])
        );
        let path_list = decoded.posting_list("path", "/a.txt").unwrap();
        assert_eq!(path_list.posting(0).unwrap().positions, None);
    }
}
