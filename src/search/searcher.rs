//! Query evaluation over a committed segment.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::analysis::Analyzer;
use crate::document::{DocId, FieldValue};
use crate::error::{LucernaError, Result};
use crate::index::Segment;
use crate::query::{Occur, Query};
use crate::search::collector::{Hit, TopDocsCollector};
use crate::search::scorer::TfIdfScorer;
use crate::storage::Storage;

/// One occurrence of a span query's anchor term, with the terms found
/// around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch {
    /// The document containing the occurrence.
    pub doc_id: DocId,
    /// The position of the anchor term occurrence.
    pub position: u32,
    /// Surrounding terms within the window, keyed by position. The anchor
    /// occurrence itself is excluded.
    pub entries: BTreeMap<u32, String>,
}

/// Evaluates queries against one segment.
///
/// Searchers are read-only and cheap to construct; any number may search
/// the same segment concurrently, with or without a live writer.
pub struct Searcher {
    segment: Arc<Segment>,
    analyzer: Arc<dyn Analyzer>,
}

impl Searcher {
    /// Create a searcher over an already-loaded segment.
    pub fn new(segment: Arc<Segment>, analyzer: Arc<dyn Analyzer>) -> Self {
        Searcher { segment, analyzer }
    }

    /// Open the committed segment in storage and create a searcher for it.
    pub fn open(storage: &dyn Storage, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let segment = Segment::open(storage)?;
        Ok(Searcher { segment, analyzer })
    }

    /// The segment being searched.
    pub fn segment(&self) -> &Arc<Segment> {
        &self.segment
    }

    /// The analyzer queries are interpreted with.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// Number of documents in the segment.
    pub fn doc_count(&self) -> u32 {
        self.segment.doc_count()
    }

    /// Run a query and return the top `max_hits` hits, ordered by
    /// descending score with ties broken by ascending document id.
    pub fn search(&self, query: &Query, max_hits: usize) -> Result<Vec<Hit>> {
        if max_hits == 0 {
            return Ok(Vec::new());
        }

        let matches = self.evaluate(query)?;
        let mut collector = TopDocsCollector::new(max_hits);
        for (doc_id, score) in matches {
            collector.collect(doc_id, score);
        }
        let hits = collector.into_top_hits();
        debug!("query [{}] matched {} hits", query.description(), hits.len());
        Ok(hits)
    }

    /// Evaluate a query to the full set of matching documents and scores.
    fn evaluate(&self, query: &Query) -> Result<AHashMap<DocId, f32>> {
        match query {
            Query::Term { field, term } => Ok(self.evaluate_term(field, term)),
            Query::Span { field, term, .. } => Ok(self.evaluate_term(field, term)),
            Query::Phrase { field, terms } => Ok(self.evaluate_phrase(field, terms)),
            Query::Boolean { clauses } => self.evaluate_boolean(clauses),
        }
    }

    fn evaluate_term(&self, field: &str, term: &str) -> AHashMap<DocId, f32> {
        let Some(list) = self.segment.posting_list(field, term) else {
            return AHashMap::new();
        };
        let scorer = TfIdfScorer::new(list.doc_frequency(), self.segment.doc_count());
        list.iter()
            .map(|posting| (posting.doc_id, scorer.score(posting.frequency)))
            .collect()
    }

    fn evaluate_phrase(&self, field: &str, terms: &[String]) -> AHashMap<DocId, f32> {
        if terms.is_empty() {
            return AHashMap::new();
        }

        // Candidate docs contain every phrase term; walk the rarest
        // term's postings and check the rest.
        let lists: Option<Vec<_>> = terms
            .iter()
            .map(|term| self.segment.posting_list(field, term))
            .collect();
        let Some(lists) = lists else {
            return AHashMap::new();
        };
        let shortest = match lists.iter().min_by_key(|list| list.doc_frequency()) {
            Some(list) => *list,
            None => return AHashMap::new(),
        };

        let scorers: Vec<TfIdfScorer> = lists
            .iter()
            .map(|list| TfIdfScorer::new(list.doc_frequency(), self.segment.doc_count()))
            .collect();

        let mut matches = AHashMap::new();
        'docs: for posting in shortest.iter() {
            let doc_id = posting.doc_id;
            for list in &lists {
                if list.posting(doc_id).is_none() {
                    continue 'docs;
                }
            }
            if self.phrase_occurrences(doc_id, field, terms) == 0 {
                continue;
            }

            // Matched docs are scored by the sum of their member terms'
            // tf-idf contributions.
            let mut score = 0.0;
            for (list, scorer) in lists.iter().zip(&scorers) {
                if let Some(posting) = list.posting(doc_id) {
                    score += scorer.score(posting.frequency);
                }
            }
            matches.insert(doc_id, score);
        }
        matches
    }

    /// Count positions where the terms occur consecutively.
    fn phrase_occurrences(&self, doc_id: DocId, field: &str, terms: &[String]) -> usize {
        let mut current: Vec<u32> = match self.positions_for(doc_id, field, &terms[0]) {
            Some(positions) => positions.to_vec(),
            None => return 0,
        };

        for term in &terms[1..] {
            let Some(positions) = self.positions_for(doc_id, field, term) else {
                return 0;
            };
            let next: AHashSet<u32> = positions.iter().copied().collect();
            current = current
                .into_iter()
                .filter_map(|p| {
                    let successor = p + 1;
                    next.contains(&successor).then_some(successor)
                })
                .collect();
            if current.is_empty() {
                return 0;
            }
        }
        current.len()
    }

    /// Positions of a term in a document, preferring the term vector and
    /// falling back to the posting list.
    fn positions_for(&self, doc_id: DocId, field: &str, term: &str) -> Option<&[u32]> {
        if let Some(vector) = self.segment.term_vector(doc_id, field)
            && let Some(entry) = vector.entry(term)
            && !entry.positions.is_empty()
        {
            return Some(&entry.positions);
        }
        self.segment
            .posting_list(field, term)?
            .posting(doc_id)?
            .positions
            .as_deref()
    }

    fn evaluate_boolean(&self, clauses: &[crate::query::BooleanClause]) -> Result<AHashMap<DocId, f32>> {
        let mut must: Vec<AHashMap<DocId, f32>> = Vec::new();
        let mut should: Vec<AHashMap<DocId, f32>> = Vec::new();
        let mut excluded: AHashSet<DocId> = AHashSet::new();

        for clause in clauses {
            let matches = self.evaluate(&clause.query)?;
            match clause.occur {
                Occur::Must => must.push(matches),
                Occur::Should => should.push(matches),
                Occur::MustNot => excluded.extend(matches.keys()),
            }
        }

        // A query with only exclusions matches nothing.
        if must.is_empty() && should.is_empty() {
            return Ok(AHashMap::new());
        }

        let mut result: AHashMap<DocId, f32> = AHashMap::new();
        if let Some((first, rest)) = must.split_first() {
            'docs: for (&doc_id, &score) in first {
                let mut total = score;
                for other in rest {
                    match other.get(&doc_id) {
                        Some(&s) => total += s,
                        None => continue 'docs,
                    }
                }
                // Should clauses only add score when musts are present.
                for optional in &should {
                    if let Some(&s) = optional.get(&doc_id) {
                        total += s;
                    }
                }
                result.insert(doc_id, total);
            }
        } else {
            for optional in should {
                for (doc_id, score) in optional {
                    *result.entry(doc_id).or_insert(0.0) += score;
                }
            }
        }

        for doc_id in excluded {
            result.remove(&doc_id);
        }
        Ok(result)
    }

    /// Find every occurrence of a term and the terms around it.
    ///
    /// For each occurrence at position `p`, reports the terms at positions
    /// `[p - window, p + window]` excluding `p` itself. Only documents with
    /// a term vector for the field are inspected. Matches come back ordered
    /// by document id, then position.
    pub fn span_matches(&self, field: &str, term: &str, window: u32) -> Result<Vec<SpanMatch>> {
        let Some(list) = self.segment.posting_list(field, term) else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for posting in list.iter() {
            let Some(vector) = self.segment.term_vector(posting.doc_id, field) else {
                continue;
            };
            let Some(anchor) = vector.entry(term) else {
                continue;
            };

            for &position in &anchor.positions {
                let low = position.saturating_sub(window);
                let high = position + window;

                let mut entries = BTreeMap::new();
                for (other, entry) in vector.iter() {
                    for &p in &entry.positions {
                        if p >= low && p <= high && p != position {
                            entries.insert(p, other.to_string());
                        }
                    }
                }

                matches.push(SpanMatch {
                    doc_id: posting.doc_id,
                    position,
                    entries,
                });
            }
        }

        matches.sort_by(|a, b| {
            a.doc_id
                .cmp(&b.doc_id)
                .then_with(|| a.position.cmp(&b.position))
        });
        Ok(matches)
    }

    /// The stored fields of a document, first value per name.
    ///
    /// Fails with a not-found error for a document id outside the segment.
    pub fn stored_fields(&self, doc_id: DocId) -> Result<AHashMap<String, FieldValue>> {
        let fields = self
            .segment
            .stored(doc_id)
            .ok_or_else(|| LucernaError::not_found(format!("document {doc_id}")))?;

        let mut result = AHashMap::new();
        for (name, value) in fields {
            result.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Ok(result)
    }

    /// Every stored value of one field of a document, in original order.
    pub fn stored_values(&self, doc_id: DocId, field: &str) -> Result<Vec<FieldValue>> {
        if self.segment.stored(doc_id).is_none() {
            return Err(LucernaError::not_found(format!("document {doc_id}")));
        }
        Ok(self
            .segment
            .stored_values(doc_id, field)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::document::Document;
    use crate::index::IndexWriter;
    use crate::storage::memory::MemoryStorage;

    fn searcher_over(docs: &[&str]) -> Searcher {
        let storage = Arc::new(MemoryStorage::new());
        let analyzer: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::new());
        let writer = IndexWriter::new(storage, analyzer.clone()).unwrap();
        for doc in docs {
            writer
                .add_document(Document::builder().text("content", *doc).build())
                .unwrap();
        }
        let segment = Arc::new(writer.commit().unwrap());
        Searcher::new(segment, analyzer)
    }

    #[test]
    fn test_term_query() {
        let searcher = searcher_over(&[
            "the quick brown fox",
            "the lazy dog",
            "a fox and another fox",
        ]);

        let hits = searcher.search(&Query::term("content", "fox"), 10).unwrap();
        assert_eq!(hits.len(), 2);
        // Doc 2 has the term twice, so it ranks first.
        assert_eq!(hits[0].doc_id, 2);
        assert_eq!(hits[1].doc_id, 0);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_missing_term_matches_nothing() {
        let searcher = searcher_over(&["the quick brown fox"]);
        let hits = searcher
            .search(&Query::term("content", "zebra"), 10)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_max_hits_zero() {
        let searcher = searcher_over(&["the quick brown fox"]);
        let hits = searcher.search(&Query::term("content", "fox"), 0).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_boolean_must_intersection() {
        let searcher = searcher_over(&["quick fox", "quick dog", "slow fox"]);
        let query = Query::boolean()
            .must(Query::term("content", "quick"))
            .must(Query::term("content", "fox"))
            .build();

        let hits = searcher.search(&query, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn test_boolean_must_not_excludes() {
        let searcher = searcher_over(&["quick fox", "quick dog"]);
        let query = Query::boolean()
            .must(Query::term("content", "quick"))
            .must_not(Query::term("content", "dog"))
            .build();

        let hits = searcher.search(&query, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn test_boolean_should_union() {
        let searcher = searcher_over(&["quick fox", "lazy dog", "grey wolf"]);
        let query = Query::boolean()
            .should(Query::term("content", "fox"))
            .should(Query::term("content", "dog"))
            .build();

        let mut doc_ids: Vec<DocId> = searcher
            .search(&query, 10)
            .unwrap()
            .iter()
            .map(|h| h.doc_id)
            .collect();
        doc_ids.sort_unstable();
        assert_eq!(doc_ids, vec![0, 1]);
    }

    #[test]
    fn test_boolean_should_is_optional_with_must() {
        let searcher = searcher_over(&["quick fox", "quick dog"]);
        let query = Query::boolean()
            .must(Query::term("content", "quick"))
            .should(Query::term("content", "fox"))
            .build();

        let hits = searcher.search(&query, 10).unwrap();
        assert_eq!(hits.len(), 2);
        // The should match boosts doc 0 above doc 1.
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn test_boolean_only_exclusions_matches_nothing() {
        let searcher = searcher_over(&["quick fox"]);
        let query = Query::boolean()
            .must_not(Query::term("content", "fox"))
            .build();
        assert!(searcher.search(&query, 10).unwrap().is_empty());
    }

    #[test]
    fn test_phrase_requires_adjacency() {
        let searcher = searcher_over(&[
            "the quick brown fox",
            "the quick red brown fox",
            "brown quick",
        ]);
        let query = Query::phrase(
            "content",
            vec!["quick".to_string(), "brown".to_string()],
        );

        let hits = searcher.search(&query, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn test_phrase_three_terms() {
        let searcher = searcher_over(&["one two three four", "one two four three"]);
        let query = Query::phrase(
            "content",
            vec!["two".to_string(), "three".to_string(), "four".to_string()],
        );

        let hits = searcher.search(&query, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 0);
    }

    #[test]
    fn test_span_matches_window() {
        let searcher = searcher_over(&["the quick brown fox jumps over the lazy dog"]);

        let matches = searcher.span_matches("content", "fox", 1).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].doc_id, 0);
        assert_eq!(matches[0].position, 3);

        let entries: Vec<(u32, &str)> = matches[0]
            .entries
            .iter()
            .map(|(p, t)| (*p, t.as_str()))
            .collect();
        assert_eq!(entries, vec![(2, "brown"), (4, "jumps")]);
    }

    #[test]
    fn test_span_window_at_start_of_document() {
        let searcher = searcher_over(&["fox jumps"]);
        let matches = searcher.span_matches("content", "fox", 2).unwrap();
        assert_eq!(matches.len(), 1);
        let entries: Vec<u32> = matches[0].entries.keys().copied().collect();
        assert_eq!(entries, vec![1]);
    }

    #[test]
    fn test_span_multiple_occurrences() {
        let searcher = searcher_over(&["fox one fox two"]);
        let matches = searcher.span_matches("content", "fox", 1).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].position, 0);
        assert_eq!(matches[1].position, 2);
    }

    #[test]
    fn test_stored_fields_lookup() {
        let searcher = searcher_over(&["the quick brown fox"]);
        let fields = searcher.stored_fields(0).unwrap();
        assert_eq!(
            fields.get("content"),
            Some(&FieldValue::Text("the quick brown fox".to_string()))
        );
        assert!(searcher.stored_fields(99).is_err());
    }
}
