//! Top-hits collection.

use crate::document::DocId;

/// A matching document and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// The matching document id.
    pub doc_id: DocId,
    /// The relevance score.
    pub score: f32,
}

/// Collects hits and returns the top N in deterministic order: descending
/// score, ascending document id on ties.
#[derive(Debug)]
pub struct TopDocsCollector {
    hits: Vec<Hit>,
    max_hits: usize,
}

impl TopDocsCollector {
    /// Create a collector keeping at most `max_hits` hits.
    pub fn new(max_hits: usize) -> Self {
        TopDocsCollector {
            hits: Vec::new(),
            max_hits,
        }
    }

    /// Record a hit.
    pub fn collect(&mut self, doc_id: DocId, score: f32) {
        self.hits.push(Hit { doc_id, score });
    }

    /// Sort and truncate to the top hits.
    pub fn into_top_hits(mut self) -> Vec<Hit> {
        self.hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        self.hits.truncate(self.max_hits);
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_and_truncation() {
        let mut collector = TopDocsCollector::new(2);
        collector.collect(4, 0.5);
        collector.collect(1, 2.0);
        collector.collect(9, 1.0);

        let hits = collector.into_top_hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc_id, 1);
        assert_eq!(hits[1].doc_id, 9);
    }

    #[test]
    fn test_ties_break_by_ascending_doc_id() {
        let mut collector = TopDocsCollector::new(10);
        collector.collect(7, 1.0);
        collector.collect(2, 1.0);
        collector.collect(5, 1.0);

        let doc_ids: Vec<DocId> = collector.into_top_hits().iter().map(|h| h.doc_id).collect();
        assert_eq!(doc_ids, vec![2, 5, 7]);
    }

    #[test]
    fn test_zero_max_hits() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(1, 1.0);
        assert!(collector.into_top_hits().is_empty());
    }
}
