//! TF-IDF scoring.

/// Scores one term against the documents of a segment.
///
/// `score = tf * ln(1 + total_docs / doc_frequency)`
///
/// The inverse document frequency factor is fixed per term, so a scorer is
/// built once per query term and applied to every matching posting.
#[derive(Debug, Clone, Copy)]
pub struct TfIdfScorer {
    idf: f32,
}

impl TfIdfScorer {
    /// Create a scorer for a term with the given document frequency, in a
    /// segment with the given total document count.
    pub fn new(doc_frequency: u32, total_docs: u32) -> Self {
        let idf = if doc_frequency == 0 {
            0.0
        } else {
            (1.0 + f64::from(total_docs) / f64::from(doc_frequency)).ln() as f32
        };
        TfIdfScorer { idf }
    }

    /// Score a document by its term frequency.
    pub fn score(&self, term_frequency: u32) -> f32 {
        term_frequency as f32 * self.idf
    }
}
