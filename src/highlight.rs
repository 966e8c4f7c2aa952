//! Search result highlighting.
//!
//! The highlighter extracts the best fragments of a stored text field and
//! wraps every query term occurrence in configurable tags. Match offsets
//! come from the field's term vector when one was stored; otherwise the
//! text is re-analyzed on the fly.
//!
//! Fragments are scored by how many matches they contain and returned best
//! first, so callers can show the most relevant snippet of a long document.

use std::sync::Arc;

use ahash::AHashSet;

use crate::analysis::Analyzer;
use crate::document::DocId;
use crate::error::Result;
use crate::query::Query;
use crate::search::Searcher;

/// Highlighting parameters.
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Target fragment length in bytes.
    pub fragment_size: usize,
    /// Tag inserted before each match.
    pub pre_tag: String,
    /// Tag inserted after each match.
    pub post_tag: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            fragment_size: 100,
            pre_tag: "<b>".to_string(),
            post_tag: "</b>".to_string(),
        }
    }
}

/// One highlighted fragment of a document field.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The fragment text with matches wrapped in tags.
    pub text: String,
    /// Fragment relevance: the number of matches plus a proximity bonus
    /// for tightly clustered matches.
    pub score: f32,
}

/// Extracts highlighted fragments for query matches.
pub struct Highlighter {
    config: HighlightConfig,
    analyzer: Arc<dyn Analyzer>,
}

impl Highlighter {
    /// Create a highlighter with the default configuration.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Highlighter {
            config: HighlightConfig::default(),
            analyzer,
        }
    }

    /// Create a highlighter with an explicit configuration.
    pub fn with_config(config: HighlightConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        Highlighter { config, analyzer }
    }

    /// Highlight a query's matches in one stored field of one document.
    ///
    /// Returns at most `max_fragments` fragments, best first. The result is
    /// empty when the query carries no terms for the field, the field is
    /// not stored as text, or nothing matches.
    pub fn highlight(
        &self,
        searcher: &Searcher,
        doc_id: DocId,
        field: &str,
        query: &Query,
        max_fragments: usize,
    ) -> Result<Vec<Fragment>> {
        if max_fragments == 0 {
            return Ok(Vec::new());
        }

        let terms: AHashSet<&str> = query.terms_for_field(field).into_iter().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let Some(text) = searcher
            .segment()
            .stored_first(doc_id, field)
            .and_then(|value| value.as_text())
        else {
            return Ok(Vec::new());
        };

        let mut matches = self.match_offsets(searcher, doc_id, field, text, &terms)?;
        if matches.is_empty() {
            return Ok(Vec::new());
        }
        matches.sort_unstable();
        matches.dedup();

        let mut fragments = self.build_fragments(text, &matches);
        fragments.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fragments.truncate(max_fragments);
        Ok(fragments)
    }

    /// Byte offset ranges of every term match in the text.
    fn match_offsets(
        &self,
        searcher: &Searcher,
        doc_id: DocId,
        field: &str,
        text: &str,
        terms: &AHashSet<&str>,
    ) -> Result<Vec<(usize, usize)>> {
        if let Some(vector) = searcher.segment().term_vector(doc_id, field) {
            let mut offsets = Vec::new();
            for term in terms {
                if let Some(entry) = vector.entry(term) {
                    // Vector offsets run across every value of a repeated
                    // field; only those inside the first stored value can
                    // be rendered against it.
                    offsets.extend(
                        entry
                            .offsets
                            .iter()
                            .map(|&(s, e)| (s as usize, e as usize))
                            .filter(|&(_, e)| e <= text.len()),
                    );
                }
            }
            if !offsets.is_empty() {
                return Ok(offsets);
            }
        }

        // No usable term vector; re-analyze the stored text.
        let mut offsets = Vec::new();
        for token in self.analyzer.analyze(text)? {
            if terms.contains(token.text.as_str()) {
                offsets.push((token.start_offset as usize, token.end_offset as usize));
            }
        }
        Ok(offsets)
    }

    /// Group match offsets into fragments of roughly `fragment_size` bytes.
    fn build_fragments(&self, text: &str, matches: &[(usize, usize)]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut index = 0;

        while index < matches.len() {
            let (first_start, _) = matches[index];
            let half = self.config.fragment_size / 2;
            let start = snap_to_boundary(text, first_start.saturating_sub(half));
            let end = snap_to_boundary(
                text,
                (start + self.config.fragment_size).min(text.len()),
            );

            // Every match falling inside this window joins the fragment.
            let mut included = Vec::new();
            while index < matches.len() && matches[index].1 <= end {
                included.push(matches[index]);
                index += 1;
            }
            if included.is_empty() {
                // The match is longer than the window; take it whole.
                included.push(matches[index]);
                index += 1;
            }

            fragments.push(self.render_fragment(text, start, end, &included));
        }

        fragments
    }

    fn render_fragment(
        &self,
        text: &str,
        start: usize,
        end: usize,
        matches: &[(usize, usize)],
    ) -> Fragment {
        let end = end.max(matches.last().map(|&(_, e)| e).unwrap_or(end));
        let mut rendered = String::with_capacity(end - start + matches.len() * 8);
        let mut cursor = start;

        for &(match_start, match_end) in matches {
            if match_start < cursor {
                continue;
            }
            rendered.push_str(&text[cursor..match_start]);
            rendered.push_str(&self.config.pre_tag);
            rendered.push_str(&text[match_start..match_end]);
            rendered.push_str(&self.config.post_tag);
            cursor = match_end;
        }
        rendered.push_str(&text[cursor..end]);

        // Clustered matches outrank the same number spread thin: each
        // adjacent pair contributes more the smaller the gap between them.
        let mut score = matches.len() as f32;
        for pair in matches.windows(2) {
            let gap = pair[1].0.saturating_sub(pair[0].1) as f32;
            score += 1.0 / (1.0 + gap);
        }

        Fragment {
            text: rendered,
            score,
        }
    }
}

/// Move an offset forward to the nearest UTF-8 character boundary.
fn snap_to_boundary(text: &str, mut offset: usize) -> usize {
    while offset < text.len() && !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset.min(text.len())
}
