//! Query types.
//!
//! Queries form a closed set of variants evaluated by the searcher with a
//! single match. Keeping the set closed means evaluation, scoring, and
//! highlighting can each handle every query shape exhaustively, with the
//! compiler checking that no variant is missed.
//!
//! ```
//! use lucerna::query::Query;
//!
//! let query = Query::boolean()
//!     .must(Query::term("content", "quick"))
//!     .must_not(Query::term("content", "lazy"))
//!     .build();
//! assert_eq!(query.description(), "+content:quick -content:lazy");
//! ```

pub mod parser;

pub use self::parser::QueryParser;

/// How a clause participates in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match; contributes to the score.
    Must,
    /// The clause should match. With no `Must` clauses present, at least
    /// one `Should` clause must match; otherwise it only adds score.
    Should,
    /// The clause must not match; never contributes to the score.
    MustNot,
}

/// One clause of a boolean query.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    /// The sub-query.
    pub query: Query,
    /// How the clause participates.
    pub occur: Occur,
}

/// A search query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches documents containing a single term in a field.
    Term {
        /// The field to search in.
        field: String,
        /// The term to match.
        term: String,
    },
    /// Combines sub-queries with must / should / must-not semantics.
    Boolean {
        /// The clauses of the query.
        clauses: Vec<BooleanClause>,
    },
    /// Matches documents containing the terms at consecutive positions.
    Phrase {
        /// The field to search in.
        field: String,
        /// The phrase terms, in order.
        terms: Vec<String>,
    },
    /// Matches occurrences of a term and reports the terms surrounding
    /// each occurrence within a position window.
    Span {
        /// The field to search in.
        field: String,
        /// The anchor term.
        term: String,
        /// Number of positions on each side of an occurrence.
        window: u32,
    },
}

impl Query {
    /// Create a term query.
    pub fn term<F: Into<String>, T: Into<String>>(field: F, term: T) -> Self {
        Query::Term {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Create a phrase query.
    pub fn phrase<F: Into<String>>(field: F, terms: Vec<String>) -> Self {
        Query::Phrase {
            field: field.into(),
            terms,
        }
    }

    /// Create a span query.
    pub fn span<F: Into<String>, T: Into<String>>(field: F, term: T, window: u32) -> Self {
        Query::Span {
            field: field.into(),
            term: term.into(),
            window,
        }
    }

    /// Start building a boolean query.
    pub fn boolean() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    /// Collect the positive terms this query needs in one field.
    ///
    /// Used by the highlighter: `MustNot` clauses are skipped because a
    /// matching document cannot contain their terms.
    pub fn terms_for_field<'a>(&'a self, field: &str) -> Vec<&'a str> {
        let mut terms = Vec::new();
        self.collect_terms(field, &mut terms);
        terms
    }

    fn collect_terms<'a>(&'a self, field: &str, out: &mut Vec<&'a str>) {
        match self {
            Query::Term { field: f, term } if f == field => out.push(term),
            Query::Term { .. } => {}
            Query::Boolean { clauses } => {
                for clause in clauses {
                    if clause.occur != Occur::MustNot {
                        clause.query.collect_terms(field, out);
                    }
                }
            }
            Query::Phrase { field: f, terms } if f == field => {
                out.extend(terms.iter().map(String::as_str));
            }
            Query::Phrase { .. } => {}
            Query::Span { field: f, term, .. } if f == field => out.push(term),
            Query::Span { .. } => {}
        }
    }

    /// A human-readable description of the query.
    pub fn description(&self) -> String {
        match self {
            Query::Term { field, term } => format!("{field}:{term}"),
            Query::Boolean { clauses } => {
                let parts: Vec<String> = clauses
                    .iter()
                    .map(|clause| {
                        let prefix = match clause.occur {
                            Occur::Must => "+",
                            Occur::Should => "",
                            Occur::MustNot => "-",
                        };
                        format!("{prefix}{}", clause.query.description())
                    })
                    .collect();
                parts.join(" ")
            }
            Query::Phrase { field, terms } => {
                format!("{field}:\"{}\"", terms.join(" "))
            }
            Query::Span {
                field,
                term,
                window,
            } => format!("{field}:{term}~{window}"),
        }
    }
}

/// Builder for boolean queries.
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    clauses: Vec<BooleanClause>,
}

impl BooleanQueryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        BooleanQueryBuilder::default()
    }

    /// Add a clause that must match.
    pub fn must(mut self, query: Query) -> Self {
        self.clauses.push(BooleanClause {
            query,
            occur: Occur::Must,
        });
        self
    }

    /// Add a clause that should match.
    pub fn should(mut self, query: Query) -> Self {
        self.clauses.push(BooleanClause {
            query,
            occur: Occur::Should,
        });
        self
    }

    /// Add a clause that must not match.
    pub fn must_not(mut self, query: Query) -> Self {
        self.clauses.push(BooleanClause {
            query,
            occur: Occur::MustNot,
        });
        self
    }

    /// Add a clause with an explicit occurrence.
    pub fn clause(mut self, query: Query, occur: Occur) -> Self {
        self.clauses.push(BooleanClause { query, occur });
        self
    }

    /// Build the boolean query.
    pub fn build(self) -> Query {
        Query::Boolean {
            clauses: self.clauses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clause_order() {
        let query = Query::boolean()
            .must(Query::term("content", "quick"))
            .should(Query::term("content", "brown"))
            .must_not(Query::term("content", "lazy"))
            .build();

        let Query::Boolean { clauses } = &query else {
            panic!("expected boolean query");
        };
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0].occur, Occur::Must);
        assert_eq!(clauses[1].occur, Occur::Should);
        assert_eq!(clauses[2].occur, Occur::MustNot);
    }

    #[test]
    fn test_description() {
        assert_eq!(Query::term("content", "fox").description(), "content:fox");
        assert_eq!(
            Query::phrase("content", vec!["quick".to_string(), "brown".to_string()])
                .description(),
            "content:\"quick brown\""
        );
        assert_eq!(Query::span("content", "fox", 2).description(), "content:fox~2");
    }

    #[test]
    fn test_terms_for_field_skips_must_not() {
        let query = Query::boolean()
            .must(Query::term("content", "quick"))
            .must(Query::term("title", "intro"))
            .must_not(Query::term("content", "lazy"))
            .should(Query::phrase(
                "content",
                vec!["brown".to_string(), "fox".to_string()],
            ))
            .build();

        let terms = query.terms_for_field("content");
        assert_eq!(terms, vec!["quick", "brown", "fox"]);
    }
}
