//! Query string parser.
//!
//! Parses a small query language into a [`Query`]:
//!
//! - `fox`: term in the default field
//! - `title:fox`: term in an explicit field
//! - `"quick brown"`: phrase
//! - `+quick` / `-lazy`: must / must-not clauses; bare clauses are should
//!
//! Terms and phrases are run through the same analyzer used at index time,
//! so a query matches exactly what the writer indexed.
//!
//! ```
//! use std::sync::Arc;
//! use lucerna::analysis::StandardAnalyzer;
//! use lucerna::query::QueryParser;
//!
//! let parser = QueryParser::new("content", Arc::new(StandardAnalyzer::new()));
//! let query = parser.parse("+Quick -lazy title:\"rust book\"").unwrap();
//! assert_eq!(query.description(), "+content:quick -content:lazy title:\"rust book\"");
//! ```

use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::error::{LucernaError, Result};
use crate::query::{Occur, Query};

/// Parses query strings against a default field.
pub struct QueryParser {
    default_field: String,
    analyzer: Arc<dyn Analyzer>,
}

impl QueryParser {
    /// Create a parser with a default field and an analyzer.
    pub fn new<F: Into<String>>(default_field: F, analyzer: Arc<dyn Analyzer>) -> Self {
        QueryParser {
            default_field: default_field.into(),
            analyzer,
        }
    }

    /// Parse a query string.
    ///
    /// An empty or all-whitespace input parses to a boolean query with no
    /// clauses, which matches nothing.
    pub fn parse(&self, input: &str) -> Result<Query> {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut builder = Query::boolean();
        let mut clause_count = 0;
        let mut single: Option<(Query, Occur)> = None;

        while pos < chars.len() {
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            if pos >= chars.len() {
                break;
            }

            let occur = match chars[pos] {
                '+' => {
                    pos += 1;
                    Occur::Must
                }
                '-' => {
                    pos += 1;
                    Occur::MustNot
                }
                _ => Occur::Should,
            };

            let (field, quoted) = self.read_qualifier(&chars, &mut pos)?;
            let field = field.unwrap_or_else(|| self.default_field.clone());

            let query = if quoted {
                let text = read_quoted(&chars, &mut pos)?;
                self.analyzed_query(&field, &text)?
            } else {
                let text = read_word(&chars, &mut pos);
                if text.is_empty() {
                    return Err(LucernaError::parse(format!(
                        "expected term at offset {pos}"
                    )));
                }
                self.analyzed_query(&field, &text)?
            };

            // Analysis can drop every token (e.g. punctuation only).
            let Some(query) = query else {
                continue;
            };

            single = Some((query.clone(), occur));
            builder = builder.clause(query, occur);
            clause_count += 1;
        }

        if clause_count == 1
            && let Some((query, Occur::Should)) = single
        {
            return Ok(query);
        }
        Ok(builder.build())
    }

    /// Read an optional `field:` qualifier. Returns the field (if present)
    /// and whether the clause body is a quoted phrase.
    fn read_qualifier(&self, chars: &[char], pos: &mut usize) -> Result<(Option<String>, bool)> {
        if chars.get(*pos) == Some(&'"') {
            return Ok((None, true));
        }

        // Look ahead for a colon before the clause body ends.
        let mut probe = *pos;
        while probe < chars.len() && !chars[probe].is_whitespace() && chars[probe] != '"' {
            if chars[probe] == ':' {
                let field: String = chars[*pos..probe].iter().collect();
                if field.is_empty()
                    || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(LucernaError::parse(format!(
                        "malformed field qualifier '{field}'"
                    )));
                }
                *pos = probe + 1;
                let quoted = chars.get(*pos) == Some(&'"');
                return Ok((Some(field), quoted));
            }
            probe += 1;
        }

        Ok((None, false))
    }

    /// Analyze clause text into a term or phrase query. Returns `None` when
    /// analysis yields no tokens.
    fn analyzed_query(&self, field: &str, text: &str) -> Result<Option<Query>> {
        let mut terms: Vec<String> = self
            .analyzer
            .analyze(text)?
            .map(|token| token.text)
            .collect();

        Ok(match terms.len() {
            0 => None,
            1 => {
                let term = terms.remove(0);
                Some(Query::term(field, term))
            }
            _ => Some(Query::phrase(field, terms)),
        })
    }
}

fn read_word(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && !chars[*pos].is_whitespace() && chars[*pos] != '"' {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn read_quoted(chars: &[char], pos: &mut usize) -> Result<String> {
    // Caller saw the opening quote.
    *pos += 1;
    let start = *pos;
    while *pos < chars.len() && chars[*pos] != '"' {
        *pos += 1;
    }
    if *pos >= chars.len() {
        return Err(LucernaError::parse("unbalanced quote in query"));
    }
    let text: String = chars[start..*pos].iter().collect();
    *pos += 1;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::query::BooleanClause;

    fn parser() -> QueryParser {
        QueryParser::new("content", Arc::new(StandardAnalyzer::new()))
    }

    #[test]
    fn test_single_term_unwrapped() {
        let query = parser().parse("Fox").unwrap();
        assert_eq!(query, Query::term("content", "fox"));
    }

    #[test]
    fn test_explicit_field() {
        let query = parser().parse("title:Intro").unwrap();
        assert_eq!(query, Query::term("title", "intro"));
    }

    #[test]
    fn test_quoted_phrase() {
        let query = parser().parse("\"Quick Brown Fox\"").unwrap();
        assert_eq!(
            query,
            Query::phrase(
                "content",
                vec!["quick".to_string(), "brown".to_string(), "fox".to_string()]
            )
        );
    }

    #[test]
    fn test_field_qualified_phrase() {
        let query = parser().parse("title:\"rust book\"").unwrap();
        assert_eq!(
            query,
            Query::phrase("title", vec!["rust".to_string(), "book".to_string()])
        );
    }

    #[test]
    fn test_occur_prefixes() {
        let query = parser().parse("+quick brown -lazy").unwrap();
        let Query::Boolean { clauses } = query else {
            panic!("expected boolean query");
        };
        let occurs: Vec<Occur> = clauses.iter().map(|c| c.occur).collect();
        assert_eq!(occurs, vec![Occur::Must, Occur::Should, Occur::MustNot]);
    }

    #[test]
    fn test_hyphenated_word_becomes_phrase() {
        let query = parser().parse("full-text").unwrap();
        assert_eq!(
            query,
            Query::phrase("content", vec!["full".to_string(), "text".to_string()])
        );
    }

    #[test]
    fn test_empty_input() {
        let query = parser().parse("   ").unwrap();
        assert_eq!(query, Query::Boolean { clauses: vec![] });
    }

    #[test]
    fn test_punctuation_only_clause_dropped() {
        let query = parser().parse("... fox").unwrap();
        assert_eq!(query, Query::term("content", "fox"));
    }

    #[test]
    fn test_unbalanced_quote_rejected() {
        assert!(parser().parse("\"quick brown").is_err());
    }

    #[test]
    fn test_malformed_field_rejected() {
        assert!(parser().parse("ti tle:fox").is_ok());
        assert!(parser().parse("ti/tle:fox").is_err());
    }

    #[test]
    fn test_single_must_clause_stays_boolean() {
        let query = parser().parse("+fox").unwrap();
        assert_eq!(
            query,
            Query::Boolean {
                clauses: vec![BooleanClause {
                    query: Query::term("content", "fox"),
                    occur: Occur::Must,
                }]
            }
        );
    }
}
