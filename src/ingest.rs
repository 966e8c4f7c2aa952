//! Batch document ingestion.
//!
//! Takes raw document sources, shapes them into the standard document
//! layout (a `content` text field plus `path` and `filename` keywords),
//! and feeds them to an [`IndexWriter`]. Ingestion is best-effort: a
//! source that cannot be decoded is logged and skipped, and the batch
//! carries on. Writer and storage failures stay fatal.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::document::{DocId, Document};
use crate::error::{LucernaError, Result};
use crate::index::IndexWriter;

/// File extensions accepted by [`collect_sources`].
const INDEXABLE_EXTENSIONS: &[&str] = &["txt", "html", "htm", "xml"];

/// A raw document to be ingested: a path and its content bytes.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Source path, indexed as the `path` keyword field.
    pub path: String,
    /// Raw content bytes; must decode as UTF-8 to be indexed.
    pub content: Vec<u8>,
}

impl DocumentSource {
    /// Create a source from a path and content bytes.
    pub fn new<P: Into<String>>(path: P, content: Vec<u8>) -> Self {
        DocumentSource {
            path: path.into(),
            content,
        }
    }

    /// Read a source from the file system.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path)?;
        Ok(DocumentSource {
            path: path.to_string_lossy().into_owned(),
            content,
        })
    }

    /// The final component of the path.
    pub fn filename(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }
}

/// The outcome of a batch ingest.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Successfully indexed sources with their assigned doc ids.
    pub indexed: Vec<(String, DocId)>,
    /// Skipped sources with the reason each was skipped.
    pub skipped: Vec<(String, String)>,
}

impl IngestReport {
    /// Number of indexed sources.
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    /// Number of skipped sources.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Ingest a batch of sources into the writer.
///
/// A source whose content is not valid UTF-8 is recorded in the report and
/// skipped; errors from the writer itself abort the batch.
pub fn ingest(writer: &IndexWriter, sources: Vec<DocumentSource>) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for source in sources {
        let text = match String::from_utf8(source.content) {
            Ok(text) => text,
            Err(e) => {
                warn!("skipping {}: {e}", source.path);
                report
                    .skipped
                    .push((source.path, format!("invalid utf-8: {e}")));
                continue;
            }
        };

        let filename = source
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(source.path.as_str())
            .to_string();

        let document = Document::builder()
            .text("content", text)
            .keyword("path", source.path.clone())
            .keyword("filename", filename)
            .build();

        let doc_id = writer.add_document(document)?;
        report.indexed.push((source.path, doc_id));
    }

    info!(
        "ingested {} documents, skipped {}",
        report.indexed_count(),
        report.skipped_count()
    );
    Ok(report)
}

/// Walk a directory recursively and collect every indexable file.
///
/// Only files with one of the extensions in [`INDEXABLE_EXTENSIONS`]
/// (case-insensitive) are returned, sorted by path.
pub fn collect_sources<P: AsRef<Path>>(dir: P) -> Result<Vec<DocumentSource>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(LucernaError::ingest(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut sources = Vec::new();
    collect_into(dir, &mut sources)?;
    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

fn collect_into(dir: &Path, sources: &mut Vec<DocumentSource>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_into(&path, sources)?;
        } else if is_indexable(&path) {
            sources.push(DocumentSource::from_file(&path)?);
        }
    }
    Ok(())
}

fn is_indexable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            INDEXABLE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::storage::memory::MemoryStorage;

    fn writer() -> IndexWriter {
        IndexWriter::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(StandardAnalyzer::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_ingest_batch() {
        let writer = writer();
        let report = ingest(
            &writer,
            vec![
                DocumentSource::new("/docs/fox.txt", b"the quick brown fox".to_vec()),
                DocumentSource::new("/docs/dog.txt", b"the lazy dog".to_vec()),
            ],
        )
        .unwrap();

        assert_eq!(report.indexed_count(), 2);
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.indexed[0], ("/docs/fox.txt".to_string(), 0));

        let segment = writer.commit().unwrap();
        assert_eq!(segment.doc_frequency("content", "fox"), 1);
        assert_eq!(segment.doc_frequency("path", "/docs/fox.txt"), 1);
        assert_eq!(segment.doc_frequency("filename", "fox.txt"), 1);
    }

    #[test]
    fn test_invalid_utf8_skipped_batch_continues() {
        let writer = writer();
        let report = ingest(
            &writer,
            vec![
                DocumentSource::new("bad.txt", vec![0xFF, 0xFE, 0x00]),
                DocumentSource::new("good.txt", b"still indexed".to_vec()),
            ],
        )
        .unwrap();

        assert_eq!(report.indexed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].0, "bad.txt");
        assert_eq!(report.indexed[0].1, 0);
    }

    #[test]
    fn test_filename_extraction() {
        let source = DocumentSource::new("/a/b/c.txt", Vec::new());
        assert_eq!(source.filename(), "c.txt");

        let bare = DocumentSource::new("c.txt", Vec::new());
        assert_eq!(bare.filename(), "c.txt");
    }

    #[test]
    fn test_collect_sources_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.HTML"), "beta").unwrap();
        fs::write(dir.path().join("c.rs"), "skipped").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.xml"), "delta").unwrap();

        let sources = collect_sources(dir.path()).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.filename()).collect();
        assert_eq!(names, vec!["a.txt", "b.HTML", "d.xml"]);
    }

    #[test]
    fn test_collect_sources_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "alpha").unwrap();
        assert!(collect_sources(&file).is_err());
    }
}
