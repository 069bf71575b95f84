//! Heading-based chunking of knowledge documents.
//!
//! Splits markdown-like documents into retrievable sections, one chunk per
//! `#`-prefixed heading, and loads whole knowledge directories.

use crate::error::{HenteError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Category assigned to content that precedes the first heading, or to a
/// document with no headings at all.
pub const UNCATEGORIZED: &str = "uncategorized";

/// File extensions ingested from the knowledge directory.
const KNOWLEDGE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Optional chunk annotations carried alongside the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChunkMetadata {
    /// Section heading this chunk belongs to, markers stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-form keywords for the chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// One retrievable unit of a source document.
///
/// Immutable once created; the whole set is replaced on every index rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique within a build: `{source}-{ordinal}`.
    pub id: String,
    /// Text content, including the heading line, trimmed.
    pub content: String,
    /// Source file name this chunk came from.
    pub source: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

/// Split a document into heading-delimited chunks.
///
/// A line starting with one or more `#` opens a new chunk and sets its
/// category to the heading text. The heading line itself belongs to the
/// chunk content. Content before the first heading becomes its own chunk
/// with category [`UNCATEGORIZED`], as does a document with no headings.
/// Whitespace-only chunks are dropped. Chunk IDs are `{source}-{ordinal}`
/// with the ordinal restarting at 0 for each source.
pub fn split_into_sections(text: &str, source: &str) -> Vec<KnowledgeChunk> {
    let mut chunks = Vec::new();
    let mut current_title: Option<String> = None;
    let mut current_content = String::new();

    for line in text.lines() {
        if is_heading(line) {
            flush_chunk(&mut chunks, source, current_title.take(), &current_content);
            current_title = Some(heading_text(line));
            current_content = String::new();
        }
        current_content.push_str(line);
        current_content.push('\n');
    }

    flush_chunk(&mut chunks, source, current_title, &current_content);
    chunks
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn heading_text(line: &str) -> String {
    line.trim().trim_start_matches('#').trim().to_string()
}

fn flush_chunk(
    chunks: &mut Vec<KnowledgeChunk>,
    source: &str,
    title: Option<String>,
    content: &str,
) {
    let content = content.trim();
    if content.is_empty() {
        return;
    }

    let category = title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    chunks.push(KnowledgeChunk {
        id: format!("{}-{}", source, chunks.len()),
        content: content.to_string(),
        source: source.to_string(),
        metadata: ChunkMetadata {
            category: Some(category),
            keywords: None,
        },
    });
}

/// Load and chunk every knowledge document in a directory.
///
/// Files are processed in sorted name order so chunk IDs are stable across
/// rebuilds of the same content. A missing directory is a hard error; the
/// caller decides whether an empty result is acceptable.
pub fn load_knowledge_dir(dir: &Path) -> Result<Vec<KnowledgeChunk>> {
    if !dir.is_dir() {
        return Err(HenteError::Knowledge(format!(
            "knowledge directory not found: {}",
            dir.display()
        )));
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| KNOWLEDGE_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();

    let mut chunks = Vec::new();
    for path in &files {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping unreadable knowledge file {}: {}", source, e);
                continue;
            }
        };

        let sections = split_into_sections(&content, &source);
        debug!("Chunked {} into {} sections", source, sections.len());
        chunks.extend(sections);
    }

    info!(
        "Loaded {} knowledge chunks from {} files",
        chunks.len(),
        files.len()
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(chunks: &[KnowledgeChunk]) -> Vec<&str> {
        chunks
            .iter()
            .map(|c| c.metadata.category.as_deref().unwrap_or_default())
            .collect()
    }

    #[test]
    fn document_without_headings_is_one_chunk() {
        let chunks = split_into_sections("just some text\nover two lines\n", "notes.md");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "just some text\nover two lines");
        assert_eq!(chunks[0].id, "notes.md-0");
        assert_eq!(categories(&chunks), vec![UNCATEGORIZED]);
    }

    #[test]
    fn headings_delimit_chunks() {
        let chunks = split_into_sections("# Intro\nHello\n## Details\nWorld", "a.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(categories(&chunks), vec!["Intro", "Details"]);
        assert!(chunks[0].content.contains("Hello"));
        assert!(chunks[0].content.starts_with("# Intro"));
        assert!(chunks[1].content.contains("World"));
        assert_eq!(chunks[0].id, "a.md-0");
        assert_eq!(chunks[1].id, "a.md-1");
        assert!(chunks.iter().all(|c| c.source == "a.md"));
    }

    #[test]
    fn preamble_before_first_heading_is_uncategorized() {
        let chunks = split_into_sections("preamble line\n# First\nbody", "b.md");
        assert_eq!(chunks.len(), 2);
        assert_eq!(categories(&chunks), vec![UNCATEGORIZED, "First"]);
        assert_eq!(chunks[0].content, "preamble line");
    }

    #[test]
    fn whitespace_only_sections_are_dropped() {
        let chunks = split_into_sections("# Empty\n\n   \n# Full\ncontent", "c.md");
        // "# Empty" still has its heading line as content, so it survives;
        // a fully blank document does not.
        assert_eq!(chunks.len(), 2);
        assert!(split_into_sections("   \n\n", "d.md").is_empty());
        assert!(split_into_sections("", "e.md").is_empty());
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "# A\none\n# B\ntwo\n";
        let first = split_into_sections(text, "x.md");
        let second = split_into_sections(text, "x.md");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = load_knowledge_dir(Path::new("/nonexistent/hente-kb")).unwrap_err();
        assert!(matches!(err, HenteError::Knowledge(_)));
    }

    #[test]
    fn loads_directory_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "# Second\ntext").unwrap();
        std::fs::write(dir.path().join("a.md"), "# First\ntext").unwrap();
        std::fs::write(dir.path().join("ignored.pdf"), "binary").unwrap();

        let chunks = load_knowledge_dir(dir.path()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, "a.md");
        assert_eq!(chunks[1].source, "b.md");
    }
}
