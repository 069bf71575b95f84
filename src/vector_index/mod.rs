//! Vector index persistence.
//!
//! The chunk + embedding collection is stored as one JSON file and replaced
//! wholesale on every rebuild. "File does not exist" is a normal state, not
//! an error; a corrupt file is.

use crate::chunking::KnowledgeChunk;
use crate::error::{HenteError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The complete searchable index: chunks and their embeddings, row-aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndex {
    pub chunks: Vec<KnowledgeChunk>,
    pub embeddings: Vec<Vec<f32>>,
    pub updated_at: DateTime<Utc>,
}

impl VectorIndex {
    /// Assemble an index, enforcing the chunk/embedding row alignment.
    pub fn new(chunks: Vec<KnowledgeChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let index = Self {
            chunks,
            embeddings,
            updated_at: Utc::now(),
        };
        index.validate()?;
        Ok(index)
    }

    /// Check the `embeddings[i] corresponds to chunks[i]` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.chunks.len() != self.embeddings.len() {
            return Err(HenteError::IndexStore(format!(
                "index has {} chunks but {} embeddings",
                self.chunks.len(),
                self.embeddings.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// A ranked search hit against the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSearchResult {
    pub chunk: KnowledgeChunk,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
}

/// Reads and writes the vector index file.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the index, replacing any prior content.
    ///
    /// Writes to a sibling temp file and renames it into place, so a
    /// concurrent reader of the old file never sees a torn write.
    pub fn write(&self, index: &VectorIndex) -> Result<()> {
        index.validate()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(index)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        info!(
            "Wrote vector index with {} chunks to {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Load the index, or `None` if the file does not exist.
    ///
    /// A file that exists but does not parse, or that violates the row
    /// alignment invariant, is an error rather than a silent "absent".
    pub fn read(&self) -> Result<Option<VectorIndex>> {
        if !self.path.exists() {
            debug!("Vector index not found at {}", self.path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let index: VectorIndex = serde_json::from_str(&content).map_err(|e| {
            HenteError::IndexStore(format!(
                "corrupt vector index at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        index.validate()?;

        debug!(
            "Loaded vector index with {} chunks (updated {})",
            index.len(),
            index.updated_at
        );
        Ok(Some(index))
    }
}
