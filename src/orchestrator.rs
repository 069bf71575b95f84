//! RAG orchestration for Hente.
//!
//! Composes chunking, embedding, persistence and ranking into the two
//! public operations: offline index builds and online similarity search.

use crate::chunking::load_knowledge_dir;
use crate::config::Settings;
use crate::embedding::{Embedder, GlmEmbedder};
use crate::error::Result;
use crate::rag;
use crate::search;
use crate::vector_index::{IndexStore, RagSearchResult, VectorIndex};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Summary of a completed index build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub chunk_count: usize,
    pub batch_count: usize,
    pub index_path: std::path::PathBuf,
}

/// In-memory state of the lazily-loaded index.
///
/// `Missing` is cached separately from `Unloaded` so the store is probed at
/// most once per process lifetime unless explicitly invalidated.
enum IndexSlot {
    Unloaded,
    Missing,
    Loaded(Arc<VectorIndex>),
}

/// The RAG service façade.
///
/// Constructed once at process start with injected configuration and passed
/// by reference to callers. The loaded index is read-only shared state;
/// concurrent searches clone the same `Arc` without coordination. Rebuilds
/// replace it wholesale.
pub struct RagOrchestrator {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    store: IndexStore,
    index: RwLock<IndexSlot>,
}

impl RagOrchestrator {
    /// Create an orchestrator with the default GLM embedder.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(GlmEmbedder::from_settings(&settings.embedding)?);
        Ok(Self::with_embedder(settings, embedder))
    }

    /// Create an orchestrator with a custom embedder.
    pub fn with_embedder(settings: Settings, embedder: Arc<dyn Embedder>) -> Self {
        let store = IndexStore::new(settings.index_path());
        Self {
            settings,
            embedder,
            store,
            index: RwLock::new(IndexSlot::Unloaded),
        }
    }

    /// Rebuild the vector index from the knowledge directory.
    #[instrument(skip(self))]
    pub async fn build_index(&self) -> Result<BuildReport> {
        self.build_index_with(|_, _| {}).await
    }

    /// Rebuild the vector index, reporting `(completed, total)` batches.
    ///
    /// Fails hard before any network call if the knowledge directory is
    /// missing or yields no chunks; an empty index is never written.
    pub async fn build_index_with<F>(&self, mut on_batch: F) -> Result<BuildReport>
    where
        F: FnMut(usize, usize),
    {
        let chunks = load_knowledge_dir(&self.settings.knowledge_dir())?;
        if chunks.is_empty() {
            return Err(crate::HenteError::Knowledge(format!(
                "no knowledge documents found in {}",
                self.settings.knowledge_dir().display()
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let batch_size = self.embedder.batch_size();
        let batch_count = texts.len().div_ceil(batch_size);
        let cooldown = Duration::from_millis(self.settings.embedding.batch_cooldown_ms);

        info!(
            "Embedding {} chunks in {} batches of up to {}",
            texts.len(),
            batch_count,
            batch_size
        );

        // Batches run strictly one at a time with a cool-down in between,
        // to stay under the provider's rate limits.
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        for (i, batch) in texts.chunks(batch_size).enumerate() {
            if i > 0 && !cooldown.is_zero() {
                tokio::time::sleep(cooldown).await;
            }
            embeddings.extend(self.embedder.embed_batch(batch).await?);
            on_batch(i + 1, batch_count);
        }

        let index = VectorIndex::new(chunks, embeddings)?;
        self.store.write(&index)?;

        let report = BuildReport {
            chunk_count: index.len(),
            batch_count,
            index_path: self.store.path().to_path_buf(),
        };

        // Swap the in-memory copy; searches already in flight keep reading
        // the old Arc.
        *self.index.write().await = IndexSlot::Loaded(Arc::new(index));

        Ok(report)
    }

    /// Search the index for chunks relevant to `query`.
    ///
    /// A missing index and transient retrieval failures degrade to an empty
    /// result set so the chat response path is never blocked. Corrupt index
    /// files and embedding-dimension mismatches are real errors.
    #[instrument(skip(self, query))]
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RagSearchResult>> {
        let Some(index) = self.ensure_loaded().await? else {
            warn!("Vector index absent; returning no context");
            return Ok(Vec::new());
        };

        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) if e.is_retrieval_degradable() => {
                warn!("Query embedding failed, degrading to no context: {}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let results = search::rank(&query_embedding, &index, top_k, self.settings.search.threshold)?;
        info!(
            "Retrieved {} relevant chunks (threshold: {})",
            results.len(),
            self.settings.search.threshold
        );
        Ok(results)
    }

    /// Format search results as a prompt context block.
    pub fn format_context(&self, results: &[RagSearchResult]) -> String {
        rag::format_context(results)
    }

    /// Drop the cached index so the next search re-reads the file.
    pub async fn invalidate(&self) {
        *self.index.write().await = IndexSlot::Unloaded;
    }

    /// Load the index from disk at most once, caching "missing" too.
    async fn ensure_loaded(&self) -> Result<Option<Arc<VectorIndex>>> {
        {
            let slot = self.index.read().await;
            match &*slot {
                IndexSlot::Loaded(index) => return Ok(Some(index.clone())),
                IndexSlot::Missing => return Ok(None),
                IndexSlot::Unloaded => {}
            }
        }

        let mut slot = self.index.write().await;
        // Another task may have loaded it while we waited for the lock.
        match &*slot {
            IndexSlot::Loaded(index) => return Ok(Some(index.clone())),
            IndexSlot::Missing => return Ok(None),
            IndexSlot::Unloaded => {}
        }

        match self.store.read()? {
            Some(index) => {
                info!(
                    "Loaded vector index with {} chunks (updated {})",
                    index.len(),
                    index.updated_at
                );
                let index = Arc::new(index);
                *slot = IndexSlot::Loaded(index.clone());
                Ok(Some(index))
            }
            None => {
                *slot = IndexSlot::Missing;
                Ok(None)
            }
        }
    }
}
