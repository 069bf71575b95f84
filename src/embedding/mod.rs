//! Embedding generation for semantic search and retrieval.

mod glm;
pub mod retry;

pub use glm::GlmEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for one batch of texts, returned in input order.
    ///
    /// Batch length must not exceed [`Embedder::batch_size`]; callers split
    /// larger collections into sequential batches themselves.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Maximum number of texts accepted per `embed_batch` call.
    fn batch_size(&self) -> usize;
}

/// Resolves the provider credential at call time.
///
/// Resolution happens on every outbound request rather than once at
/// construction, so rotated credentials take effect without a restart.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self) -> Option<String>;
}

/// Credential provider that reads an ordered list of environment variables.
pub struct EnvCredential {
    vars: Vec<String>,
}

impl EnvCredential {
    pub fn new(vars: Vec<String>) -> Self {
        Self { vars }
    }
}

impl CredentialProvider for EnvCredential {
    fn resolve(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.is_empty())
    }
}

/// Fixed credential, mainly for tests.
pub struct StaticCredential(pub Option<String>);

impl CredentialProvider for StaticCredential {
    fn resolve(&self) -> Option<String> {
        self.0.clone()
    }
}
