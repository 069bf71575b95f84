//! Error types for Hente.

use thiserror::Error;

/// Library-level error type for Hente operations.
#[derive(Error, Debug)]
pub enum HenteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Rate limited by embedding provider after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Unexpected embedding provider response: {0}")]
    Format(String),

    #[error("Vector index error: {0}")]
    IndexStore(String),

    #[error("Embedding dimension mismatch: query has {query} dimensions, index has {index}")]
    DimensionMismatch { query: usize, index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl HenteError {
    /// Whether this error degrades to an empty result set on the search
    /// path instead of surfacing to the caller.
    ///
    /// Retrieval failures (missing credential, rate-limit exhaustion,
    /// provider hiccups) must never block the chat response path. Index
    /// integrity problems (corrupt file, dimension mismatch) do surface.
    pub fn is_retrieval_degradable(&self) -> bool {
        matches!(
            self,
            HenteError::Config(_)
                | HenteError::Embedding(_)
                | HenteError::RateLimited { .. }
                | HenteError::Format(_)
                | HenteError::Http(_)
        )
    }
}

/// Result type alias for Hente operations.
pub type Result<T> = std::result::Result<T, HenteError>;
