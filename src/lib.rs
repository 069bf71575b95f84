//! Hente - Knowledge Base Retrieval
//!
//! A CLI tool for turning a folder of markdown documents into a searchable
//! vector index and answering similarity queries against it.
//!
//! The name "Hente" comes from the Norwegian word for "fetch" or "retrieve."
//!
//! # Overview
//!
//! Hente allows you to:
//! - Chunk markdown knowledge documents by heading
//! - Embed chunks via an external embedding provider, under rate limits
//! - Persist the chunk + vector collection as a single JSON index file
//! - Run similarity searches and format the results as prompt context
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `chunking` - Heading-based document chunking
//! - `embedding` - Embedding generation with retry/backoff
//! - `vector_index` - Vector index persistence
//! - `search` - Cosine-similarity ranking
//! - `rag` - Context formatting for downstream prompts
//! - `orchestrator` - Build/search coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use hente::config::Settings;
//! use hente::orchestrator::RagOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = RagOrchestrator::new(settings)?;
//!
//!     let results = orchestrator.search("work experience", 5).await?;
//!     println!("{}", orchestrator.format_context(&results));
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod orchestrator;
pub mod rag;
pub mod search;
pub mod vector_index;

pub use error::{HenteError, Result};
