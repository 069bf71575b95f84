//! Configuration management for Hente.

mod settings;

pub use settings::{EmbeddingSettings, GeneralSettings, SearchSettings, Settings};
