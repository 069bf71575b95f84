//! Configuration settings for Hente.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory containing the knowledge documents to index.
    pub knowledge_dir: String,
    /// Path of the persisted vector index file.
    pub index_path: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            knowledge_dir: "knowledge".to_string(),
            index_path: "public/vector-index.json".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of the embedding provider API.
    pub base_url: String,
    /// Embedding model to use.
    pub model: String,
    /// Environment variables checked (in order) for the API key.
    pub api_key_env: Vec<String>,
    /// Maximum texts per embedding request. The provider documents a
    /// batch maximum of about 64; 32 is a conservative sub-limit.
    pub batch_size: usize,
    /// Cool-down between successive batches, in milliseconds.
    pub batch_cooldown_ms: u64,
    /// Maximum attempts per request when rate limited.
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://open.bigmodel.cn/api/paas/v4".to_string(),
            model: "embedding-3".to_string(),
            api_key_env: vec!["GLM_API_KEY".to_string(), "ZHIPU_API_KEY".to_string()],
            batch_size: 32,
            batch_cooldown_ms: 1000,
            max_retries: 8,
            timeout_secs: 60,
        }
    }
}

/// Similarity search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default number of results to return.
    pub top_k: usize,
    /// Minimum similarity score for a result to be considered relevant.
    pub threshold: f32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            threshold: 0.3,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::HenteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hente")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded knowledge directory path.
    pub fn knowledge_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.knowledge_dir)
    }

    /// Get the expanded vector index file path.
    pub fn index_path(&self) -> PathBuf {
        Self::expand_path(&self.general.index_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.batch_size, 32);
        assert_eq!(settings.embedding.max_retries, 8);
        assert_eq!(settings.search.top_k, 5);
        assert!((settings.search.threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            threshold = 0.2
            "#,
        )
        .unwrap();
        assert!((settings.search.threshold - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.search.top_k, 5);
        assert_eq!(settings.embedding.model, "embedding-3");
    }
}
