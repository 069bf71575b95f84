//! Doctor command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{CredentialProvider, EnvCredential};
use crate::vector_index::IndexStore;
use anyhow::Result;

/// Run the doctor command: report on credentials, the knowledge directory
/// and the state of the persisted index.
pub fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Configuration");
    let config_path = Settings::default_config_path();
    Output::kv(
        "config file",
        &format!(
            "{} ({})",
            config_path.display(),
            if config_path.exists() { "present" } else { "defaults" }
        ),
    );
    Output::kv("embedding model", &settings.embedding.model);
    Output::kv("search threshold", &settings.search.threshold.to_string());

    Output::header("Credentials");
    let credential = EnvCredential::new(settings.embedding.api_key_env.clone());
    if credential.resolve().is_some() {
        Output::success("Embedding API key resolved.");
    } else {
        Output::warning(&format!(
            "No API key found; set one of: {}",
            settings.embedding.api_key_env.join(", ")
        ));
    }

    Output::header("Knowledge base");
    let knowledge_dir = settings.knowledge_dir();
    if knowledge_dir.is_dir() {
        let files = std::fs::read_dir(&knowledge_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .count();
        Output::kv("directory", &knowledge_dir.display().to_string());
        Output::kv("files", &files.to_string());
    } else {
        Output::warning(&format!(
            "Knowledge directory missing: {}",
            knowledge_dir.display()
        ));
    }

    Output::header("Vector index");
    let store = IndexStore::new(settings.index_path());
    match store.read() {
        Ok(Some(index)) => {
            Output::kv("path", &settings.index_path().display().to_string());
            Output::kv("chunks", &index.len().to_string());
            Output::kv("updated", &index.updated_at.to_rfc3339());
            let dims = index.embeddings.first().map(|e| e.len()).unwrap_or(0);
            Output::kv("dimensions", &dims.to_string());
        }
        Ok(None) => {
            Output::warning("Index not built yet; run `hente build`.");
        }
        Err(e) => {
            Output::error(&format!("Index file is corrupt: {}", e));
        }
    }

    Ok(())
}
