//! Build command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{CredentialProvider, EnvCredential};
use crate::orchestrator::RagOrchestrator;
use anyhow::Result;

/// Run the build command: rebuild the vector index from the knowledge
/// directory. Failures propagate so the process exits non-zero; this path
/// is operator-triggered and never sits on a live user request.
pub async fn run_build(settings: Settings) -> Result<()> {
    Output::header("Building vector index");
    for var in &settings.embedding.api_key_env {
        let set = std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false);
        Output::kv(var, if set { "set" } else { "not set" });
    }

    // Fail the obvious misconfiguration up front rather than after chunking.
    let credential = EnvCredential::new(settings.embedding.api_key_env.clone());
    if credential.resolve().is_none() {
        Output::error("No embedding API key set; aborting build.");
        anyhow::bail!("missing embedding API key");
    }

    Output::kv("knowledge dir", &settings.knowledge_dir().display().to_string());
    Output::kv("index path", &settings.index_path().display().to_string());

    let orchestrator = RagOrchestrator::new(settings)?;

    let pb = Output::progress_bar(0, "Embedding batches");
    let report = orchestrator
        .build_index_with(|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;
    pb.finish_and_clear();

    match report {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} chunks in {} batches",
                report.chunk_count, report.batch_count
            ));
            Output::kv("saved to", &report.index_path.display().to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Build failed: {}", e));
            Err(e.into())
        }
    }
}
