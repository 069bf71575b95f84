//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::RagOrchestrator;
use crate::rag::format_context;
use anyhow::Result;

/// Number of results to return: the flag if given, else the configured value.
fn effective_limit(limit: Option<usize>, settings: &Settings) -> usize {
    limit.unwrap_or(settings.search.top_k)
}

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: Option<usize>,
    min_score: Option<f32>,
    print_context: bool,
    mut settings: Settings,
) -> Result<()> {
    if let Some(threshold) = min_score {
        settings.search.threshold = threshold;
    }
    let limit = effective_limit(limit, &settings);

    let orchestrator = RagOrchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else if print_context {
                println!("{}", format_context(&results));
            } else {
                Output::success(&format!("Found {} results", results.len()));
                for result in &results {
                    Output::search_result(
                        &result.chunk.id,
                        result.chunk.metadata.category.as_deref().unwrap_or("unknown"),
                        result.score,
                        &result.chunk.content,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
