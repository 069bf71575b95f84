//! Context formatting for RAG prompts.
//!
//! Renders ranked search results into the text block handed to the
//! downstream chat model.

use crate::vector_index::RagSearchResult;

const CONTEXT_OPEN: &str = "--- Retrieved reference material ---";
const CONTEXT_CLOSE: &str = "--- End of reference material ---";
const CONTEXT_INSTRUCTION: &str = "Answer the user's question based on the material above. \
If the material does not cover the question, say so explicitly.";

/// Format search results as a prompt-ready context block.
///
/// Empty input yields an empty string; the caller then falls back to a
/// "no relevant context" system prompt instead.
pub fn format_context(results: &[RagSearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut context = String::new();
    context.push_str(CONTEXT_OPEN);
    context.push_str("\n\n");

    for (i, result) in results.iter().enumerate() {
        context.push_str(&format!(
            "[{}] (score: {:.3}, source: {})\n{}\n\n",
            i + 1,
            result.score,
            result.chunk.source,
            result.chunk.content
        ));
    }

    context.push_str(CONTEXT_CLOSE);
    context.push('\n');
    context.push_str(CONTEXT_INSTRUCTION);
    context
}
