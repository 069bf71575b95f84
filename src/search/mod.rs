//! Brute-force cosine-similarity ranking over the vector index.
//!
//! Index sizes are tens to low hundreds of chunks, so an O(n * d) linear
//! scan per query is deliberate; no ANN structure is warranted.

use crate::error::{HenteError, Result};
use crate::vector_index::{RagSearchResult, VectorIndex};

/// Compute cosine similarity between two vectors.
///
/// Vectors of different dimensionality are an error: it means the index was
/// built with a different embedding model than the one now in use.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(HenteError::DimensionMismatch {
            query: a.len(),
            index: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}

/// Rank every stored embedding against the query vector.
///
/// Results are sorted by descending score (stable, so ties keep index
/// order), truncated to `top_k`, then filtered to scores >= `threshold`.
pub fn rank(
    query: &[f32],
    index: &VectorIndex,
    top_k: usize,
    threshold: f32,
) -> Result<Vec<RagSearchResult>> {
    let mut results = Vec::with_capacity(index.len());
    for (chunk, embedding) in index.chunks.iter().zip(index.embeddings.iter()) {
        let score = cosine_similarity(query, embedding)?;
        results.push(RagSearchResult {
            chunk: chunk.clone(),
            score,
        });
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);
    results.retain(|r| r.score >= threshold);

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::split_into_sections;

    fn index_with_embeddings(embeddings: Vec<Vec<f32>>) -> VectorIndex {
        let text: String = (0..embeddings.len())
            .map(|i| format!("# Section {}\nbody {}\n", i, i))
            .collect();
        let chunks = split_into_sections(&text, "kb.md");
        VectorIndex::new(chunks, embeddings).unwrap()
    }

    #[test]
    fn cosine_basics() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);

        let orthogonal = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &orthogonal).unwrap().abs() < 1e-6);

        let opposite = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &opposite).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_symmetric_and_bounded() {
        let a = vec![0.3, -0.7, 2.0];
        let b = vec![1.1, 0.4, -0.2];
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-6);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&zero, &b).unwrap(), 0.0);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            HenteError::DimensionMismatch { query: 2, index: 3 }
        ));
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let index = index_with_embeddings(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.7, 0.7],
        ]);

        let results = rank(&[1.0, 0.0], &index, 2, 0.0).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].chunk.id, "kb.md-1");
    }

    #[test]
    fn rank_applies_threshold_after_top_k() {
        let index = index_with_embeddings(vec![vec![0.1, 0.99], vec![0.0, -1.0]]);

        // Best match scores ~0.1 against the query; a 0.3 threshold drops it.
        let results = rank(&[1.0, 0.0], &index, 5, 0.3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn rank_never_returns_below_threshold() {
        let index = index_with_embeddings(vec![
            vec![1.0, 0.0],
            vec![0.5, 0.5],
            vec![0.0, 1.0],
        ]);

        let results = rank(&[1.0, 0.0], &index, 3, 0.5).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.score >= 0.5));
    }

    #[test]
    fn ties_preserve_index_order() {
        let index = index_with_embeddings(vec![vec![1.0, 0.0], vec![1.0, 0.0]]);

        let results = rank(&[1.0, 0.0], &index, 2, 0.0).unwrap();
        assert_eq!(results[0].chunk.id, "kb.md-0");
        assert_eq!(results[1].chunk.id, "kb.md-1");
    }
}
