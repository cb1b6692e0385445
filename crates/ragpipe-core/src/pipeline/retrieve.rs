//! Multi-variant retrieval and candidate merging

use crate::index::{ScoredChunk, VectorIndex};
use crate::llm::Embedder;
use std::collections::HashMap;

/// Retrieve candidates for every query variant and merge into one
/// deduplicated pool.
///
/// Each variant is embedded and looked up independently; the calls run
/// concurrently and are joined before merging. A variant whose embedding
/// or lookup fails contributes nothing. The merged pool keeps the
/// highest-scoring match per `(source, chunk)` key and is returned sorted
/// by score descending.
pub async fn retrieve_candidates(
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    variants: &[String],
    top_k: usize,
) -> Vec<ScoredChunk> {
    let lookups = variants.iter().map(|variant| async move {
        let embedding = embedder.embed(variant).await?;
        index.query(&embedding, top_k, true).await
    });

    let per_variant = futures::future::join_all(lookups).await;

    let mut matches = Vec::new();
    for (variant, result) in variants.iter().zip(per_variant) {
        match result {
            Ok(found) => matches.extend(found),
            Err(e) => {
                tracing::warn!("Retrieval failed for variant '{}': {}", variant, e);
            }
        }
    }

    merge_candidates(matches)
}

/// Merge matches from all variants, keeping one candidate per dedup key.
///
/// An existing entry is replaced only by a strictly greater score, so
/// re-merging an identical match is a no-op.
pub fn merge_candidates(matches: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
    let mut pool: HashMap<(String, i64), ScoredChunk> = HashMap::new();

    for m in matches {
        let key = (m.metadata.source.clone(), m.metadata.chunk);
        let replace = match pool.get(&key) {
            Some(existing) => m.score > existing.score,
            None => true,
        };
        if replace {
            pool.insert(key, m);
        }
    }

    let mut merged: Vec<ScoredChunk> = pool.into_values().collect();
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagError, Result};
    use crate::index::ChunkMetadata;
    use crate::llm::Embedder;
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn chunk(source: &str, pos: i64, score: f64) -> ScoredChunk {
        ScoredChunk {
            score,
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk: pos,
                title: source.to_string(),
                section: None,
                text: format!("{} chunk {}", source, pos),
            },
        }
    }

    #[test]
    fn merge_is_idempotent_for_identical_matches() {
        let merged = merge_candidates(vec![chunk("a.md", 1, 0.7), chunk("a.md", 1, 0.7)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.7);
    }

    #[test]
    fn merge_keeps_highest_score_per_key() {
        let merged = merge_candidates(vec![chunk("a.md", 1, 0.4), chunk("a.md", 1, 0.9)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.9);

        // Order of arrival must not matter
        let merged = merge_candidates(vec![chunk("a.md", 1, 0.9), chunk("a.md", 1, 0.4)]);
        assert_eq!(merged[0].score, 0.9);
    }

    #[test]
    fn merge_sorts_pool_by_score_descending() {
        let merged = merge_candidates(vec![
            chunk("a.md", 1, 0.3),
            chunk("b.md", 1, 0.8),
            chunk("c.md", 1, 0.5),
        ]);
        let scores: Vec<f64> = merged.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.8, 0.5, 0.3]);
    }

    #[test]
    fn same_chunk_position_in_different_sources_is_distinct() {
        let merged = merge_candidates(vec![chunk("a.md", 1, 0.6), chunk("b.md", 1, 0.6)]);
        assert_eq!(merged.len(), 2);
    }

    proptest! {
        #[test]
        fn merged_pool_has_one_entry_per_key(
            scores in prop::collection::vec((0u8..4, 0i64..3, 0.0f64..1.0), 0..40)
        ) {
            let matches: Vec<ScoredChunk> = scores
                .iter()
                .map(|(src, pos, score)| chunk(&format!("doc{}", src), *pos, *score))
                .collect();

            let merged = merge_candidates(matches.clone());

            let mut keys: Vec<(String, i64)> = merged
                .iter()
                .map(|c| (c.metadata.source.clone(), c.metadata.chunk))
                .collect();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), merged.len());

            // Every kept entry carries the max score seen for its key
            for kept in &merged {
                let max = matches
                    .iter()
                    .filter(|m| m.dedup_key() == kept.dedup_key())
                    .map(|m| m.score)
                    .fold(f64::NEG_INFINITY, f64::max);
                prop_assert_eq!(kept.score, max);
            }
        }
    }

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("poison") {
                return Err(RagError::Llm("embedding failed".to_string()));
            }
            Ok(vec![0.1, 0.2, 0.3])
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct OneShotIndex;

    #[async_trait]
    impl VectorIndex for OneShotIndex {
        async fn query(&self, _: &[f32], _: usize, _: bool) -> Result<Vec<ScoredChunk>> {
            Ok(vec![chunk("a.md", 0, 0.8)])
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn query(&self, _: &[f32], _: usize, _: bool) -> Result<Vec<ScoredChunk>> {
            Err(RagError::Service("index down".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_variants_are_dropped_silently() {
        let variants = vec!["good".to_string(), "poison pill".to_string()];
        let pool = retrieve_candidates(&FixedEmbedder, &OneShotIndex, &variants, 6).await;
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn all_variants_failing_yields_empty_pool() {
        let variants = vec!["one".to_string(), "two".to_string()];
        let pool = retrieve_candidates(&FixedEmbedder, &FailingIndex, &variants, 6).await;
        assert!(pool.is_empty());
    }
}
