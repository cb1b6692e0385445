//! LLM-based relevance re-ranking

use crate::index::ScoredChunk;
use crate::llm::{ChatMessage, CompletionModel};

/// Re-rank candidates by an LLM-assigned relevance rating.
///
/// Small sets (at or below `skip_threshold`) are returned unchanged; the
/// extra call is not worth it. Otherwise one completion call rates every
/// candidate on an integer scale 0..=`max_rating`, returned as a
/// comma-separated list. The ratings are only used when exactly one
/// in-range rating came back per candidate; any other response, and any
/// call failure, falls back to the first `final_size` candidates in
/// their incoming order.
pub async fn rerank_candidates(
    model: &dyn CompletionModel,
    question: &str,
    candidates: Vec<ScoredChunk>,
    final_size: usize,
    skip_threshold: usize,
    max_rating: u32,
    excerpt_chars: usize,
) -> Vec<ScoredChunk> {
    if candidates.len() <= skip_threshold {
        return candidates;
    }

    let prompt = build_rerank_prompt(question, &candidates, max_rating, excerpt_chars);
    let messages = vec![ChatMessage::user(prompt)];

    let ratings = match model.complete(messages, 50, 0.1).await {
        Ok(response) => parse_ratings(&response, candidates.len(), max_rating),
        Err(e) => {
            tracing::warn!("Re-ranking call failed: {}", e);
            None
        }
    };

    match ratings {
        Some(ratings) => {
            let mut rated: Vec<(u32, ScoredChunk)> =
                ratings.into_iter().zip(candidates).collect();
            // Rating first, original score as tiebreaker
            rated.sort_by(|(ra, ca), (rb, cb)| {
                rb.cmp(ra).then_with(|| {
                    cb.score
                        .partial_cmp(&ca.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            });
            rated
                .into_iter()
                .map(|(_, c)| c)
                .take(final_size)
                .collect()
        }
        None => {
            tracing::debug!("Discarding ratings, keeping original order");
            candidates.into_iter().take(final_size).collect()
        }
    }
}

fn build_rerank_prompt(
    question: &str,
    candidates: &[ScoredChunk],
    max_rating: u32,
    excerpt_chars: usize,
) -> String {
    let snippets = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}...", i + 1, truncate(&c.metadata.text, excerpt_chars)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Rate each snippet's relevance to the question from 0-{} \
         (0=irrelevant, {}=highly relevant). Return only numbers separated by commas:\n\n\
         Question: {}\n\nSnippets:\n{}\n\nRatings:",
        max_rating, max_rating, question, snippets
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parse a comma-separated rating list; None unless every rating parses,
/// is in range, and the count matches the candidate count exactly.
fn parse_ratings(response: &str, expected: usize, max_rating: u32) -> Option<Vec<u32>> {
    let ratings: Vec<u32> = response
        .trim()
        .split(',')
        .map(|r| r.trim().parse::<u32>().ok().filter(|&r| r <= max_rating))
        .collect::<Option<Vec<u32>>>()?;

    if ratings.len() == expected {
        Some(ratings)
    } else {
        tracing::warn!(
            "Rating count mismatch: expected {}, got {}",
            expected,
            ratings.len()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagError, Result};
    use crate::index::ChunkMetadata;
    use async_trait::async_trait;

    struct CannedModel(Result<String>);

    #[async_trait]
    impl CompletionModel for CannedModel {
        async fn complete(&self, _: Vec<ChatMessage>, _: u32, _: f32) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(RagError::Llm("down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn chunk(source: &str, score: f64) -> ScoredChunk {
        ScoredChunk {
            score,
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk: 0,
                title: source.to_string(),
                section: None,
                text: format!("text of {}", source),
            },
        }
    }

    fn four_candidates() -> Vec<ScoredChunk> {
        vec![
            chunk("a", 0.9),
            chunk("b", 0.8),
            chunk("c", 0.7),
            chunk("d", 0.6),
        ]
    }

    #[tokio::test]
    async fn small_sets_skip_the_model_entirely() {
        let model = CannedModel(Err(RagError::Llm("must not be called".to_string())));
        let input = vec![chunk("a", 0.9), chunk("b", 0.3)];
        let out = rerank_candidates(&model, "q", input.clone(), 5, 3, 3, 200).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].metadata.source, "a");
    }

    #[tokio::test]
    async fn valid_ratings_reorder_candidates() {
        let model = CannedModel(Ok("0, 3, 1, 2".to_string()));
        let out = rerank_candidates(&model, "q", four_candidates(), 5, 3, 3, 200).await;
        let order: Vec<&str> = out.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "c", "a"]);
    }

    #[tokio::test]
    async fn ties_break_by_original_score() {
        let model = CannedModel(Ok("2, 2, 2, 2".to_string()));
        let out = rerank_candidates(&model, "q", four_candidates(), 5, 3, 3, 200).await;
        let order: Vec<&str> = out.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn count_mismatch_falls_back_to_original_order() {
        let model = CannedModel(Ok("3, 2, 1".to_string()));
        let out = rerank_candidates(&model, "q", four_candidates(), 5, 3, 3, 200).await;
        let order: Vec<&str> = out.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn out_of_range_rating_falls_back() {
        let model = CannedModel(Ok("3, 2, 7, 1".to_string()));
        let out = rerank_candidates(&model, "q", four_candidates(), 5, 3, 3, 200).await;
        assert_eq!(out[0].metadata.source, "a");
    }

    #[tokio::test]
    async fn garbage_response_falls_back() {
        let model = CannedModel(Ok("highly relevant!".to_string()));
        let out = rerank_candidates(&model, "q", four_candidates(), 5, 3, 3, 200).await;
        assert_eq!(out[0].metadata.source, "a");
    }

    #[tokio::test]
    async fn call_failure_falls_back_and_truncates() {
        let model = CannedModel(Err(RagError::Llm("down".to_string())));
        let out = rerank_candidates(&model, "q", four_candidates(), 3, 3, 3, 200).await;
        let order: Vec<&str> = out.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn rating_parser_accepts_whitespace() {
        assert_eq!(parse_ratings(" 1 ,2, 3 ", 3, 3), Some(vec![1, 2, 3]));
        assert_eq!(parse_ratings("1,2", 3, 3), None);
        assert_eq!(parse_ratings("1,2,9", 3, 3), None);
        assert_eq!(parse_ratings("", 1, 3), None);
    }
}
