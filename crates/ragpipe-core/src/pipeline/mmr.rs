//! Maximal Marginal Relevance diversification

use crate::index::ScoredChunk;
use crate::pipeline::similarity::metadata_similarity;

/// Greedily select up to `target` candidates balancing relevance against
/// novelty relative to what is already selected.
///
/// `lambda` in [0,1] weights relevance; 1.0 degenerates to pure top-K by
/// score, 0.0 to pure diversity. Seeded with the highest-scoring
/// candidate; ties go to the first-encountered candidate. A pool no
/// larger than the target is returned whole.
pub fn mmr_diversify(pool: Vec<ScoredChunk>, target: usize, lambda: f64) -> Vec<ScoredChunk> {
    if target == 0 {
        return Vec::new();
    }
    if pool.len() <= target {
        return pool;
    }

    let mut remaining = pool;

    let seed_idx = index_of_max_score(&remaining);
    let mut selected = vec![remaining.remove(seed_idx)];

    while selected.len() < target && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (i, candidate) in remaining.iter().enumerate() {
            let relevance = candidate.score;

            let max_similarity = selected
                .iter()
                .map(|s| metadata_similarity(candidate, s))
                .fold(0.0, f64::max);

            let mmr = lambda * relevance + (1.0 - lambda) * (1.0 - max_similarity);

            if mmr > best_score {
                best_score = mmr;
                best_idx = i;
            }
        }

        selected.push(remaining.remove(best_idx));
    }

    selected
}

fn index_of_max_score(candidates: &[ScoredChunk]) -> usize {
    let mut best = 0;
    for (i, c) in candidates.iter().enumerate() {
        if c.score > candidates[best].score {
            best = i;
        }
    }
    best
}
