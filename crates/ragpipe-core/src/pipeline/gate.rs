//! Confidence gate over the diversified candidate set

use crate::index::ScoredChunk;

/// Outcome of the confidence check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceDecision {
    /// Highest score observed in the diversified set
    pub max_score: f64,
    /// True when the evidence is too weak to answer directly
    pub low_confidence: bool,
}

/// Decide whether the diversified set is strong enough to answer from.
///
/// A set whose max score meets the threshold exactly is NOT low
/// confidence; the comparison is strictly less-than. Callers must handle
/// the empty set before the gate (it means nothing was found at all,
/// which is a different outcome from weak evidence).
pub fn check_confidence(candidates: &[ScoredChunk], threshold: f64) -> ConfidenceDecision {
    let max_score = candidates
        .iter()
        .map(|c| c.score)
        .fold(f64::NEG_INFINITY, f64::max);

    ConfidenceDecision {
        max_score,
        low_confidence: max_score < threshold,
    }
}
