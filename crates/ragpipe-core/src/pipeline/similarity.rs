//! Cheap metadata-based similarity between candidates
//!
//! Used only to penalize near-duplicates during diversification, never
//! for ranking quality. True embedding-space similarity is deliberately
//! not computed here; replacing this with a cosine similarity over stored
//! vectors would leave the diversifier unchanged.

use crate::index::ScoredChunk;

/// Estimate similarity between two candidates in [0,1].
///
/// Same `(source, chunk)` is the identical passage; the same document
/// (by source or title) counts as half-similar; anything else carries a
/// small floor so unrelated documents still register as distinct.
pub fn metadata_similarity(a: &ScoredChunk, b: &ScoredChunk) -> f64 {
    if a.metadata.source == b.metadata.source && a.metadata.chunk == b.metadata.chunk {
        return 1.0;
    }
    if a.metadata.source == b.metadata.source || a.metadata.title == b.metadata.title {
        return 0.5;
    }
    0.1
}
