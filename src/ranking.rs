//! Cosine scoring against the persona query.
//!
//! Sections use `1 - cos` (ascending, lower is better), passages use plain `cos`
//! (descending). A vector with no direction scores as badly as possible.

use std::cmp::Ordering;

/// Similarity given to vectors that cannot be compared.
pub const WORST_SIMILARITY: f64 = -1.0;

/// `None` when either vector has zero norm, dimensions differ, or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    sim.is_finite().then(|| sim.clamp(-1.0, 1.0))
}

/// Section importance in `[0, 2]`; lower means closer to the query.
pub fn importance_rank(section: &[f32], query: &[f32]) -> f64 {
    1.0 - relevance(section, query)
}

/// Passage relevance in `[-1, 1]`; higher means closer to the query.
pub fn relevance(passage: &[f32], query: &[f32]) -> f64 {
    cosine_similarity(passage, query).unwrap_or(WORST_SIMILARITY)
}

/// Ascending order for ranks, descending for relevance scores.
pub fn by_rank(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

pub fn by_relevance(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
