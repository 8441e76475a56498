//! Rank fusion and selection.
//!
//! The vector index casts a wide net; the reranker decides within it. The
//! fused score weights the reranker probability above the raw similarity:
//!
//! `score = 0.3 * bi_score + 0.7 * ce_prob`
//!
//! Candidates are sorted by fused score with a stable sort, so equal scores
//! keep their shortlist order, then truncated to `top_m`.

use hirematch_core::{Error, Result};

/// Weight of the vector similarity in the fused score.
pub const BI_ENCODER_WEIGHT: f32 = 0.3;

/// Weight of the reranker probability in the fused score.
pub const RERANKER_WEIGHT: f32 = 0.7;

/// Characters kept in a preview before the ellipsis.
pub const PREVIEW_CHARS: usize = 220;

/// Marker appended to truncated previews.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Fused ranking score.
pub fn fused_score(bi_score: f32, ce_prob: f32) -> f32 {
    BI_ENCODER_WEIGHT * bi_score + RERANKER_WEIGHT * ce_prob
}

/// First [`PREVIEW_CHARS`] characters of `text`, plus [`PREVIEW_ELLIPSIS`]
/// when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{PREVIEW_ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// A shortlisted item with both scores and the fused score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    /// The candidate.
    pub item: T,
    /// Vector similarity.
    pub bi_score: f32,
    /// Reranker probability.
    pub ce_prob: f32,
    /// Fused score.
    pub score: f32,
}

/// Fuse shortlist similarities with reranker probabilities, rank, and keep
/// the best `top_m`.
///
/// `shortlist` is `(item, bi_score)` in index order; `ce_probs[i]` belongs
/// to `shortlist[i]`.
pub fn fuse_and_select<T>(
    shortlist: Vec<(T, f32)>,
    ce_probs: &[f32],
    top_m: usize,
) -> Result<Vec<Scored<T>>> {
    if shortlist.len() != ce_probs.len() {
        return Err(Error::operation(format!(
            "Reranker returned {} scores for {} candidates",
            ce_probs.len(),
            shortlist.len()
        )));
    }

    let mut scored: Vec<Scored<T>> = shortlist
        .into_iter()
        .zip(ce_probs)
        .map(|((item, bi_score), &ce_prob)| Scored {
            item,
            bi_score,
            ce_prob,
            score: fused_score(bi_score, ce_prob),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_m);
    Ok(scored)
}

// ============================================================================
// Tests
// ============================================================================
