//! Top-k ranking of a probability vector against the tag catalog.
//!
//! Only a bounded prefix of the ranking is ever used, so selection runs over a
//! size-k min-heap (O(N log k)) instead of sorting all N scores.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{RankedTags, ScoredTag};

use super::catalog::TagCatalog;

/// One score and the catalog ordinal it belongs to.
///
/// Ordered so that "greater" means "ranks earlier": higher score first, and
/// the lower ordinal first among equal scores.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f32,
    ordinal: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.ordinal.cmp(&self.ordinal))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Indices and scores of the `k` best entries, best first.
///
/// Equal to the first `min(k, N)` elements of a stable descending sort.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(k.min(scores.len()));
    for (ordinal, &score) in scores.iter().enumerate() {
        let candidate = Candidate { score, ordinal };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(mut worst) = heap.peek_mut() {
            if candidate > worst.0 {
                *worst = Reverse(candidate);
            }
        }
    }

    // Ascending in `Reverse` is descending by rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| (c.ordinal, c.score))
        .collect()
}

/// Selects the highest-scoring catalog tags for one probability vector.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRanker {
    top_k: usize,
}

impl ScoreRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank `probabilities` (one per catalog ordinal) and keep the top k.
    ///
    /// Rejects vectors whose length disagrees with the catalog or that contain
    /// scores that are not probabilities in [0, 1].
    pub fn rank(&self, probabilities: &[f32], catalog: &TagCatalog) -> PipelineResult<RankedTags> {
        if probabilities.len() != catalog.len() {
            return Err(PipelineError::Inference {
                message: format!(
                    "model returned {} scores for a catalog of {} tags",
                    probabilities.len(),
                    catalog.len()
                ),
            });
        }
        if let Some(i) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(PipelineError::Inference {
                message: format!("non-finite score {} at ordinal {i}", probabilities[i]),
            });
        }
        if let Some(i) = probabilities.iter().position(|p| !(0.0..=1.0).contains(p)) {
            return Err(PipelineError::Inference {
                message: format!("score {} at ordinal {i} is outside [0, 1]", probabilities[i]),
            });
        }

        let tags = top_k(probabilities, self.top_k)
            .into_iter()
            .filter_map(|(ordinal, score)| {
                catalog
                    .display_name(ordinal)
                    .map(|name| ScoredTag::new(name, score))
            })
            .collect();

        Ok(RankedTags::from_sorted(tags))
    }
}

impl Default for ScoreRanker {
    fn default() -> Self {
        Self::new(250)
    }
}
