use crate::core_types::{Layout, ScoredLayout};
use std::cmp::Ordering;

/// Strategy for picking the best `n` scores out of a batch.
///
/// Both strategies return the same indices. `MeanFilter` first discards
/// everything below the running mean, as long as a round still leaves at
/// least `n` entries and the batch is above `3 * n` and `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopK {
    FullSort,
    MeanFilter { floor: usize },
}

impl TopK {
    /// Indices of the best `min(n, len)` scores, ascending by score; the best
    /// is last. Equal scores rank by index, later index higher.
    pub fn select(&self, scores: &[f64], n: usize) -> Vec<usize> {
        let n = n.min(scores.len());
        let mut indices: Vec<usize> = (0..scores.len()).collect();

        if let TopK::MeanFilter { floor } = *self {
            while indices.len() > n * 3 && indices.len() > floor {
                let mean = indices.iter().map(|&i| scores[i]).sum::<f64>() / indices.len() as f64;
                let kept: Vec<usize> = indices
                    .iter()
                    .copied()
                    .filter(|&i| scores[i] >= mean)
                    .collect();
                if kept.len() == indices.len() || kept.len() < n {
                    break;
                }
                indices = kept;
            }
        }

        indices.sort_by(|&a, &b| rank(scores, a, b));
        indices.split_off(indices.len() - n)
    }
}

#[inline]
fn rank(scores: &[f64], a: usize, b: usize) -> Ordering {
    scores[a].total_cmp(&scores[b]).then(a.cmp(&b))
}

/// Best `n` of `layouts`, ascending by score.
pub fn select_best(
    mut layouts: Vec<Layout>,
    scores: &[f64],
    n: usize,
    strategy: TopK,
) -> Vec<ScoredLayout> {
    debug_assert_eq!(layouts.len(), scores.len());
    strategy
        .select(scores, n)
        .into_iter()
        .map(|i| ScoredLayout::new(std::mem::take(&mut layouts[i]), scores[i]))
        .collect()
}

/// Re-ranks already scored layouts and keeps the best `n`.
pub fn retain_best(scored: Vec<ScoredLayout>, n: usize, strategy: TopK) -> Vec<ScoredLayout> {
    let scores: Vec<f64> = scored.iter().map(|s| s.score).collect();
    let layouts: Vec<Layout> = scored.into_iter().map(|s| s.layout).collect();
    select_best(layouts, &scores, n, strategy)
}
