use super::evaluation::BatchEvaluator;
use crate::config::Dispatch;
use crate::core_types::{Layout, ScoredLayout};
use crate::scorer::engine::score_layout;
use crate::scorer::{Bigram, ScoreTable, SlotMap};
use fnv::FnvHashSet;
use rayon::prelude::*;
use tracing::{debug, info};

/// Climbs from `seed` by two-letter swaps until no swap improves the score.
///
/// `seed.score` must be its score against `bigrams`; the unchanged layout is
/// the first neighbour, so a swap has to beat it strictly. Swaps are tried
/// over slot pairs `i < j` in order and the first improvement is taken before
/// the pass restarts. Pinned slots never move. Returns the local optimum and
/// the number of accepted steps.
pub fn refine_seed(
    seed: &ScoredLayout,
    bigrams: &[Bigram],
    table: &ScoreTable,
    pinned: &[bool],
    slots: &mut SlotMap,
) -> (ScoredLayout, usize) {
    let mut layout = seed.layout.clone();
    let mut score = seed.score;
    let mut steps = 0;
    let n = layout.len();
    let is_pinned = |i: usize| pinned.get(i).copied().unwrap_or(false);

    'climb: loop {
        for i in (0..n).filter(|&i| !is_pinned(i)) {
            for j in ((i + 1)..n).filter(|&j| !is_pinned(j)) {
                // Swapping two fillers yields the same layout.
                if layout[i] == layout[j] {
                    continue;
                }
                layout.swap(i, j);
                let candidate = score_layout(&layout, bigrams, table, slots);
                if candidate > score {
                    score = candidate;
                    steps += 1;
                    continue 'climb;
                }
                layout.swap(i, j);
            }
        }
        break;
    }

    (ScoredLayout::new(layout, score), steps)
}

/// Refines every seed and merges the results into the seed list.
///
/// Seeds are rescored against `bigrams` before climbing and enter the list
/// with that score, so every entry is on the same scale whatever the seeds
/// carried in. Callers pass the full bigram set of the layout letters. A
/// refined layout already in the list is not added again. The returned list
/// keeps the seeds in their original order followed by new layouts in seed
/// order; ranking is left to the caller.
pub fn greedy_optimize(
    seeds: Vec<ScoredLayout>,
    bigrams: &[Bigram],
    evaluator: &BatchEvaluator,
    pinned: &[bool],
) -> Vec<ScoredLayout> {
    info!("Greedy optimization over {} layouts", seeds.len());
    let table = evaluator.table();

    let climb = |slots: &mut SlotMap, seed: ScoredLayout| {
        let score = score_layout(&seed.layout, bigrams, table, slots);
        let start = ScoredLayout::new(seed.layout, score);
        let (refined, steps) = refine_seed(&start, bigrams, table, pinned, slots);
        (start, refined, steps)
    };

    let climbed: Vec<(ScoredLayout, ScoredLayout, usize)> =
        if evaluator.options().dispatch == Dispatch::Parallel && seeds.len() > 1 {
            evaluator.pool().install(|| {
                seeds
                    .into_par_iter()
                    .map_init(SlotMap::new, |slots, seed| climb(slots, seed))
                    .collect()
            })
        } else {
            let mut slots = SlotMap::new();
            seeds.into_iter().map(|seed| climb(&mut slots, seed)).collect()
        };

    let mut merged = Vec::with_capacity(climbed.len() * 2);
    let mut refined = Vec::new();
    let mut improved = 0;
    for (start, result, steps) in climbed {
        merged.push(start);
        if steps > 0 {
            improved += 1;
            refined.push(result);
        }
    }

    let mut known: FnvHashSet<Layout> = merged.iter().map(|s| s.layout.clone()).collect();
    for result in refined {
        if known.insert(result.layout.clone()) {
            merged.push(result);
        }
    }

    debug!(
        "Greedy: {} seeds improved, {} layouts after merge",
        improved,
        merged.len()
    );
    merged
}
