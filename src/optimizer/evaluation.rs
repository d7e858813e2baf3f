use super::selection::{select_best, TopK};
use crate::config::{Dispatch, SearchParams};
use crate::consts::{DEFAULT_LETTERS_PER_LAYER, DEFAULT_LOCAL_KEEP, DEFAULT_MAX_WORKERS};
use crate::core_types::{Layout, ScoredLayout};
use crate::error::{LayerForgeError, LfResult};
use crate::scorer::engine::score_layout;
use crate::scorer::{Bigram, ScoreTable, SlotMap};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Candidates that all extend the same retained layout, together with the
/// score that layout already earned.
#[derive(Debug, Clone, PartialEq)]
pub struct StageGroup {
    pub carried: f64,
    pub candidates: Vec<Layout>,
}

impl StageGroup {
    pub fn fresh(candidates: Vec<Layout>) -> Self {
        Self {
            carried: 0.0,
            candidates,
        }
    }

    /// Appends every suffix to `base`, carrying its score.
    pub fn extending(base: &ScoredLayout, suffixes: &[Layout]) -> Self {
        let candidates = suffixes
            .iter()
            .map(|s| {
                let mut layout = Vec::with_capacity(base.layout.len() + s.len());
                layout.extend_from_slice(&base.layout);
                layout.extend_from_slice(s);
                layout
            })
            .collect();
        Self {
            carried: base.score,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// One group per retained layout, in retained order.
pub fn extend_each(retained: &[ScoredLayout], suffixes: &[Layout]) -> Vec<StageGroup> {
    retained
        .iter()
        .map(|base| StageGroup::extending(base, suffixes))
        .collect()
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct EvaluationOptions {
    #[builder(default = DEFAULT_LOCAL_KEEP)]
    pub local_keep: usize,
    #[builder(default)]
    pub dispatch: Dispatch,
    #[builder(default = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,
    /// Batch size under which the mean filter is skipped.
    #[builder(default = DEFAULT_LETTERS_PER_LAYER * 2)]
    pub filter_floor: usize,
}

impl From<&SearchParams> for EvaluationOptions {
    fn from(params: &SearchParams) -> Self {
        Self {
            local_keep: params.local_keep,
            dispatch: params.dispatch,
            max_workers: params.max_workers,
            filter_floor: params.letters_per_layer * 2,
        }
    }
}

/// Scores stage groups and reduces each to its local best set.
pub struct BatchEvaluator {
    table: Arc<ScoreTable>,
    options: EvaluationOptions,
    pool: ThreadPool,
}

impl BatchEvaluator {
    pub fn new(table: Arc<ScoreTable>, options: EvaluationOptions) -> LfResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_workers.max(1))
            .thread_name(|i| format!("layerforge-worker-{}", i))
            .build()
            .map_err(|e| LayerForgeError::ThreadPool(e.to_string()))?;

        debug!("Worker pool ready with {} threads", options.max_workers);
        Ok(Self {
            table,
            options,
            pool,
        })
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    pub fn top_k(&self) -> TopK {
        TopK::MeanFilter {
            floor: self.options.filter_floor,
        }
    }

    /// Scores every group and concatenates the per-group best sets in group
    /// order. Nothing is reduced across groups here.
    ///
    /// More than one group under `Dispatch::Parallel` is spread over the
    /// worker pool, at most `max_workers` groups per wave.
    pub fn evaluate(&self, groups: Vec<StageGroup>, bigrams: &[Bigram]) -> Vec<ScoredLayout> {
        let total: usize = groups.iter().map(StageGroup::len).sum();
        info!(
            "Scoring {} candidates in {} groups against {} bigrams",
            total,
            groups.len(),
            bigrams.len()
        );

        if groups.len() <= 1 || self.options.dispatch == Dispatch::Sequential {
            return groups
                .into_iter()
                .flat_map(|g| self.score_group(g, bigrams))
                .collect();
        }

        let mut results = Vec::new();
        let mut pending = groups.into_iter();
        let mut wave = 0;
        loop {
            let batch: Vec<StageGroup> = pending.by_ref().take(self.options.max_workers).collect();
            if batch.is_empty() {
                break;
            }
            wave += 1;
            debug!("Wave {}: {} groups", wave, batch.len());

            let scored: Vec<Vec<ScoredLayout>> = self.pool.install(|| {
                batch
                    .into_par_iter()
                    .map(|g| self.score_group(g, bigrams))
                    .collect()
            });
            results.extend(scored.into_iter().flatten());
        }
        results
    }

    fn score_group(&self, group: StageGroup, bigrams: &[Bigram]) -> Vec<ScoredLayout> {
        let mut slots = SlotMap::new();
        let scores: Vec<f64> = group
            .candidates
            .iter()
            .map(|layout| group.carried + score_layout(layout, bigrams, &self.table, &mut slots))
            .collect();
        select_best(group.candidates, &scores, self.options.local_keep, self.top_k())
    }
}
