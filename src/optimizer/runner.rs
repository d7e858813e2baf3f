use super::evaluation::{extend_each, BatchEvaluator, EvaluationOptions, StageGroup};
use super::greedy::greedy_optimize;
use super::permutations::{layer_permutations, swap_zone_combinations};
use super::selection::retain_best;
use crate::codec::LetterCodec;
use crate::config::SearchParams;
use crate::core_types::ScoredLayout;
use crate::corpus::CorpusSet;
use crate::error::LfResult;
use crate::layers::EncodedLayers;
use crate::scorer::bigrams::trim_bigrams;
use crate::scorer::{Bigram, BigramCache, ScoreTable};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub layers: usize,
    pub letters_per_layer: usize,
    pub best_layouts: usize,
    pub greedy: bool,
}

impl From<&SearchParams> for SearchOptions {
    fn from(params: &SearchParams) -> Self {
        Self {
            layers: params.layers,
            letters_per_layer: params.letters_per_layer,
            best_layouts: params.best_layouts,
            greedy: params.greedy,
        }
    }
}

/// Summary of one finished stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// Number of layers the stage's layouts cover (1-4).
    pub stage: usize,
    /// Swap-zone cycle, for stages 1 and 2.
    pub cycle: Option<usize>,
    pub cycles: usize,
    /// Candidates scored so far in this run.
    pub evaluated: usize,
    pub kept: usize,
    pub best: Option<f64>,
}

/// Receives stage reports while a search runs.
pub trait ProgressCallback: Send + Sync {
    fn on_stage(&self, report: &StageReport);
}

impl ProgressCallback for () {
    fn on_stage(&self, _report: &StageReport) {}
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best layouts, ascending by score (best last).
    pub results: Vec<ScoredLayout>,
    pub cycles: usize,
    pub evaluated: usize,
}

/// Layer-by-layer beam search.
///
/// Each swap-zone cycle scores layer 1 on its own, keeps the best, and
/// extends them with every layer-2 ordering. The stage-2 results of all
/// cycles are then pooled and extended by layer 3 and layer 4 in turn.
/// A stage only scores the bigrams that touch its new layer; the rest is
/// already in the carried score.
pub struct LayoutSearch<'a> {
    corpora: &'a CorpusSet,
    codec: &'a LetterCodec,
    evaluator: BatchEvaluator,
    options: SearchOptions,
    cache: BigramCache,
    evaluated: usize,
}

impl<'a> LayoutSearch<'a> {
    pub fn new(
        corpora: &'a CorpusSet,
        codec: &'a LetterCodec,
        table: Arc<ScoreTable>,
        params: &SearchParams,
    ) -> LfResult<Self> {
        let evaluator = BatchEvaluator::new(table, EvaluationOptions::from(params))?;
        Ok(Self {
            corpora,
            codec,
            evaluator,
            options: SearchOptions::from(params),
            cache: BigramCache::new(),
            evaluated: 0,
        })
    }

    pub fn run<CB: ProgressCallback>(
        &mut self,
        layers: &EncodedLayers,
        pins: &[Option<u8>],
        callback: &CB,
    ) -> SearchOutcome {
        let start = Instant::now();
        let per_layer = self.options.letters_per_layer;
        let layer_count = self.options.layers;
        let keep = self.options.best_layouts;
        let top_k = self.evaluator.top_k();
        self.evaluated = 0;

        let mut pinned = vec![false; per_layer * layer_count];
        for (slot, pin) in pins.iter().enumerate().take(pinned.len()) {
            pinned[slot] = pin.is_some();
        }

        // 1. Layers 1 and 2, once per swap-zone split
        let pairs = swap_zone_combinations(&layers.layers[0], &layers.layers[1], &layers.swap_zone);
        let cycles = pairs.len();
        info!("{} swap-zone cycles for layers 1 and 2", cycles);

        let mut pooled: Vec<ScoredLayout> = Vec::new();
        for (cycle, pair) in pairs.iter().enumerate() {
            let first = layer_permutations(&pair.first, pins, per_layer);
            let stage1 = self.run_stage(vec![StageGroup::fresh(first)], &pair.first, None);
            callback.on_stage(&report(1, Some(cycle), cycles, &stage1, self.evaluated));

            if layer_count == 1 {
                pooled.extend(stage1);
                continue;
            }

            let best = retain_best(stage1, keep, top_k);
            let second = layer_permutations(&pair.second, &[], per_layer);
            let letters = [pair.first.as_slice(), pair.second.as_slice()].concat();
            let stage2 = self.run_stage(
                extend_each(&best, &second),
                &letters,
                Some(pair.second.as_slice()),
            );
            callback.on_stage(&report(2, Some(cycle), cycles, &stage2, self.evaluated));
            pooled.extend(stage2);
        }

        // 2. Remaining layers over the pooled results
        let mut letters = [layers.layers[0].as_slice(), layers.layers[1].as_slice()].concat();
        let mut current = pooled;
        for layer in 2..layer_count {
            let new_letters = &layers.layers[layer];
            letters.extend_from_slice(new_letters);

            let best = retain_best(current, keep, top_k);
            let perms = layer_permutations(new_letters, &[], per_layer);
            let mut stage = self.run_stage(
                extend_each(&best, &perms),
                &letters,
                Some(new_letters.as_slice()),
            );

            if self.options.greedy {
                let full = self.full_bigrams(&letters);
                stage = greedy_optimize(stage, &full, &self.evaluator, &pinned);
            }
            callback.on_stage(&report(layer + 1, None, cycles, &stage, self.evaluated));
            current = stage;
        }

        let mut results = retain_best(current, keep, top_k);
        if self.options.greedy && layer_count < 3 {
            let mut letters: Vec<u8> = layers.layers[..layer_count].concat();
            letters.extend_from_slice(&layers.swap_zone);
            let full = self.full_bigrams(&letters);
            let refined = greedy_optimize(results, &full, &self.evaluator, &pinned);
            results = retain_best(refined, keep, top_k);
        }

        info!(
            "Search finished: {} candidates scored in {:.2?}, {} bigram sets cached",
            self.evaluated,
            start.elapsed(),
            self.cache.len()
        );

        SearchOutcome {
            results,
            cycles,
            evaluated: self.evaluated,
        }
    }

    fn full_bigrams(&mut self, letters: &[u8]) -> Arc<[Bigram]> {
        self.cache.get_or_build(letters, self.corpora, self.codec)
    }

    /// Scores one stage. `letters` are all letters placed so far; `new_layer`
    /// is `None` for the first stage only. A later stage scores just the
    /// bigrams touching its layer, so an all-filler layer adds nothing.
    fn run_stage(
        &mut self,
        groups: Vec<StageGroup>,
        letters: &[u8],
        new_layer: Option<&[u8]>,
    ) -> Vec<ScoredLayout> {
        self.evaluated += groups.iter().map(StageGroup::len).sum::<usize>();
        let bigrams = self.full_bigrams(letters);
        match new_layer {
            None => self.evaluator.evaluate(groups, &bigrams),
            Some(layer) => {
                let trimmed = trim_bigrams(&bigrams, &[layer]);
                self.evaluator.evaluate(groups, &trimmed)
            }
        }
    }
}

fn report(
    stage: usize,
    cycle: Option<usize>,
    cycles: usize,
    scored: &[ScoredLayout],
    evaluated: usize,
) -> StageReport {
    StageReport {
        stage,
        cycle,
        cycles,
        evaluated,
        kept: scored.len(),
        best: scored.iter().map(|s| s.score).max_by(f64::total_cmp),
    }
}
