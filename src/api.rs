use crate::codec::LetterCodec;
use crate::config::{fold_case, Config};
use crate::core_types::ScoredLayout;
use crate::corpus::{CorpusSet, LetterFrequencyModel};
use crate::error::LfResult;
use crate::layers::{EncodedLayers, LayerLetterSets, Pins};
use crate::optimizer::{LayoutSearch, ProgressCallback, SearchOutcome};
use crate::scorer::bigrams::{collect_bigrams, total_frequency};
use crate::scorer::engine::score_layout;
use crate::scorer::{ScoreTable, SlotMap};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Score of a layout against a single corpus at full weight.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CorpusScore {
    pub name: String,
    pub weight: f64,
    pub score: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayoutReport {
    pub layout: String,
    pub score: f64,
    pub per_corpus: Vec<CorpusScore>,
    /// Share of the weighted bigram mass made of the layout's letters.
    pub writable_mass: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct SearchSummary {
    pub layers: Vec<String>,
    pub swap_zone: String,
    pub pins: Vec<(usize, char)>,
    pub cycles: usize,
    pub evaluated: usize,
    /// Best first.
    pub layouts: Vec<LayoutReport>,
}

/// A validated configuration with its corpora loaded and its letters
/// resolved and encoded.
pub struct PreparedSearch {
    pub config: Config,
    pub corpora: CorpusSet,
    pub model: LetterFrequencyModel,
    pub letters: LayerLetterSets,
    pub pins: Pins,
    pub codec: LetterCodec,
    pub encoded: EncodedLayers,
    pub encoded_pins: Vec<Option<u8>>,
    pub table: Arc<ScoreTable>,
}

/// Service: validate the config, load corpora and fix the letter layout.
pub fn prepare(config: Config, table: ScoreTable) -> LfResult<PreparedSearch> {
    config.validate()?;
    let per_layer = config.search.letters_per_layer;
    table.ensure_covers(config.search.slot_count())?;

    let corpora = CorpusSet::load(&config.corpora)?;
    let model = LetterFrequencyModel::build(&corpora, &config.layers.ignore)?;
    let letters = LayerLetterSets::resolve(&config.layers, &model, per_layer);
    let pins = Pins::resolve(&config.layers, &letters, per_layer)?;

    let mut codec = LetterCodec::new(corpora.letters().into_iter().chain(letters.all_letters()));
    let encoded = letters.encode(&mut codec)?;
    let encoded_pins = pins.encode(&mut codec)?;

    for i in 0..letters.layers.len() {
        info!("Layer {} letters: {}", i + 1, letters.layer_string(i));
    }
    info!(
        "Swap letters: {}, {} surrogate letters",
        letters.swap_zone.iter().collect::<String>(),
        codec.substitutions()
    );
    if !pins.is_empty() {
        info!("{} pinned letters", pins.count());
    }

    Ok(PreparedSearch {
        config,
        corpora,
        model,
        letters,
        pins,
        codec,
        encoded,
        encoded_pins,
        table: Arc::new(table),
    })
}

impl PreparedSearch {
    /// Service: run the layer search.
    pub fn run<CB: ProgressCallback>(&self, callback: &CB) -> LfResult<SearchOutcome> {
        let mut search = LayoutSearch::new(
            &self.corpora,
            &self.codec,
            Arc::clone(&self.table),
            &self.config.search,
        )?;
        Ok(search.run(&self.encoded, &self.encoded_pins, callback))
    }

    pub fn decode(&self, layout: &[u8]) -> String {
        self.codec.decode_all(layout)
    }

    /// Per-corpus breakdown of an already scored layout.
    pub fn describe(&self, scored: &ScoredLayout) -> LayoutReport {
        let mut slots = SlotMap::new();
        let weighted = collect_bigrams(&scored.layout, &self.corpora.weighted(), &self.codec);

        let per_corpus = (0..self.corpora.corpora.len())
            .map(|i| {
                let bigrams =
                    collect_bigrams(&scored.layout, &self.corpora.full_weight(i), &self.codec);
                let corpus = &self.corpora.corpora[i];
                CorpusScore {
                    name: corpus.name.clone(),
                    weight: corpus.weight,
                    score: score_layout(&scored.layout, &bigrams, &self.table, &mut slots),
                }
            })
            .collect();

        LayoutReport {
            layout: self.decode(&scored.layout),
            score: scored.score,
            per_corpus,
            writable_mass: total_frequency(&weighted),
        }
    }

    /// Service: score user-supplied layouts against the full bigram set of
    /// their letters. Layouts are cut to the configured slot count.
    pub fn score_layouts(&mut self, layouts: &[String]) -> LfResult<Vec<LayoutReport>> {
        let slot_count = self.config.search.slot_count();
        let mut slots = SlotMap::new();
        let mut reports = Vec::with_capacity(layouts.len());

        for text in layouts {
            let codes = text
                .chars()
                .take(slot_count)
                .map(|c| self.codec.encode_char(fold_case(c)))
                .collect::<LfResult<Vec<u8>>>()?;

            let bigrams = collect_bigrams(&codes, &self.corpora.weighted(), &self.codec);
            let score = score_layout(&codes, &bigrams, &self.table, &mut slots);
            reports.push(self.describe(&ScoredLayout::new(codes, score)));
        }
        Ok(reports)
    }

    pub fn summarize(&self, outcome: &SearchOutcome) -> SearchSummary {
        SearchSummary {
            layers: (0..self.letters.layers.len())
                .map(|i| self.letters.layer_string(i))
                .collect(),
            swap_zone: self.letters.swap_zone.iter().collect(),
            pins: self
                .pins
                .slots
                .iter()
                .enumerate()
                .filter_map(|(slot, pin)| pin.map(|c| (slot, c)))
                .collect(),
            cycles: outcome.cycles,
            evaluated: outcome.evaluated,
            layouts: outcome.results.iter().rev().map(|s| self.describe(s)).collect(),
        }
    }
}
