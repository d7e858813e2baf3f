use crate::consts::{
    DEFAULT_LETTERS_PER_LAYER, DEFAULT_LOCAL_KEEP, DEFAULT_MAX_WORKERS, FILL_SYMBOL, LAYER_COUNT,
};
use crate::error::{LayerForgeError, LfResult};
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub layers: LayerDefinitions,

    /// Weighted bigram corpus, repeatable.
    #[arg(long = "corpus", value_name = "NAME:WEIGHT:PATH")]
    pub corpora: Vec<CorpusConfig>,
}

/// How candidate groups are handed to workers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    #[default]
    Parallel,
    Sequential,
}

/// Where the layer letters come from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LayerSource {
    #[default]
    Auto,
    Manual,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = DEFAULT_LETTERS_PER_LAYER)]
    pub letters_per_layer: usize,
    /// Number of layers to search (1-4).
    #[arg(long, default_value_t = 4)]
    pub layers: usize,
    /// Candidates retained between stages.
    #[arg(long, default_value_t = 20)]
    pub best_layouts: usize,
    /// Candidates each worker keeps from its own group.
    #[arg(long, default_value_t = DEFAULT_LOCAL_KEEP)]
    pub local_keep: usize,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub greedy: bool,
    #[arg(long, default_value_t = Dispatch::Parallel)]
    pub dispatch: Dispatch,
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            letters_per_layer: DEFAULT_LETTERS_PER_LAYER,
            layers: 4,
            best_layouts: 20,
            local_keep: DEFAULT_LOCAL_KEEP,
            greedy: true,
            dispatch: Dispatch::Parallel,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl SearchParams {
    #[inline(always)]
    pub fn slot_count(&self) -> usize {
        self.letters_per_layer * self.layers
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefinitions {
    #[arg(long, default_value_t = LayerSource::Auto)]
    pub source: LayerSource,

    // === MANUAL ===
    #[arg(long, default_value = "")]
    pub layer1: String,
    #[arg(long, default_value = "")]
    pub layer2: String,
    #[arg(long, default_value = "")]
    pub layer3: String,
    #[arg(long, default_value = "")]
    pub layer4: String,
    /// Letters allowed to move between layer 1 and layer 2.
    #[arg(long, default_value = "")]
    pub swap_letters: String,

    // === AUTO ===
    /// Letters taken from each side of the layer 1/2 boundary.
    #[arg(long, default_value_t = 1)]
    pub swap_count: usize,
    /// Slots left empty, counted back from the end of layer 4.
    #[arg(long, default_value_t = 0)]
    pub empty_count: usize,
    /// Letters ignored when ranking by frequency.
    #[arg(long, default_value = "")]
    pub ignore: String,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub pin_most_common: bool,

    // === PINS ===
    /// Fixed layer-1 slots, e.g. "0:e,4:t".
    #[arg(long, default_value = "")]
    pub pinned: String,
}

impl Default for LayerDefinitions {
    fn default() -> Self {
        Self {
            source: LayerSource::Auto,
            layer1: String::new(),
            layer2: String::new(),
            layer3: String::new(),
            layer4: String::new(),
            swap_letters: String::new(),
            swap_count: 1,
            empty_count: 0,
            ignore: String::new(),
            pin_most_common: true,
            pinned: String::new(),
        }
    }
}

impl LayerDefinitions {
    /// Manual layer strings, case-folded letter by letter like corpus text.
    pub fn manual_layers(&self) -> [String; LAYER_COUNT] {
        [&self.layer1, &self.layer2, &self.layer3, &self.layer4]
            .map(|layer| layer.chars().map(fold_case).collect())
    }

    /// Parses `pinned` into `(slot, letter)` pairs.
    pub fn get_pins(&self) -> LfResult<Vec<(usize, char)>> {
        let mut pins = Vec::new();
        for part in self.pinned.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (slot, letter) = part.split_once(':').ok_or_else(|| {
                LayerForgeError::Config(format!("Pin '{}' is not in 'slot:letter' form", part))
            })?;
            let slot: usize = slot.trim().parse().map_err(|_| {
                LayerForgeError::Config(format!("Pin '{}' has an invalid slot index", part))
            })?;
            let mut chars = letter.trim().chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) => fold_case(c),
                _ => {
                    return Err(LayerForgeError::Config(format!(
                        "Pin '{}' must name exactly one letter",
                        part
                    )))
                }
            };
            pins.push((slot, letter));
        }
        Ok(pins)
    }
}

/// One weighted bigram corpus. Weights are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub name: String,
    pub weight: f64,
    pub path: String,
}

impl FromStr for CorpusConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (name, weight, path) = match (parts.next(), parts.next(), parts.next()) {
            (Some(n), Some(w), Some(p)) => (n.trim(), w.trim(), p.trim()),
            _ => return Err(format!("'{}' is not in NAME:WEIGHT:PATH form", s)),
        };
        let weight: f64 = weight
            .parse()
            .map_err(|_| format!("Invalid corpus weight '{}'", weight))?;
        Ok(Self {
            name: name.to_string(),
            weight,
            path: path.to_string(),
        })
    }
}

/// Lower-cases a letter when that maps to a single character.
pub fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrites fields that were given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.letters_per_layer);
        update_if_present!(search.layers);
        update_if_present!(search.best_layouts);
        update_if_present!(search.local_keep);
        update_if_present!(search.greedy);
        update_if_present!(search.dispatch);
        update_if_present!(search.max_workers);

        update_if_present!(layers.source);
        update_if_present!(layers.layer1);
        update_if_present!(layers.layer2);
        update_if_present!(layers.layer3);
        update_if_present!(layers.layer4);
        update_if_present!(layers.swap_letters);
        update_if_present!(layers.swap_count);
        update_if_present!(layers.empty_count);
        update_if_present!(layers.ignore);
        update_if_present!(layers.pin_most_common);
        update_if_present!(layers.pinned);

        if matches.value_source("corpora") == Some(ValueSource::CommandLine) {
            self.corpora = cli.corpora.clone();
        }
    }

    /// Rejects settings that would make the search meaningless. Runs before
    /// any corpus is read.
    pub fn validate(&self) -> LfResult<()> {
        let fail = |msg: String| Err(LayerForgeError::Config(msg));
        let per_layer = self.search.letters_per_layer;

        // --- Search ---
        if !(1..=LAYER_COUNT).contains(&self.search.layers) {
            return fail(format!("layers must be between 1 and {}", LAYER_COUNT));
        }
        if per_layer == 0 || per_layer * LAYER_COUNT >= 255 {
            return fail(format!(
                "letters_per_layer must be between 1 and {}",
                254 / LAYER_COUNT
            ));
        }
        if self.search.best_layouts == 0 || self.search.local_keep == 0 {
            return fail("best_layouts and local_keep must be at least 1".to_string());
        }
        if self.search.max_workers == 0 {
            return fail("max_workers must be at least 1".to_string());
        }

        // --- Layers ---
        match self.layers.source {
            LayerSource::Auto => {
                let swap = self.layers.swap_count;
                let empty = self.layers.empty_count;
                if swap > per_layer {
                    return fail(format!(
                        "swap_count must be between 0 and {} (inclusive)",
                        per_layer
                    ));
                }
                if empty > per_layer * 3 {
                    return fail(format!(
                        "empty_count must be between 0 and {} (inclusive)",
                        per_layer * 3
                    ));
                }
                if swap + empty > per_layer * 3 {
                    return fail(format!(
                        "swap_count cannot be greater than {} with empty_count = {}",
                        per_layer * 3 - empty,
                        empty
                    ));
                }
            }
            LayerSource::Manual => self.validate_manual_layers()?,
        }

        for (slot, _) in self.layers.get_pins()? {
            if slot >= per_layer {
                return fail(format!(
                    "Pinned slot {} is outside layer 1 (0..{})",
                    slot, per_layer
                ));
            }
        }

        // --- Corpora ---
        if self.corpora.is_empty() {
            return fail("No bigram corpus configured".to_string());
        }
        let mut weight_sum = 0.0;
        for corpus in &self.corpora {
            if !(0.0..=100.0).contains(&corpus.weight) {
                return fail(format!(
                    "Weight of corpus '{}' must be between 0 and 100",
                    corpus.name
                ));
            }
            if corpus.weight > 0.0 && !Path::new(&corpus.path).exists() {
                return fail(format!(
                    "The bigram path of corpus '{}' does not point to an existing file: {}",
                    corpus.name, corpus.path
                ));
            }
            weight_sum += corpus.weight;
        }
        if !self.corpora.iter().any(|c| c.weight > 0.0) {
            return fail("No corpus has a weight above 0".to_string());
        }
        if (weight_sum - 100.0).abs() > 1e-6 {
            return fail(format!(
                "Corpus weights add up to {}, not 100 (%)",
                weight_sum
            ));
        }

        Ok(())
    }

    fn validate_manual_layers(&self) -> LfResult<()> {
        let per_layer = self.search.letters_per_layer;
        let layers = self.layers.manual_layers();
        let fill = FILL_SYMBOL as char;

        for (i, layer) in layers.iter().enumerate() {
            if layer.chars().count() > per_layer {
                return Err(LayerForgeError::Config(format!(
                    "Layer {} holds {} letters but only has {} slots",
                    i + 1,
                    layer.chars().count(),
                    per_layer
                )));
            }
        }

        let all: String = layers.concat();
        let mut seen = std::collections::HashSet::new();
        for c in all.chars() {
            if c != fill && !seen.insert(c) {
                return Err(LayerForgeError::Config(format!(
                    "Duplicate letter found: '{}'. Check layer1, layer2, layer3 and layer4",
                    c
                )));
            }
        }

        let first_two = format!("{}{}", layers[0], layers[1]);
        for c in self.layers.swap_letters.chars().map(fold_case) {
            if !first_two.contains(c) {
                return Err(LayerForgeError::Config(format!(
                    "'{}' was defined in swap_letters, but is not part of layer 1 or 2",
                    c
                )));
            }
        }

        for (_, letter) in self.layers.get_pins()? {
            if !layers[0].contains(letter) {
                return Err(LayerForgeError::Config(format!(
                    "'{}' was pinned, but is not part of the first layer",
                    letter
                )));
            }
        }
        Ok(())
    }
}
