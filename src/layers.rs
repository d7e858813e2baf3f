use crate::codec::LetterCodec;
use crate::config::{fold_case, LayerDefinitions, LayerSource};
use crate::consts::LAYER_COUNT;
use crate::corpus::LetterFrequencyModel;
use crate::error::{LayerForgeError, LfResult};
use fnv::FnvHashSet;
use tracing::{info, warn};

/// The letters assigned to each layer, plus the letters that may move
/// between layer 1 and layer 2.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerLetterSets {
    pub layers: [Vec<char>; LAYER_COUNT],
    pub swap_zone: Vec<char>,
}

impl LayerLetterSets {
    pub fn manual(defs: &LayerDefinitions) -> Self {
        let strings = defs.manual_layers();
        let layers = std::array::from_fn(|i| strings[i].chars().collect());
        Self {
            layers,
            swap_zone: defs.swap_letters.chars().map(fold_case).collect(),
        }
    }

    /// Slices the frequency ranking into layers of `per_layer` letters.
    ///
    /// `empty_count` shortens the pool from the tail, so empty slots land on
    /// the last layer first. The swap zone takes `swap_count` letters from
    /// each side of the layer 1/2 boundary.
    pub fn derive(
        model: &LetterFrequencyModel,
        per_layer: usize,
        empty_count: usize,
        swap_count: usize,
    ) -> Self {
        let ranked = model.ranked();
        let cutoff = (per_layer * LAYER_COUNT)
            .saturating_sub(empty_count)
            .min(ranked.len());

        let slice = |from: usize, to: usize| -> Vec<char> {
            let to = to.min(cutoff);
            if from >= to {
                Vec::new()
            } else {
                ranked[from..to].to_vec()
            }
        };

        let layers = std::array::from_fn(|i| slice(i * per_layer, (i + 1) * per_layer));
        let swap_from = per_layer.saturating_sub(swap_count);
        let swap_to = (per_layer + swap_count).min(ranked.len());
        let swap_zone = if swap_from < swap_to {
            ranked[swap_from..swap_to].to_vec()
        } else {
            Vec::new()
        };

        Self { layers, swap_zone }
    }

    pub fn resolve(
        defs: &LayerDefinitions,
        model: &LetterFrequencyModel,
        per_layer: usize,
    ) -> Self {
        match defs.source {
            LayerSource::Manual => Self::manual(defs),
            LayerSource::Auto => {
                Self::derive(model, per_layer, defs.empty_count, defs.swap_count)
            }
        }
    }

    pub fn all_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.layers
            .iter()
            .flatten()
            .chain(self.swap_zone.iter())
            .copied()
    }

    pub fn layer_string(&self, index: usize) -> String {
        self.layers[index].iter().collect()
    }

    pub fn encode(&self, codec: &mut LetterCodec) -> LfResult<EncodedLayers> {
        let mut layers: [Vec<u8>; LAYER_COUNT] = Default::default();
        for (i, layer) in self.layers.iter().enumerate() {
            layers[i] = layer
                .iter()
                .map(|&c| codec.encode_char(c))
                .collect::<LfResult<_>>()?;
        }
        let swap_zone = self
            .swap_zone
            .iter()
            .map(|&c| codec.encode_char(c))
            .collect::<LfResult<_>>()?;
        Ok(EncodedLayers { layers, swap_zone })
    }
}

/// Letter sets after passing through the codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedLayers {
    pub layers: [Vec<u8>; LAYER_COUNT],
    pub swap_zone: Vec<u8>,
}

/// Number of swap-zone letters that end up on layer 1 and layer 2.
/// The larger half goes to layer 1.
pub fn split_swap_zone(n: usize) -> (usize, usize) {
    let first = n.div_ceil(2);
    (first, n - first)
}

/// Layer-1 slots with a fixed letter. Index = slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pins {
    pub slots: Vec<Option<char>>,
}

impl Pins {
    pub fn none(per_layer: usize) -> Self {
        Self {
            slots: vec![None; per_layer],
        }
    }

    /// Builds the pin table for a run.
    ///
    /// In auto mode with `pin_most_common`, the top letter goes to slot 0 and
    /// explicit pins are ignored.
    pub fn resolve(
        defs: &LayerDefinitions,
        sets: &LayerLetterSets,
        per_layer: usize,
    ) -> LfResult<Self> {
        let mut pins = Self::none(per_layer);

        if defs.source == LayerSource::Auto && defs.pin_most_common {
            match sets.layers[0].first() {
                Some(&top) if sets.swap_zone.contains(&top) => {
                    warn!("'{}' is part of the swap zone and cannot be pinned", top);
                }
                Some(&top) if per_layer > 0 => {
                    info!("Pinning most common letter '{}' to slot 0", top);
                    pins.slots[0] = Some(top);
                }
                _ => {}
            }
            return Ok(pins);
        }

        let mut letters = FnvHashSet::default();
        for (slot, letter) in defs.get_pins()? {
            if slot >= per_layer {
                return Err(LayerForgeError::Config(format!(
                    "Pinned slot {} is outside layer 1 (0..{})",
                    slot, per_layer
                )));
            }
            if pins.slots[slot].is_some() {
                return Err(LayerForgeError::Config(format!(
                    "Slot {} is pinned more than once",
                    slot
                )));
            }
            if !letters.insert(letter) {
                return Err(LayerForgeError::Config(format!(
                    "'{}' is pinned more than once",
                    letter
                )));
            }
            if sets.swap_zone.contains(&letter) {
                return Err(LayerForgeError::Config(format!(
                    "'{}' is a swap letter and cannot be pinned",
                    letter
                )));
            }
            if !sets.layers[0].contains(&letter) {
                return Err(LayerForgeError::Config(format!(
                    "'{}' was pinned, but is not part of the first layer",
                    letter
                )));
            }
            pins.slots[slot] = Some(letter);
        }
        Ok(pins)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn encode(&self, codec: &mut LetterCodec) -> LfResult<Vec<Option<u8>>> {
        self.slots
            .iter()
            .map(|slot| slot.map(|c| codec.encode_char(c)).transpose())
            .collect()
    }
}
