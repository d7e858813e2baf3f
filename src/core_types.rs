use serde::{Deserialize, Serialize};

/// One letter code per slot, layers laid out back to back.
/// Slot `i` of layer `k` lives at index `k * letters_per_layer + i`.
pub type Layout = Vec<u8>;

/// A candidate layout with its cumulative score. Higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLayout {
    pub layout: Layout,
    pub score: f64,
}

impl ScoredLayout {
    pub fn new(layout: Layout, score: f64) -> Self {
        Self { layout, score }
    }
}
