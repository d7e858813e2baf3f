use crate::consts::FILL_SYMBOL;
use crate::core_types::Layout;
use crate::layers::split_swap_zone;
use fnv::FnvHashSet;
use itertools::Itertools;
use tracing::{debug, warn};

/// Every ordering of one layer.
///
/// `pins` holds one entry per slot (empty for layers without pins). Pinned
/// letters stay in their slot; the remaining letters are permuted across the
/// free slots. A layer with fewer letters than free slots is padded with the
/// filler symbol and the duplicate orderings that padding produces are
/// dropped. A layer with more letters than free slots yields nothing.
pub fn layer_permutations(letters: &[u8], pins: &[Option<u8>], capacity: usize) -> Vec<Layout> {
    let pinned: Vec<u8> = pins.iter().flatten().copied().collect();
    let free = capacity.saturating_sub(pinned.len());

    let mut movable: Vec<u8> = letters
        .iter()
        .copied()
        .filter(|c| !pinned.contains(c))
        .collect();

    if movable.len() > free {
        warn!(
            "Layer '{}' holds {} movable letters but only {} free slots",
            String::from_utf8_lossy(letters),
            movable.len(),
            free
        );
        return Vec::new();
    }

    movable.resize(free, FILL_SYMBOL);
    let padded = movable.contains(&FILL_SYMBOL);

    let mut seen = FnvHashSet::default();
    let layouts: Vec<Layout> = movable
        .iter()
        .copied()
        .permutations(free)
        .filter(|p| !padded || seen.insert(p.clone()))
        .map(|p| interleave(&p, pins, capacity))
        .collect();

    debug!(
        "{} permutations for {} slots ({} pinned)",
        layouts.len(),
        capacity,
        pinned.len()
    );
    layouts
}

fn interleave(movable: &[u8], pins: &[Option<u8>], capacity: usize) -> Layout {
    let mut rest = movable.iter();
    (0..capacity)
        .filter_map(|slot| match pins.get(slot).copied().flatten() {
            Some(fixed) => Some(fixed),
            None => rest.next().copied(),
        })
        .collect()
}

/// Letters of layer 1 and layer 2 for one swap-zone cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPair {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
}

/// Splits the swap zone between layer 1 and layer 2 in every distinct way.
///
/// Layer 1 keeps its fixed letters followed by its share of the swap zone in
/// sorted order; since the order of that share is permuted later anyway, only
/// its membership matters. Layer 2 takes the remaining swap letters first,
/// then its own fixed letters.
pub fn swap_zone_combinations(layer1: &[u8], layer2: &[u8], swap_zone: &[u8]) -> Vec<LayerPair> {
    if swap_zone.is_empty() {
        return vec![LayerPair {
            first: layer1.to_vec(),
            second: layer2.to_vec(),
        }];
    }

    let (to_first, _) = split_swap_zone(swap_zone.len());
    let fixed1: Vec<u8> = layer1
        .iter()
        .copied()
        .filter(|c| !swap_zone.contains(c))
        .collect();
    let fixed2: Vec<u8> = layer2
        .iter()
        .copied()
        .filter(|c| !swap_zone.contains(c))
        .collect();

    (0..swap_zone.len())
        .combinations(to_first)
        .map(|head| {
            let mut first = fixed1.clone();
            let mut share: Vec<u8> = head.iter().map(|&i| swap_zone[i]).collect();
            share.sort_unstable();
            first.extend(share);

            let mut second: Vec<u8> = (0..swap_zone.len())
                .filter(|i| !head.contains(i))
                .map(|i| swap_zone[i])
                .collect();
            second.extend(&fixed2);

            LayerPair { first, second }
        })
        .collect()
}

/// Every prefix followed by every suffix, prefixes outermost.
pub fn extend_layouts(prefixes: &[Layout], suffixes: &[Layout]) -> Vec<Layout> {
    prefixes
        .iter()
        .cartesian_product(suffixes.iter())
        .map(|(p, s)| {
            let mut layout = Vec::with_capacity(p.len() + s.len());
            layout.extend_from_slice(p);
            layout.extend_from_slice(s);
            layout
        })
        .collect()
}
