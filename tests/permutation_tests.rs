use itertools::Itertools;
use layerforge::consts::FILL_SYMBOL;
use layerforge::layers::split_swap_zone;
use layerforge::optimizer::permutations::{
    extend_layouts, layer_permutations, swap_zone_combinations, LayerPair,
};
use rstest::rstest;
use std::collections::HashSet;

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

#[rstest]
#[case(b"a".as_slice())]
#[case(b"ab".as_slice())]
#[case(b"abcd".as_slice())]
#[case(b"abcdef".as_slice())]
fn full_layer_yields_k_factorial_orderings(#[case] letters: &[u8]) {
    let layouts = layer_permutations(letters, &[], letters.len());

    assert_eq!(layouts.len(), factorial(letters.len()));
    let distinct: HashSet<_> = layouts.iter().collect();
    assert_eq!(distinct.len(), layouts.len());

    let mut expected = letters.to_vec();
    expected.sort_unstable();
    for layout in &layouts {
        let mut sorted = layout.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, expected);
    }
}

#[rstest]
#[case(b"ab".as_slice(), 4, 12)]
#[case(b"abc".as_slice(), 4, 24)]
#[case(b"a".as_slice(), 5, 5)]
#[case(b"".as_slice(), 3, 1)]
fn underfull_layer_is_padded_and_deduplicated(
    #[case] letters: &[u8],
    #[case] capacity: usize,
    #[case] expected: usize,
) {
    let layouts = layer_permutations(letters, &[], capacity);

    assert_eq!(layouts.len(), expected);
    let distinct: HashSet<_> = layouts.iter().collect();
    assert_eq!(distinct.len(), layouts.len());
    for layout in &layouts {
        assert_eq!(layout.len(), capacity);
        let fills = layout.iter().filter(|&&c| c == FILL_SYMBOL).count();
        assert_eq!(fills, capacity - letters.len());
    }
}

#[test]
fn pinned_letter_stays_put() {
    let pins = [None, Some(b'a'), None];
    let layouts = layer_permutations(b"abc", &pins, 3);

    assert_eq!(layouts, vec![b"bac".to_vec(), b"cab".to_vec()]);
}

#[test]
fn pins_with_eight_slots() {
    let mut pins = vec![None; 8];
    pins[0] = Some(b'e');
    pins[5] = Some(b't');
    let layouts = layer_permutations(b"etaoinsr", &pins, 8);

    assert_eq!(layouts.len(), factorial(6));
    assert!(layouts.iter().all(|l| l[0] == b'e' && l[5] == b't'));
}

#[test]
fn overfull_layer_yields_nothing() {
    assert!(layer_permutations(b"abcde", &[], 4).is_empty());
    let pins = [Some(b'z'), None, None];
    assert!(layer_permutations(b"abc", &pins, 3).is_empty());
}

/// Enumerates every ordering of the swap zone and keeps the first one per
/// distinct layer-1 share.
fn brute_force_split(layer1: &[u8], layer2: &[u8], swap: &[u8]) -> Vec<LayerPair> {
    let (to_first, _) = split_swap_zone(swap.len());
    let fixed1: Vec<u8> = layer1.iter().copied().filter(|c| !swap.contains(c)).collect();
    let fixed2: Vec<u8> = layer2.iter().copied().filter(|c| !swap.contains(c)).collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for perm in swap.iter().copied().permutations(swap.len()) {
        let mut head = perm[..to_first].to_vec();
        head.sort_unstable();
        if !seen.insert(head.clone()) {
            continue;
        }
        let mut first = fixed1.clone();
        first.extend(head);
        let mut second = perm[to_first..].to_vec();
        second.extend(&fixed2);
        out.push(LayerPair { first, second });
    }
    out
}

#[rstest]
#[case(b"abcd".as_slice(), b"efgh".as_slice(), b"de".as_slice())]
#[case(b"abcd".as_slice(), b"efgh".as_slice(), b"cdef".as_slice())]
#[case(b"abcd".as_slice(), b"efgh".as_slice(), b"bcdefg".as_slice())]
#[case(b"abcd".as_slice(), b"efgh".as_slice(), b"dfe".as_slice())]
fn swap_zone_split_matches_brute_force(
    #[case] layer1: &[u8],
    #[case] layer2: &[u8],
    #[case] swap: &[u8],
) {
    let pairs = swap_zone_combinations(layer1, layer2, swap);
    assert_eq!(pairs, brute_force_split(layer1, layer2, swap));
}

#[test]
fn swap_zone_split_counts() {
    // C(4, 2) distinct layer-1 shares.
    let pairs = swap_zone_combinations(b"abcd", b"efgh", b"cdef");
    assert_eq!(pairs.len(), 6);
    assert!(pairs.iter().all(|p| p.first.len() == 4 && p.second.len() == 4));
    assert_eq!(pairs[0].first, b"abcd".to_vec());
    assert_eq!(pairs[0].second, b"efgh".to_vec());
}

#[test]
fn empty_swap_zone_keeps_layers() {
    let pairs = swap_zone_combinations(b"abcd", b"efgh", b"");
    assert_eq!(
        pairs,
        vec![LayerPair {
            first: b"abcd".to_vec(),
            second: b"efgh".to_vec(),
        }]
    );
}

#[test]
fn extension_keeps_prefix_order() {
    let prefixes = vec![b"ab".to_vec(), b"ba".to_vec()];
    let suffixes = vec![b"cd".to_vec(), b"dc".to_vec()];
    let combined = extend_layouts(&prefixes, &suffixes);
    assert_eq!(
        combined,
        vec![
            b"abcd".to_vec(),
            b"abdc".to_vec(),
            b"bacd".to_vec(),
            b"badc".to_vec(),
        ]
    );
}
