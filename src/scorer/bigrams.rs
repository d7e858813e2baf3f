use crate::codec::LetterCodec;
use crate::consts::FILL_SYMBOL;
use crate::corpus::{Corpus, CorpusSet};
use fnv::{FnvHashMap, FnvHashSet};
use std::sync::Arc;
use tracing::debug;

/// A weighted letter pair, stored as codec bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bigram {
    pub first: u8,
    pub second: u8,
    pub frequency: f64,
}

impl Bigram {
    #[inline(always)]
    pub fn touches(&self, group: &[u8]) -> bool {
        group.contains(&self.first) || group.contains(&self.second)
    }
}

/// Canonical key of a letter set: sorted, deduplicated, filler removed.
pub fn letter_set_key(letters: &[u8]) -> Vec<u8> {
    let mut key: Vec<u8> = letters
        .iter()
        .copied()
        .filter(|&c| c != FILL_SYMBOL)
        .collect();
    key.sort_unstable();
    key.dedup();
    key
}

/// Collects every bigram whose two letters are in `letters`, doubled letters
/// included.
///
/// Each corpus contributes `frequency / corpus_total * factor`, and the
/// contributions of all corpora are summed. Output order is the order in
/// which pairs first appear in the corpora.
pub fn collect_bigrams(
    letters: &[u8],
    corpora: &[(&Corpus, f64)],
    codec: &LetterCodec,
) -> Vec<Bigram> {
    let wanted: FnvHashSet<char> = letters
        .iter()
        .filter(|&&c| c != FILL_SYMBOL)
        .map(|&c| codec.decode(c))
        .collect();

    let mut order: Vec<[char; 2]> = Vec::new();
    let mut freqs: FnvHashMap<[char; 2], f64> = FnvHashMap::default();

    for &(corpus, factor) in corpora {
        for entry in &corpus.entries {
            let [a, b] = entry.pair;
            if !wanted.contains(&a) || !wanted.contains(&b) {
                continue;
            }
            let slot = freqs.entry(entry.pair).or_insert_with(|| {
                order.push(entry.pair);
                0.0
            });
            *slot += corpus.normalized(entry.frequency) * factor;
        }
    }

    order
        .into_iter()
        .filter_map(|pair| {
            Some(Bigram {
                first: codec.code_of(pair[0])?,
                second: codec.code_of(pair[1])?,
                frequency: freqs[&pair],
            })
        })
        .collect()
}

/// Keeps the bigrams that touch every one of `required` groups.
pub fn trim_bigrams(bigrams: &[Bigram], required: &[&[u8]]) -> Vec<Bigram> {
    bigrams
        .iter()
        .filter(|b| required.iter().all(|group| b.touches(group)))
        .copied()
        .collect()
}

/// Total frequency mass of a bigram collection.
pub fn total_frequency(bigrams: &[Bigram]) -> f64 {
    bigrams.iter().map(|b| b.frequency).sum()
}

/// Weighted bigrams per letter set, built on first request.
///
/// The cache is filled by the driver between stages. Workers only ever see
/// the `Arc` slices it hands out.
#[derive(Debug, Default)]
pub struct BigramCache {
    entries: FnvHashMap<Vec<u8>, Arc<[Bigram]>>,
}

impl BigramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        letters: &[u8],
        corpora: &CorpusSet,
        codec: &LetterCodec,
    ) -> Arc<[Bigram]> {
        let key = letter_set_key(letters);
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit);
        }

        let bigrams: Arc<[Bigram]> = collect_bigrams(&key, &corpora.weighted(), codec).into();
        debug!(
            "Bigram cache miss: {} letters -> {} bigrams",
            key.len(),
            bigrams.len()
        );
        self.entries.insert(key, Arc::clone(&bigrams));
        bigrams
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
