use crate::config::{fold_case, CorpusConfig};
use crate::error::{LayerForgeError, LfResult};
use fnv::{FnvHashMap, FnvHashSet};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

/// One line of a bigram corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusEntry {
    pub pair: [char; 2],
    pub frequency: f64,
}

/// A bigram corpus as read from disk, with its configured weight.
///
/// Raw frequencies are kept; `normalized` divides by the corpus total so each
/// corpus contributes a probability distribution regardless of scale.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub name: String,
    pub weight: f64,
    pub entries: Vec<CorpusEntry>,
    pub total: f64,
}

impl Corpus {
    pub fn from_reader<R: Read>(name: &str, weight: f64, reader: R) -> LfResult<Self> {
        let entries = parse_corpus(reader)?;
        let total: f64 = entries.iter().map(|e| e.frequency).sum();
        if total <= 0.0 {
            return Err(LayerForgeError::Validation(format!(
                "Corpus '{}' has no frequency mass",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            weight,
            entries,
            total,
        })
    }

    pub fn load(config: &CorpusConfig) -> LfResult<Self> {
        info!("Loading corpus '{}' from {}", config.name, config.path);
        let file = File::open(&config.path)?;
        Self::from_reader(&config.name, config.weight, file)
    }

    #[inline(always)]
    pub fn normalized(&self, frequency: f64) -> f64 {
        frequency / self.total
    }

    /// Per-letter frequency of this corpus: every bigram gives half its mass
    /// to each of its letters. Ignored letters receive nothing. The result is
    /// normalized to sum to 1.
    pub fn monograms(&self, ignore: &FnvHashSet<char>) -> Vec<(char, f64)> {
        let mut order = Vec::new();
        let mut freqs: FnvHashMap<char, f64> = FnvHashMap::default();

        for entry in &self.entries {
            for &letter in &entry.pair {
                if ignore.contains(&letter) {
                    continue;
                }
                let slot = freqs.entry(letter).or_insert_with(|| {
                    order.push(letter);
                    0.0
                });
                *slot += entry.frequency / 2.0;
            }
        }

        let sum: f64 = freqs.values().sum();
        order
            .into_iter()
            .map(|letter| {
                let f = freqs[&letter];
                (letter, if sum > 0.0 { f / sum } else { 0.0 })
            })
            .collect()
    }
}

/// Reads `"<letter><letter> <frequency>"` lines. Letters are lower-cased.
/// Rows that do not hold a bigram and a number are skipped.
pub fn parse_corpus<R: Read>(reader: R) -> LfResult<Vec<CorpusEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut skipped = 0;

    for (row, result) in rdr.records().enumerate() {
        let rec = result?;
        let mut fields = rec.iter().filter(|f| !f.is_empty());
        let (pair, value) = match (fields.next(), fields.next_back()) {
            (Some(p), Some(v)) => (p, v),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let mut chars = pair.chars().map(fold_case);
        let pair = match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => [a, b],
            _ => {
                skipped += 1;
                continue;
            }
        };

        let frequency: f64 = match value.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(LayerForgeError::Validation(format!(
                "Row {}: frequency of '{}{}' must be a non-negative number",
                row + 1,
                pair[0],
                pair[1]
            )));
        }

        entries.push(CorpusEntry { pair, frequency });
    }

    if skipped > 0 {
        warn!("Skipped {} malformed corpus rows", skipped);
    }
    Ok(entries)
}

/// All corpora taking part in a run. Zero-weight corpora are dropped on load.
#[derive(Debug, Clone, Default)]
pub struct CorpusSet {
    pub corpora: Vec<Corpus>,
}

impl CorpusSet {
    pub fn new(corpora: Vec<Corpus>) -> Self {
        Self {
            corpora: corpora.into_iter().filter(|c| c.weight > 0.0).collect(),
        }
    }

    pub fn load(configs: &[CorpusConfig]) -> LfResult<Self> {
        let corpora = configs
            .iter()
            .filter(|c| c.weight > 0.0)
            .map(Corpus::load)
            .collect::<LfResult<Vec<_>>>()?;
        if corpora.is_empty() {
            return Err(LayerForgeError::Config(
                "No corpus has a weight above 0".to_string(),
            ));
        }
        Ok(Self { corpora })
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }

    /// Every distinct letter across all corpora, in first-seen order.
    pub fn letters(&self) -> Vec<char> {
        let mut seen = FnvHashSet::default();
        self.corpora
            .iter()
            .flat_map(|c| c.entries.iter())
            .flat_map(|e| e.pair)
            .filter(|l| seen.insert(*l))
            .collect()
    }

    /// Corpora paired with the weight factor used for bigram mass
    /// (configured percentage / 100).
    pub fn weighted(&self) -> Vec<(&Corpus, f64)> {
        self.corpora.iter().map(|c| (c, c.weight / 100.0)).collect()
    }

    /// One corpus at full weight, as used for per-corpus breakdowns.
    pub fn full_weight(&self, index: usize) -> Vec<(&Corpus, f64)> {
        self.corpora.get(index).map(|c| (c, 1.0)).into_iter().collect()
    }
}

/// Combined per-letter frequency across corpora.
///
/// Each corpus's monograms are normalized on their own and then summed with
/// the configured percentage as factor. The sum is not renormalized, so values
/// add up to the total weight (100) rather than 1.
#[derive(Debug, Clone)]
pub struct LetterFrequencyModel {
    order: Vec<char>,
    freqs: FnvHashMap<char, f64>,
}

impl LetterFrequencyModel {
    pub fn build(corpora: &CorpusSet, ignore: &str) -> LfResult<Self> {
        if corpora.is_empty() {
            return Err(LayerForgeError::Config(
                "Cannot build letter frequencies without a weighted corpus".to_string(),
            ));
        }
        let ignore: FnvHashSet<char> = ignore.chars().map(fold_case).collect();

        let mut order = Vec::new();
        let mut freqs: FnvHashMap<char, f64> = FnvHashMap::default();
        for corpus in &corpora.corpora {
            for (letter, f) in corpus.monograms(&ignore) {
                let slot = freqs.entry(letter).or_insert_with(|| {
                    order.push(letter);
                    0.0
                });
                *slot += f * corpus.weight;
            }
        }

        debug!("Letter frequency model holds {} letters", order.len());
        Ok(Self { order, freqs })
    }

    pub fn frequency(&self, letter: char) -> f64 {
        self.freqs.get(&letter).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Letters in first-seen order.
    pub fn letters(&self) -> &[char] {
        &self.order
    }

    /// Letters by descending frequency. Equal frequencies keep first-seen order.
    pub fn ranked(&self) -> Vec<char> {
        let mut ranked = self.order.clone();
        ranked.sort_by(|a, b| self.freqs[b].total_cmp(&self.freqs[a]));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_and_skips_garbage() {
        let data = "Th 10\nhe 5.5\n\nxyz 3\nab nope\n";
        let entries = parse_corpus(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pair, ['t', 'h']);
        assert_eq!(entries[1].frequency, 5.5);
    }

    #[test]
    fn negative_frequency_is_rejected() {
        let res = parse_corpus("ab -1\n".as_bytes());
        assert!(matches!(res, Err(LayerForgeError::Validation(_))));
    }

    #[test]
    fn monograms_split_mass_evenly() {
        let corpus = Corpus::from_reader("x", 100.0, "ab 2\naa 2\n".as_bytes()).unwrap();
        let mono: FnvHashMap<char, f64> = corpus
            .monograms(&FnvHashSet::default())
            .into_iter()
            .collect();
        assert!((mono[&'a'] - 0.75).abs() < 1e-12);
        assert!((mono[&'b'] - 0.25).abs() < 1e-12);
    }
}
