#![allow(dead_code)]

use layerforge::config::{Config, CorpusConfig};
use layerforge::scorer::ScoreTable;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Top English bigrams (per 10k). 18 distinct letters.
pub const ENGLISH_SAMPLE: &[(&str, f64)] = &[
    ("th", 356.0),
    ("he", 307.0),
    ("in", 243.0),
    ("er", 205.0),
    ("an", 199.0),
    ("re", 185.0),
    ("on", 176.0),
    ("at", 149.0),
    ("en", 145.0),
    ("nd", 135.0),
    ("ti", 134.0),
    ("es", 134.0),
    ("or", 128.0),
    ("te", 120.0),
    ("of", 117.0),
    ("ed", 117.0),
    ("is", 113.0),
    ("it", 112.0),
    ("al", 109.0),
    ("ar", 107.0),
    ("st", 105.0),
    ("to", 104.0),
    ("nt", 104.0),
    ("ng", 95.0),
    ("se", 93.0),
    ("ha", 93.0),
    ("as", 87.0),
    ("ou", 87.0),
    ("io", 83.0),
    ("le", 83.0),
    ("ve", 83.0),
    ("co", 79.0),
    ("me", 79.0),
    ("de", 76.0),
    ("hi", 76.0),
    ("ri", 73.0),
    ("ro", 73.0),
    ("ic", 70.0),
    ("ne", 69.0),
    ("ea", 69.0),
    ("ra", 69.0),
    ("ce", 65.0),
    ("li", 62.0),
    ("ch", 60.0),
    ("ll", 58.0),
    ("be", 58.0),
    ("ma", 57.0),
    ("si", 55.0),
    ("om", 55.0),
    ("ur", 54.0),
];

pub const ENGLISH_LETTERS: usize = 18;

/// Deterministic, asymmetric score matrix.
pub fn sample_rows(size: usize) -> Vec<Vec<f64>> {
    (0..size)
        .map(|i| {
            (0..size)
                .map(|j| {
                    let dist = (i as f64 - j as f64).abs();
                    1.0 / (1.0 + dist) + ((i * 7 + j * 3) % 5) as f64 * 0.05
                })
                .collect()
        })
        .collect()
}

pub fn sample_table(size: usize) -> ScoreTable {
    ScoreTable::from_rows(sample_rows(size)).unwrap()
}

pub fn corpus_text(lines: &[(&str, f64)]) -> String {
    lines
        .iter()
        .map(|(pair, freq)| format!("{} {}\n", pair, freq))
        .collect()
}

/// Temporary directory holding corpus and score table files.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> String {
        let path = self.path(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    pub fn corpus(&self, name: &str, lines: &[(&str, f64)]) -> String {
        self.write(&format!("{}.txt", name), &corpus_text(lines))
    }

    pub fn table(&self, size: usize) -> String {
        let csv: String = sample_rows(size)
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
                format!("{}\n", cells.join(","))
            })
            .collect();
        self.write("table.csv", &csv)
    }

    /// English sample at 100%, four layers of `per_layer` letters.
    pub fn config(&self, per_layer: usize) -> Config {
        let mut config = Config::default();
        config.search.letters_per_layer = per_layer;
        config.search.best_layouts = 5;
        config.corpora = vec![CorpusConfig {
            name: "english".to_string(),
            weight: 100.0,
            path: self.corpus("english", ENGLISH_SAMPLE),
        }];
        config
    }
}

pub fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}
