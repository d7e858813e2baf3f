mod common;

use common::{Fixture, ENGLISH_SAMPLE};
use regex::Regex;
use std::process::{Command, Output};

struct TestContext {
    fx: Fixture,
    table: String,
    corpus: String,
}

impl TestContext {
    fn new() -> Self {
        let fx = Fixture::new();
        let table = fx.table(16);
        let corpus = fx.corpus("english", ENGLISH_SAMPLE);
        Self { fx, table, corpus }
    }

    fn corpus_arg(&self, weight: f64) -> String {
        format!("english:{}:{}", weight, self.corpus)
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_layerforge"))
        .args(args)
        .output()
        .expect("Failed to run layerforge")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn read_json(path: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("JSON output missing");
    serde_json::from_str(&text).expect("JSON output is not valid")
}

#[test]
fn search_prints_ranking_and_writes_json() {
    let ctx = TestContext::new();
    let corpus = ctx.corpus_arg(100.0);
    let json = ctx.fx.path("result.json");
    let json = json.to_str().unwrap();

    let output = run(&[
        "search",
        "--table",
        &ctx.table,
        "--corpus",
        &corpus,
        "--letters-per-layer",
        "4",
        "--best-layouts",
        "5",
        "--show",
        "3",
        "--json",
        json,
    ]);
    let stdout = stdout_of(&output);
    assert!(
        output.status.success(),
        "search failed:\n{}\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("FINAL RESULT"));

    // Ranking rows: "| 1 | abcd efgh ijkl mnop | 12.3456 | ..."
    let row = Regex::new(r"\|\s*(\d+)\s*\|\s*[^|]+\|\s*-?\d+\.\d{4}\s*\|").unwrap();
    let ranks: Vec<usize> = row
        .captures_iter(&stdout)
        .map(|c| c[1].parse().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    let summary = read_json(json);
    assert_eq!(summary["layers"].as_array().unwrap().len(), 4);
    let layouts = summary["layouts"].as_array().unwrap();
    assert!(!layouts.is_empty() && layouts.len() <= 5);

    let scores: Vec<f64> = layouts
        .iter()
        .map(|l| l["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    // Most common letter pinned to the first slot
    let pinned = summary["pins"][0][1].as_str().unwrap();
    for layout in layouts {
        assert!(layout["layout"].as_str().unwrap().starts_with(pinned));
    }
}

#[test]
fn score_ranks_given_layouts() {
    let ctx = TestContext::new();
    let corpus = ctx.corpus_arg(100.0);
    let json = ctx.fx.path("scores.json");
    let json = json.to_str().unwrap();

    let output = run(&[
        "score",
        "-t",
        &ctx.table,
        "--corpus",
        &corpus,
        "--letters-per-layer",
        "4",
        "-l",
        "ETAOinsrhldcumgb",
        "-l",
        "bgmucdlhrsnioate",
        "--json",
        json,
    ]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("LAYOUT SCORES"));

    let reports = read_json(json);
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["score"].as_f64().unwrap() >= reports[1]["score"].as_f64().unwrap());
    let layouts: Vec<&str> = reports
        .iter()
        .map(|r| r["layout"].as_str().unwrap())
        .collect();
    assert!(layouts.contains(&"etaoinsrhldcumgb"));
}

#[test]
fn settings_file_is_overridden_by_flags() {
    let ctx = TestContext::new();
    let settings = format!(
        r#"{{
            "search": {{ "letters_per_layer": 4, "layers": 2, "best_layouts": 8 }},
            "corpora": [{{ "name": "english", "weight": 100.0, "path": "{}" }}]
        }}"#,
        ctx.corpus
    );
    let settings = ctx.fx.write("settings.json", &settings);
    let json = ctx.fx.path("result.json");
    let json = json.to_str().unwrap();

    let output = run(&[
        "--settings",
        &settings,
        "search",
        "--table",
        &ctx.table,
        "--best-layouts",
        "2",
        "--json",
        json,
    ]);
    assert!(output.status.success());

    let summary = read_json(json);
    assert!(summary["layouts"].as_array().unwrap().len() <= 2);
    assert_eq!(
        summary["layouts"][0]["layout"].as_str().unwrap().chars().count(),
        8
    );
}

#[test]
fn invalid_weights_exit_with_an_error() {
    let ctx = TestContext::new();
    let corpus = ctx.corpus_arg(50.0);

    let output = run(&["search", "--table", &ctx.table, "--corpus", &corpus]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not 100"), "unexpected stderr: {}", stderr);
}

#[test]
fn missing_score_table_is_reported() {
    let ctx = TestContext::new();
    let corpus = ctx.corpus_arg(100.0);
    let missing = ctx.fx.path("missing.csv");

    let output = run(&[
        "search",
        "--table",
        missing.to_str().unwrap(),
        "--corpus",
        &corpus,
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("score table"));
}
