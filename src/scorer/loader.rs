use super::ScoreTable;
use crate::error::{LayerForgeError, LfResult};
use std::fs::File;
use std::io::Read;
use tracing::info;

/// Reads a headerless CSV of numbers into a `ScoreTable`.
pub fn read_score_table<R: Read>(reader: R) -> LfResult<ScoreTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let rec = result?;
        if rec.iter().all(|f| f.is_empty()) {
            continue;
        }

        let row = rec
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.parse::<f64>().map_err(|_| {
                    LayerForgeError::Validation(format!(
                        "Score table row {}: '{}' is not a number",
                        row_idx + 1,
                        f
                    ))
                })
            })
            .collect::<LfResult<Vec<_>>>()?;
        rows.push(row);
    }

    ScoreTable::from_rows(rows)
}

pub fn load_score_table(path: &str) -> LfResult<ScoreTable> {
    info!("Loading score table from {}", path);
    let file = File::open(path)?;
    let table = read_score_table(file)?;
    info!("Score table: {0}x{0}", table.size());
    Ok(table)
}
