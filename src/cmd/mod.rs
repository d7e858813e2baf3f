pub mod score;
pub mod search;

use layerforge::error::LfResult;
use serde::Serialize;
use std::fs;

pub fn write_json<T: Serialize>(path: &str, value: &T) -> LfResult<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    println!("💾 Results written to {}", path);
    Ok(())
}
