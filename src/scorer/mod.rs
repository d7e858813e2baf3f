pub mod bigrams;
pub mod engine;
pub mod loader;

pub use self::bigrams::{Bigram, BigramCache};
pub use self::engine::SlotMap;

use crate::error::{LayerForgeError, LfResult};

/// Square slot-to-slot transition score matrix, stored flattened.
///
/// Access: `values[from * size + to]`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    size: usize,
    values: Vec<f64>,
}

impl ScoreTable {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> LfResult<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(LayerForgeError::Validation(
                "Score table is empty".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(LayerForgeError::Validation(format!(
                    "Score table must be square: row {} has {} columns, expected {}",
                    i + 1,
                    row.len(),
                    size
                )));
            }
            values.extend(row);
        }
        Ok(Self { size, values })
    }

    #[inline(always)]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Fails unless the table covers `slots` slots in both directions.
    pub fn ensure_covers(&self, slots: usize) -> LfResult<()> {
        if self.size < slots {
            return Err(LayerForgeError::Config(format!(
                "Score table is {0}x{0}, but the layout has {1} slots",
                self.size, slots
            )));
        }
        Ok(())
    }
}
