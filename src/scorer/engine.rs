use super::{Bigram, ScoreTable};
use crate::consts::{CODE_RANGE, SLOT_NOT_FOUND};

/// Reusable letter -> slot lookup. One per worker; `place` resets only the
/// entries the previous layout wrote.
#[derive(Debug, Clone)]
pub struct SlotMap {
    slots: [u8; CODE_RANGE],
    placed: Vec<u8>,
}

impl Default for SlotMap {
    fn default() -> Self {
        Self {
            slots: [SLOT_NOT_FOUND; CODE_RANGE],
            placed: Vec::with_capacity(64),
        }
    }
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, layout: &[u8]) {
        self.clear();
        for (slot, &code) in layout.iter().enumerate() {
            debug_assert!(slot < SLOT_NOT_FOUND as usize);
            self.slots[code as usize] = slot as u8;
            self.placed.push(code);
        }
    }

    pub fn clear(&mut self) {
        for &code in &self.placed {
            self.slots[code as usize] = SLOT_NOT_FOUND;
        }
        self.placed.clear();
    }

    #[inline(always)]
    pub fn get(&self, code: u8) -> u8 {
        self.slots[code as usize]
    }
}

/// Sum of `frequency * table[slot(first)][slot(second)]` over `bigrams`.
/// Bigrams with a letter that is not on the layout contribute nothing.
#[inline(always)]
pub fn score_placed(slots: &SlotMap, bigrams: &[Bigram], table: &ScoreTable) -> f64 {
    let mut score = 0.0;
    for b in bigrams {
        let p1 = slots.get(b.first);
        if p1 == SLOT_NOT_FOUND {
            continue;
        }
        let p2 = slots.get(b.second);
        if p2 == SLOT_NOT_FOUND {
            continue;
        }
        score += b.frequency * table.get(p1 as usize, p2 as usize);
    }
    score
}

pub fn score_layout(
    layout: &[u8],
    bigrams: &[Bigram],
    table: &ScoreTable,
    slots: &mut SlotMap,
) -> f64 {
    slots.place(layout);
    score_placed(slots, bigrams, table)
}
