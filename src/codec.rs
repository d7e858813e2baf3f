use crate::consts::{CODE_RANGE, FILL_SYMBOL};
use crate::error::{LayerForgeError, LfResult};
use fnv::FnvHashMap;
use tracing::debug;

/// Translates letters to the single-byte codes used by every lookup table.
///
/// ASCII letters encode to themselves. Any other letter is given a surrogate
/// byte the first time it is seen. Surrogates are drawn from the top of the
/// byte range downwards and never collide with a letter that was reserved at
/// construction, nor with the filler symbol.
///
/// The codec is built and populated by the driver before any scoring starts.
/// Scoring code only ever holds a shared reference, so workers cannot add
/// substitutions.
#[derive(Debug, Clone)]
pub struct LetterCodec {
    surrogates: FnvHashMap<char, u8>,
    originals: FnvHashMap<u8, char>,
    pool: Vec<u8>,
}

impl LetterCodec {
    /// Creates a codec whose surrogate pool excludes the byte values of the
    /// given letters (a letter such as `é` keeps its Latin-1 byte out of the
    /// pool so the decoded output stays unambiguous).
    pub fn new<I: IntoIterator<Item = char>>(reserved: I) -> Self {
        let mut taken = [false; CODE_RANGE];
        taken[FILL_SYMBOL as usize] = true;
        for letter in reserved {
            let code = letter as u32;
            if (code as usize) < CODE_RANGE {
                taken[code as usize] = true;
            }
        }

        let pool = (0..CODE_RANGE)
            .filter(|&b| !taken[b])
            .map(|b| b as u8)
            .collect();

        Self {
            surrogates: FnvHashMap::default(),
            originals: FnvHashMap::default(),
            pool,
        }
    }

    /// Returns the code for `letter`, assigning a surrogate if needed.
    pub fn encode_char(&mut self, letter: char) -> LfResult<u8> {
        if letter.is_ascii() {
            let code = letter as u8;
            if let Some(&owner) = self.originals.get(&code) {
                return Err(LayerForgeError::Codec(format!(
                    "'{}' collides with the surrogate already assigned to '{}'",
                    letter, owner
                )));
            }
            return Ok(code);
        }

        if let Some(&code) = self.surrogates.get(&letter) {
            return Ok(code);
        }

        let code = self.pool.pop().ok_or_else(|| {
            LayerForgeError::Codec(format!("no surrogate byte left for '{}'", letter))
        })?;
        debug!("Surrogate {:#04x} -> '{}'", code, letter);
        self.surrogates.insert(letter, code);
        self.originals.insert(code, letter);
        Ok(code)
    }

    pub fn encode(&mut self, text: &str) -> LfResult<Vec<u8>> {
        text.chars().map(|c| self.encode_char(c)).collect()
    }

    /// Read-only lookup. `None` for a non-ASCII letter that was never seen.
    pub fn code_of(&self, letter: char) -> Option<u8> {
        if letter.is_ascii() {
            Some(letter as u8)
        } else {
            self.surrogates.get(&letter).copied()
        }
    }

    pub fn decode(&self, code: u8) -> char {
        match self.originals.get(&code) {
            Some(&letter) => letter,
            None => code as char,
        }
    }

    pub fn decode_all(&self, codes: &[u8]) -> String {
        codes.iter().map(|&c| self.decode(c)).collect()
    }

    /// Number of letters currently mapped to a surrogate.
    pub fn substitutions(&self) -> usize {
        self.surrogates.len()
    }
}
