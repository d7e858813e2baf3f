/// Size of every code-indexed lookup table. Letters are encoded to `u8`.
pub const CODE_RANGE: usize = 256;

/// Marks a letter that is not placed on the layout being scored.
/// This limits a layout to 254 slots.
pub const SLOT_NOT_FOUND: u8 = 255;

/// Reserved symbol padding under-full layers.
pub const FILL_SYMBOL: u8 = b'-';

/// Number of layers the partitioner always produces.
pub const LAYER_COUNT: usize = 4;

/// Default capacity of a single layer (one 8VIM petal ring).
pub const DEFAULT_LETTERS_PER_LAYER: usize = 8;

/// Default number of candidates a worker keeps from its group.
pub const DEFAULT_LOCAL_KEEP: usize = 500;

/// Default number of simultaneous scoring workers.
pub const DEFAULT_MAX_WORKERS: usize = 15;
