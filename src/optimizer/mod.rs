pub mod evaluation;
pub mod greedy;
pub mod permutations;
pub mod runner;
pub mod selection;

pub use self::evaluation::{BatchEvaluator, EvaluationOptions, StageGroup};
pub use self::runner::{LayoutSearch, ProgressCallback, SearchOptions, SearchOutcome, StageReport};
pub use self::selection::TopK;
