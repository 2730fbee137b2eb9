pub mod anneal;
pub mod exhaustive;
pub mod runner;

pub use self::anneal::Annealer;
pub use self::runner::{
    CancelToken, NoProgress, ProgressCallback, ScoredCandidate, SearchEngine, SearchOptions,
    Strategy,
};
