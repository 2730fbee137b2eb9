/// Number of letters in the working alphabet (A-Z).
pub const ALPHABET_SIZE: usize = 26;

/// Largest key space searched exhaustively (8!).
/// Anything larger goes to simulated annealing.
pub const EXHAUSTIVE_KEY_SPACE_LIMIT: u64 = 40_320;

/// Score assigned to text with no alphabetic characters.
/// Low enough that it never wins a comparison against real text.
pub const EMPTY_TEXT_SCORE: f64 = -1e9;

/// Default n-gram order (quadgrams).
pub const DEFAULT_NGRAM_SIZE: usize = 4;

/// Highest n-gram order accepted by the loader (26^8 still fits a u64 code).
pub const MAX_NGRAM_SIZE: usize = 8;

/// Orders up to this one are stored as a dense 26^n table.
pub const DENSE_NGRAM_MAX: usize = 4;

/// Pseudo-count used for unseen n-grams: floor = log10(0.01 / total).
pub const NGRAM_FLOOR_COUNT: f64 = 0.01;

/// Pseudo-frequency used for unseen letters in the fallback model.
pub const LETTER_FLOOR_FREQ: f64 = 0.0001;

/// How many exhaustive permutations run between progress polls.
pub const EXHAUSTIVE_POLL_INTERVAL: u64 = 1024;

/// How long an external arbiter may take before it is killed.
pub const ARBITER_TIMEOUT_SECS: u64 = 60;

/// Sleep between exit checks while waiting on an arbiter process.
pub const ARBITER_POLL_MS: u64 = 10;
