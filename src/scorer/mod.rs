pub mod letters;
pub mod loader;

use self::letters::LetterModel;
use self::loader::RawNgrams;
use crate::consts::{ALPHABET_SIZE, DENSE_NGRAM_MAX, EMPTY_TEXT_SCORE, NGRAM_FLOOR_COUNT};
use crate::error::{CfResult, CipherForgeError};
use crate::util::{letter_codes, ngram_code};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

/// Log-probability lookup for n-grams, keyed by base-26 code.
/// Dense tables are pre-filled with the floor so a miss costs nothing extra.
#[derive(Debug, Clone)]
enum NgramTable {
    Dense(Vec<f64>),
    Sparse(HashMap<u64, f64>),
}

#[derive(Debug, Clone)]
struct NgramModel {
    n: usize,
    table: NgramTable,
    floor: f64,
    entries: usize,
    best: (String, f64),
}

impl NgramModel {
    #[inline(always)]
    fn lookup(&self, code: u64) -> f64 {
        match &self.table {
            NgramTable::Dense(v) => v[code as usize],
            NgramTable::Sparse(m) => m.get(&code).copied().unwrap_or(self.floor),
        }
    }

    fn score_codes(&self, codes: &[u8]) -> f64 {
        // Rolling base-26 window: drop the leading letter, append the next.
        let high = 26u64.pow((self.n - 1) as u32);
        let mut code = 0u64;
        let mut score = 0.0;
        for (i, &c) in codes.iter().enumerate() {
            code = (code % high) * 26 + c as u64;
            if i + 1 >= self.n {
                score += self.lookup(code);
            }
        }
        score
    }
}

/// Statistical scorer for candidate plaintexts.
///
/// Scores are sums of `log10` probabilities, so higher is better and
/// comparisons stay meaningful across keys for the same ciphertext.
/// Immutable after construction; share it across threads with `Arc`.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    ngrams: Option<NgramModel>,
    letters: LetterModel,
}

impl LanguageModel {
    /// Builds a model from loaded counts. Grams must be exactly `n` upper-case
    /// letters; zero-count entries are treated as unseen.
    pub fn from_counts(raw: RawNgrams) -> CfResult<Self> {
        loader::check_order(raw.n)?;
        if raw.total == 0 {
            return Err(CipherForgeError::config(
                "n-gram table is empty or invalid: total count is zero",
            ));
        }

        let n = raw.n;
        let total = raw.total as f64;
        let floor = (NGRAM_FLOOR_COUNT / total).log10();

        let mut table = if n <= DENSE_NGRAM_MAX {
            NgramTable::Dense(vec![floor; 26usize.pow(n as u32)])
        } else {
            NgramTable::Sparse(HashMap::with_capacity(raw.counts.len()))
        };

        let mut entries = 0;
        let mut best = (String::new(), f64::NEG_INFINITY);

        for (gram, count) in raw.counts {
            if gram.len() != n || !gram.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(CipherForgeError::config(format!(
                    "'{}' is not a {}-letter upper-case n-gram",
                    gram, n
                )));
            }
            if count == 0 {
                continue;
            }
            let log_p = (count as f64 / total).log10();
            let code = ngram_code(gram.as_bytes());
            match &mut table {
                NgramTable::Dense(v) => v[code as usize] = log_p,
                NgramTable::Sparse(m) => {
                    m.insert(code, log_p);
                }
            }
            entries += 1;
            if log_p > best.1 {
                best = (gram, log_p);
            }
        }

        Ok(Self {
            ngrams: Some(NgramModel {
                n,
                table,
                floor,
                entries,
                best,
            }),
            letters: LetterModel::english(),
        })
    }

    pub fn from_reader<R: BufRead>(reader: R, n: usize) -> CfResult<Self> {
        Self::from_counts(loader::load_ngrams(reader, n)?)
    }

    /// Loads an n-gram table from disk.
    ///
    /// A missing file is `NotFound`; an empty or corrupt table is `Config`.
    pub fn load<P: AsRef<Path>>(path: P, n: usize) -> CfResult<Self> {
        let path = path.as_ref();
        let raw = loader::load_ngram_file(path, n)?;
        let skipped = raw.skipped;
        let model = Self::from_counts(raw)?;
        info!(
            "Loaded {} {}-grams from '{}' ({} lines skipped)",
            model.len(),
            n,
            path.display(),
            skipped
        );
        Ok(model)
    }

    /// Like [`load`](Self::load), but an empty or corrupt table degrades to
    /// the English letter model with a warning. A missing file is still fatal.
    pub fn load_with_fallback<P: AsRef<Path>>(path: P, n: usize) -> CfResult<Self> {
        let path = path.as_ref();
        match Self::load(path, n) {
            Ok(model) => Ok(model),
            Err(CipherForgeError::Config(msg)) => {
                warn!(
                    "Could not use n-gram table '{}': {}. Falling back to letter frequencies.",
                    path.display(),
                    msg
                );
                Ok(Self::english_letters())
            }
            Err(e) => Err(e),
        }
    }

    /// Unigram-only model built from fixed English letter frequencies.
    pub fn english_letters() -> Self {
        Self {
            ngrams: None,
            letters: LetterModel::english(),
        }
    }

    /// Counts every overlapping n-gram of the normalized `corpus` and builds a
    /// model from them.
    pub fn train(corpus: &str, n: usize) -> CfResult<Self> {
        loader::check_order(n)?;
        let letters = crate::util::letters_upper(corpus);
        let bytes = letters.as_bytes();

        let mut counts: HashMap<&[u8], u64> = HashMap::new();
        let mut order: Vec<&[u8]> = Vec::new();
        for window in bytes.windows(n) {
            let slot = counts.entry(window).or_insert_with(|| {
                order.push(window);
                0
            });
            *slot += 1;
        }

        let total: u64 = counts.values().sum();
        let counts = order
            .into_iter()
            .map(|w| (String::from_utf8_lossy(w).into_owned(), counts[w]))
            .collect();

        Self::from_counts(RawNgrams {
            n,
            counts,
            total,
            lines_read: 0,
            skipped: 0,
        })
    }

    /// N-gram order, or 1 for the letter model.
    pub fn n(&self) -> usize {
        self.ngrams.as_ref().map_or(1, |m| m.n)
    }

    /// Log-probability given to unseen units.
    pub fn floor(&self) -> f64 {
        self.ngrams
            .as_ref()
            .map_or(self.letters.floor(), |m| m.floor)
    }

    pub fn is_letter_model(&self) -> bool {
        self.ngrams.is_none()
    }

    /// Number of distinct n-grams with a stored probability.
    pub fn len(&self) -> usize {
        self.ngrams.as_ref().map_or(26, |m| m.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most probable n-gram and its log-probability.
    pub fn best_ngram(&self) -> Option<(&str, f64)> {
        self.ngrams.as_ref().map(|m| (m.best.0.as_str(), m.best.1))
    }

    /// Scores arbitrary text. Everything but ASCII letters is ignored.
    pub fn score(&self, text: &str) -> f64 {
        self.score_codes(&letter_codes(text))
    }

    /// Scores text already reduced to alphabet codes (A=0 .. Z=25).
    /// Codes outside the alphabet are dropped, like non-letters in `score`.
    pub fn score_codes(&self, codes: &[u8]) -> f64 {
        if codes.iter().any(|&c| c as usize >= ALPHABET_SIZE) {
            let valid: Vec<u8> = codes
                .iter()
                .copied()
                .filter(|&c| (c as usize) < ALPHABET_SIZE)
                .collect();
            return self.score_codes(&valid);
        }
        if codes.is_empty() {
            return EMPTY_TEXT_SCORE;
        }
        match &self.ngrams {
            Some(m) if codes.len() >= m.n => m.score_codes(codes),
            _ => self.letters.score_codes(codes),
        }
    }
}

impl Default for LanguageModel {
    fn default() -> Self {
        Self::english_letters()
    }
}
