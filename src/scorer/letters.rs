use crate::consts::{ALPHABET_SIZE, LETTER_FLOOR_FREQ};

/// Relative frequencies of A..Z in English prose.
pub const ENGLISH_LETTER_FREQS: [f64; ALPHABET_SIZE] = [
    0.08167, 0.01492, 0.02782, 0.04253, 0.12702, 0.02228, 0.02015, // A-G
    0.06094, 0.06966, 0.00153, 0.00772, 0.04025, 0.02406, 0.06749, // H-N
    0.07507, 0.01929, 0.00095, 0.05987, 0.06327, 0.09056, 0.02758, // O-U
    0.00978, 0.02360, 0.00150, 0.01974, 0.00074, // V-Z
];

/// Unigram model used for texts shorter than the n-gram order, and as the
/// whole model when no n-gram table is available.
#[derive(Debug, Clone)]
pub struct LetterModel {
    log_probs: [f64; ALPHABET_SIZE],
    floor: f64,
}

impl LetterModel {
    pub fn new(freqs: &[f64; ALPHABET_SIZE]) -> Self {
        let total: f64 = freqs.iter().sum();
        let mut log_probs = [0.0; ALPHABET_SIZE];
        let floor = (LETTER_FLOOR_FREQ / total).log10();
        for (slot, &f) in log_probs.iter_mut().zip(freqs) {
            *slot = if f > 0.0 { (f / total).log10() } else { floor };
        }
        Self { log_probs, floor }
    }

    pub fn english() -> Self {
        Self::new(&ENGLISH_LETTER_FREQS)
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    #[inline]
    pub fn log_prob(&self, code: u8) -> f64 {
        self.log_probs
            .get(code as usize)
            .copied()
            .unwrap_or(self.floor)
    }

    /// Sum of per-letter log probabilities over alphabet codes.
    pub fn score_codes(&self, codes: &[u8]) -> f64 {
        codes.iter().map(|&c| self.log_prob(c)).sum()
    }
}

impl Default for LetterModel {
    fn default() -> Self {
        Self::english()
    }
}
