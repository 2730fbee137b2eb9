//! Text normalization shared by the scorer and the transposition schemes.

/// Upper-cases `text` and keeps only ASCII letters.
pub fn letters_upper(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Maps every ASCII letter of `text` to its alphabet index (A=0 .. Z=25),
/// dropping everything else.
pub fn letter_codes(text: &str) -> Vec<u8> {
    text.bytes()
        .filter(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase() - b'A')
        .collect()
}

/// Base-26 code of an upper-case n-gram. Callers guarantee the input is A-Z.
pub fn ngram_code(gram: &[u8]) -> u64 {
    gram.iter()
        .fold(0u64, |acc, &b| acc * 26 + (b - b'A') as u64)
}

pub fn factorial(n: usize) -> u128 {
    (2..=n as u128).fold(1u128, |acc, x| acc.saturating_mul(x))
}
