use super::{CipherMode, CipherScheme, Key};
use crate::consts::ALPHABET_SIZE;

/// Monoalphabetic substitution over A-Z.
///
/// `key[c]` is the plain letter for cipher letter `c`. Letter case is kept and
/// every other character passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substitution;

impl Substitution {
    pub const KEY_LENGTH: usize = ALPHABET_SIZE;

    pub fn new() -> Self {
        Self
    }

    fn map_letters(text: &str, table: &[usize]) -> String {
        text.chars()
            .map(|ch| {
                if !ch.is_ascii_alphabetic() {
                    return ch;
                }
                let idx = (ch.to_ascii_uppercase() as u8 - b'A') as usize;
                match table.get(idx) {
                    Some(&v) => {
                        let mapped = (b'A' + (v % ALPHABET_SIZE) as u8) as char;
                        if ch.is_ascii_lowercase() {
                            mapped.to_ascii_lowercase()
                        } else {
                            mapped
                        }
                    }
                    None => ch,
                }
            })
            .collect()
    }
}

impl CipherScheme for Substitution {
    fn mode(&self) -> CipherMode {
        CipherMode::Substitution
    }

    fn key_len(&self) -> usize {
        Self::KEY_LENGTH
    }

    fn decode(&self, ciphertext: &str, key: &Key) -> String {
        Self::map_letters(ciphertext, key.as_slice())
    }

    fn encode(&self, plaintext: &str, key: &Key) -> String {
        Self::map_letters(plaintext, key.inverse().as_slice())
    }
}
