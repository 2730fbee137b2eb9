pub mod block;
pub mod columnar;
pub mod key;
pub mod substitution;

pub use self::block::BlockPermutation;
pub use self::columnar::ColumnarTransposition;
pub use self::key::Key;
pub use self::substitution::Substitution;

use crate::error::{CfResult, CipherForgeError};
use crate::util::factorial;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CipherMode {
    Substitution,
    Columnar,
    Block,
}

impl CipherMode {
    /// Substitution keys always cover the whole alphabet.
    pub fn fixed_key_length(&self) -> Option<usize> {
        match self {
            Self::Substitution => Some(Substitution::KEY_LENGTH),
            Self::Columnar | Self::Block => None,
        }
    }

    /// Builds the scheme for this mode. `key_length` is ignored for
    /// substitution.
    pub fn scheme(&self, key_length: usize) -> CfResult<Box<dyn CipherScheme>> {
        Ok(match self {
            Self::Substitution => Box::new(Substitution::new()),
            Self::Columnar => Box::new(ColumnarTransposition::new(key_length)?),
            Self::Block => Box::new(BlockPermutation::new(key_length)?),
        })
    }

    pub fn format_key(&self, key: &Key) -> String {
        match self {
            Self::Substitution => key.to_letters(),
            Self::Columnar | Self::Block => key.to_string(),
        }
    }

    /// Parses a key in the notation [`format_key`](Self::format_key) prints.
    pub fn parse_key(&self, s: &str) -> CfResult<Key> {
        match self {
            Self::Substitution => Key::parse_letters(s),
            Self::Columnar | Self::Block => Key::parse_indices(s),
        }
    }
}

/// One family of classical ciphers: how to decode under a key, and the shape
/// of its key space.
///
/// Keys of every scheme are permutations, so the random and neighbour moves
/// are shared. Neighbour moves are single transpositions; the annealer applies
/// them in place and undoes a rejected move with the same swap.
pub trait CipherScheme: Send + Sync {
    fn mode(&self) -> CipherMode;

    fn key_len(&self) -> usize;

    fn decode(&self, ciphertext: &str, key: &Key) -> String;

    /// Exact inverse of [`decode`](Self::decode).
    fn encode(&self, plaintext: &str, key: &Key) -> String;

    /// Number of distinct keys (saturates at `u128::MAX`).
    fn key_space_size(&self) -> u128 {
        factorial(self.key_len())
    }

    fn random_key(&self, rng: &mut Rng) -> Key {
        Key::random(self.key_len(), rng)
    }

    /// A copy of `key` with two distinct positions exchanged.
    fn neighbor_key(&self, key: &Key, rng: &mut Rng) -> Key {
        let mut next = key.clone();
        next.swap_random(rng);
        next
    }

    fn validate_key(&self, key: &Key) -> CfResult<()> {
        if key.len() != self.key_len() {
            return Err(CipherForgeError::config(format!(
                "{} key must have length {}, got {}",
                self.mode(),
                self.key_len(),
                key.len()
            )));
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("{}_{}", self.mode(), self.key_len())
    }
}

pub(crate) fn check_key_length(mode: CipherMode, key_length: usize) -> CfResult<()> {
    if key_length < 2 {
        return Err(CipherForgeError::config(format!(
            "{} key length must be at least 2, got {}",
            mode, key_length
        )));
    }
    Ok(())
}
