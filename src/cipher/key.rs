use crate::error::{CfResult, CipherForgeError};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A permutation of `0..len`. Every constructor keeps it a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Key(Vec<usize>);

impl Key {
    /// Validates that `perm` holds each of `0..perm.len()` exactly once.
    pub fn new(perm: Vec<usize>) -> CfResult<Self> {
        let mut seen = vec![false; perm.len()];
        for &v in &perm {
            match seen.get_mut(v) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(CipherForgeError::config(format!(
                        "key {:?} repeats position {}",
                        perm, v
                    )))
                }
                None => {
                    return Err(CipherForgeError::config(format!(
                        "key {:?} has position {} outside 0..{}",
                        perm,
                        v,
                        perm.len()
                    )))
                }
            }
        }
        Ok(Self(perm))
    }

    /// Built from an enumeration that is known to yield permutations.
    pub(crate) fn from_permutation(perm: Vec<usize>) -> Self {
        debug_assert!(Key::new(perm.clone()).is_ok());
        Self(perm)
    }

    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn random(len: usize, rng: &mut Rng) -> Self {
        let mut perm: Vec<usize> = (0..len).collect();
        rng.shuffle(&mut perm);
        Self(perm)
    }

    /// Parses a comma or whitespace separated list of indices, e.g. `"2,0,1"`.
    pub fn parse_indices(s: &str) -> CfResult<Self> {
        let perm = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<usize>().map_err(|_| {
                    CipherForgeError::config(format!("invalid key position '{}'", t))
                })
            })
            .collect::<CfResult<Vec<usize>>>()?;
        Self::new(perm)
    }

    /// Parses a 26-letter substitution key (`key[c]` is the plain letter for
    /// cipher letter `c`).
    pub fn parse_letters(s: &str) -> CfResult<Self> {
        let letters: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if letters.len() != 26 || !letters.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(CipherForgeError::config(format!(
                "substitution key must be 26 letters, got '{}'",
                s
            )));
        }
        Self::new(
            letters
                .iter()
                .map(|b| (b.to_ascii_uppercase() - b'A') as usize)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Swapping twice with the same pair restores the key exactly.
    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Swaps two distinct, uniformly chosen positions and returns them so the
    /// caller can revert. Requires `len >= 2`.
    #[inline]
    pub fn swap_random(&mut self, rng: &mut Rng) -> (usize, usize) {
        let n = self.0.len();
        let i = rng.usize(0..n);
        let mut j = rng.usize(0..n - 1);
        if j >= i {
            j += 1;
        }
        self.0.swap(i, j);
        (i, j)
    }

    /// Inverse permutation: `inv[key[i]] == i`.
    pub fn inverse(&self) -> Key {
        let mut inv = vec![0; self.0.len()];
        for (i, &v) in self.0.iter().enumerate() {
            inv[v] = i;
        }
        Key(inv)
    }

    /// Renders a substitution key as the plain letters for A..Z.
    pub fn to_letters(&self) -> String {
        self.0
            .iter()
            .map(|&v| (b'A' + (v % 26) as u8) as char)
            .collect()
    }
}

impl TryFrom<Vec<usize>> for Key {
    type Error = CipherForgeError;

    fn try_from(v: Vec<usize>) -> CfResult<Self> {
        Key::new(v)
    }
}

impl From<Key> for Vec<usize> {
    fn from(k: Key) -> Self {
        k.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
