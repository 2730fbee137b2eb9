use super::{check_key_length, CipherMode, CipherScheme, Key};
use crate::error::CfResult;
use crate::util::letters_upper;

/// Permutation of positions inside fixed-size blocks.
///
/// Plain position `i` of each full block takes cipher position `key[i]`. A
/// trailing partial block is left as it is.
#[derive(Debug, Clone, Copy)]
pub struct BlockPermutation {
    key_length: usize,
}

impl BlockPermutation {
    pub fn new(key_length: usize) -> CfResult<Self> {
        check_key_length(CipherMode::Block, key_length)?;
        Ok(Self { key_length })
    }
}

impl CipherScheme for BlockPermutation {
    fn mode(&self) -> CipherMode {
        CipherMode::Block
    }

    fn key_len(&self) -> usize {
        self.key_length
    }

    fn decode(&self, ciphertext: &str, key: &Key) -> String {
        let text = letters_upper(ciphertext);
        let k = key.as_slice();
        if k.is_empty() {
            return text;
        }

        let mut out = String::with_capacity(text.len());
        for block in text.as_bytes().chunks(k.len()) {
            if block.len() < k.len() {
                out.extend(block.iter().map(|&b| b as char));
            } else {
                out.extend(k.iter().map(|&j| block[j] as char));
            }
        }
        out
    }

    fn encode(&self, plaintext: &str, key: &Key) -> String {
        let text = letters_upper(plaintext);
        let k = key.as_slice();
        if k.is_empty() {
            return text;
        }

        let mut out = String::with_capacity(text.len());
        let mut cipher_block = vec![b'A'; k.len()];
        for block in text.as_bytes().chunks(k.len()) {
            if block.len() < k.len() {
                out.extend(block.iter().map(|&b| b as char));
            } else {
                for (i, &j) in k.iter().enumerate() {
                    cipher_block[j] = block[i];
                }
                out.extend(cipher_block.iter().map(|&b| b as char));
            }
        }
        out
    }
}
