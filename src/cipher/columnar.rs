use super::{check_key_length, CipherMode, CipherScheme, Key};
use crate::error::CfResult;
use crate::util::letters_upper;

/// Columnar transposition with `key_length` columns.
///
/// Text is reduced to upper-case letters. The plaintext grid has
/// `ceil(len / k)` rows; when `len % k != 0` only the first `len % k` columns
/// reach the last row. Columns are read out in ascending key order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnarTransposition {
    key_length: usize,
}

impl ColumnarTransposition {
    pub fn new(key_length: usize) -> CfResult<Self> {
        check_key_length(CipherMode::Columnar, key_length)?;
        Ok(Self { key_length })
    }
}

struct Grid {
    cols: usize,
    rows: usize,
    remainder: usize,
}

impl Grid {
    fn new(len: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: len.div_ceil(cols),
            remainder: len % cols,
        }
    }

    #[inline]
    fn col_len(&self, col: usize) -> usize {
        if self.remainder == 0 || col < self.remainder {
            self.rows
        } else {
            self.rows - 1
        }
    }
}

/// Column indices sorted by key value; equal values keep index order.
fn column_order(key: &Key) -> Vec<usize> {
    let k = key.as_slice();
    let mut order: Vec<usize> = (0..k.len()).collect();
    order.sort_by_key(|&c| k[c]);
    order
}

impl CipherScheme for ColumnarTransposition {
    fn mode(&self) -> CipherMode {
        CipherMode::Columnar
    }

    fn key_len(&self) -> usize {
        self.key_length
    }

    fn decode(&self, ciphertext: &str, key: &Key) -> String {
        let text = letters_upper(ciphertext);
        let bytes = text.as_bytes();
        if key.is_empty() || bytes.is_empty() {
            return text;
        }

        let grid = Grid::new(bytes.len(), key.len());

        // Where each column starts inside the ciphertext.
        let mut start = vec![0; grid.cols];
        let mut offset = 0;
        for c in column_order(key) {
            start[c] = offset;
            offset += grid.col_len(c);
        }

        let mut out = String::with_capacity(bytes.len());
        for r in 0..grid.rows {
            for (c, &s) in start.iter().enumerate() {
                if r < grid.col_len(c) {
                    out.push(bytes[s + r] as char);
                }
            }
        }
        out
    }

    fn encode(&self, plaintext: &str, key: &Key) -> String {
        let text = letters_upper(plaintext);
        let bytes = text.as_bytes();
        if key.is_empty() || bytes.is_empty() {
            return text;
        }

        let grid = Grid::new(bytes.len(), key.len());
        let mut out = String::with_capacity(bytes.len());
        for c in column_order(key) {
            for r in 0..grid.col_len(c) {
                out.push(bytes[r * grid.cols + c] as char);
            }
        }
        out
    }
}
