use crate::consts::MAX_NGRAM_SIZE;
use crate::error::{CfResult, CipherForgeError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// N-gram counts as read from a frequency table, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawNgrams {
    pub n: usize,
    /// Upper-case n-grams in first-seen order. Duplicates are merged.
    pub counts: Vec<(String, u64)>,
    pub total: u64,
    pub lines_read: usize,
    pub skipped: usize,
}

pub fn check_order(n: usize) -> CfResult<()> {
    if n == 0 || n > MAX_NGRAM_SIZE {
        return Err(CipherForgeError::config(format!(
            "n-gram order must be between 1 and {}, got {}",
            MAX_NGRAM_SIZE, n
        )));
    }
    Ok(())
}

/// Parses `"<NGRAM> <COUNT>"` lines.
///
/// Lines with the wrong token count, a non-numeric count, or an n-gram that is
/// not exactly `n` letters are skipped. A table whose counts sum to zero is a
/// configuration error.
pub fn load_ngrams<R: BufRead>(reader: R, n: usize) -> CfResult<RawNgrams> {
    check_order(n)?;

    let mut raw = RawNgrams {
        n,
        ..Default::default()
    };
    let mut index: HashMap<String, usize> = HashMap::new();

    for chunk in reader.split(b'\n') {
        let bytes = chunk?;
        raw.lines_read += 1;
        let line = String::from_utf8_lossy(&bytes);

        let mut tokens = line.split_whitespace();
        let (gram, count) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(g), Some(c), None) => (g, c),
            (None, _, _) => continue,
            _ => {
                raw.skipped += 1;
                continue;
            }
        };

        let count: u64 = match count.parse() {
            Ok(v) => v,
            Err(_) => {
                raw.skipped += 1;
                continue;
            }
        };

        if gram.len() != n || !gram.bytes().all(|b| b.is_ascii_alphabetic()) {
            raw.skipped += 1;
            continue;
        }

        let gram = gram.to_ascii_uppercase();
        raw.total = raw.total.saturating_add(count);

        match index.get(&gram) {
            Some(&i) => raw.counts[i].1 = raw.counts[i].1.saturating_add(count),
            None => {
                index.insert(gram.clone(), raw.counts.len());
                raw.counts.push((gram, count));
            }
        }
    }

    debug!(
        "Scanned {} lines: {} distinct {}-grams, {} skipped, total count {}",
        raw.lines_read,
        raw.counts.len(),
        n,
        raw.skipped,
        raw.total
    );

    if raw.total == 0 {
        return Err(CipherForgeError::config(format!(
            "n-gram table is empty or invalid: no usable {}-grams in {} lines ({} skipped)",
            n, raw.lines_read, raw.skipped
        )));
    }

    Ok(raw)
}

/// Opens and parses a frequency table. An unreadable file is reported as
/// `NotFound` with the path and the OS reason.
pub fn load_ngram_file<P: AsRef<Path>>(path: P, n: usize) -> CfResult<RawNgrams> {
    let path = path.as_ref();
    debug!("Loading n-grams from: {}", path.display());

    let file = File::open(path).map_err(|e| CipherForgeError::NotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    load_ngrams(BufReader::new(file), n).map_err(|e| match e {
        CipherForgeError::Config(msg) => {
            CipherForgeError::Config(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}
