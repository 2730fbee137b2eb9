use crate::error::{CfResult, CipherForgeError};
use crate::optimizer::ScoredCandidate;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Labelled search results, kept in sweep order.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    entries: Vec<(String, ScoredCandidate)>,
    index: HashMap<String, usize>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    label: &'a str,
    mode: String,
    key_length: usize,
    key: String,
    score: f64,
    strategy: String,
    evaluations: u64,
    interrupted: bool,
    text: &'a str,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels are unique; inserting one twice is an error.
    pub fn insert(&mut self, label: impl Into<String>, candidate: ScoredCandidate) -> CfResult<()> {
        let label = label.into();
        if self.index.contains_key(&label) {
            return Err(CipherForgeError::config(format!(
                "duplicate candidate label '{}'",
                label
            )));
        }
        self.index.insert(label.clone(), self.entries.len());
        self.entries.push((label, candidate));
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&ScoredCandidate> {
        self.index.get(label).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoredCandidate)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), c))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// Highest score; ties go to the label inserted first.
    pub fn best(&self) -> Option<(&str, &ScoredCandidate)> {
        let mut best: Option<(&str, &ScoredCandidate)> = None;
        for (label, cand) in self.iter() {
            match best {
                Some((_, b)) if cand.score <= b.score => {}
                _ => best = Some((label, cand)),
            }
        }
        best
    }

    /// Candidates sorted by descending score (stable on sweep order).
    pub fn ranked(&self) -> Vec<(&str, &ScoredCandidate)> {
        let mut all: Vec<_> = self.iter().collect();
        all.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
        all
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> CfResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for (label, c) in self.iter() {
            wtr.serialize(CsvRow {
                label,
                mode: c.mode.to_string(),
                key_length: c.key_length,
                key: c.mode.format_key(&c.key),
                score: c.score,
                strategy: c.strategy.to_string(),
                evaluations: c.evaluations,
                interrupted: c.interrupted,
                text: &c.text,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
