pub mod arbiter;
pub mod pool;

pub use self::arbiter::{
    parse_verdict, Arbiter, ArbitrationRequest, CandidateSummary, CommandArbiter, Verdict,
};
pub use self::pool::CandidatePool;

use crate::cipher::{CipherMode, Key};
use crate::config::{Config, SweepParams};
use crate::error::{CfResult, CipherForgeError};
use crate::optimizer::{ProgressCallback, ScoredCandidate, SearchEngine, SearchOptions};
use crate::scorer::LanguageModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One search the dispatcher hands to a worker. Labels and seeds are fixed
/// here, before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepJob {
    pub label: String,
    pub mode: CipherMode,
    pub key_length: usize,
    pub seed: Option<u64>,
}

/// Final answer of a sweep. The shape is the same whether or not an arbiter
/// was consulted; only `suggestion` and `arbitrated` change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub best_label: String,
    pub mode: CipherMode,
    pub key_length: usize,
    pub key: Key,
    pub score: f64,
    pub decoded_text: String,
    pub suggestion: Option<String>,
    pub arbitrated: bool,
}

impl SweepReport {
    fn new(label: &str, c: &ScoredCandidate, suggestion: Option<String>, arbitrated: bool) -> Self {
        Self {
            best_label: label.to_string(),
            mode: c.mode,
            key_length: c.key_length,
            key: c.key.clone(),
            score: c.score,
            decoded_text: c.text.clone(),
            suggestion,
            arbitrated,
        }
    }
}

/// Runs the search engine over every (mode, key length) pair of a sweep and
/// picks a winner.
pub struct CandidateAggregator {
    engine: SearchEngine,
    params: SweepParams,
}

impl CandidateAggregator {
    pub fn new(engine: SearchEngine, params: SweepParams) -> Self {
        Self { engine, params }
    }

    pub fn from_config(model: Arc<LanguageModel>, config: &Config) -> Self {
        Self::new(
            SearchEngine::new(model, SearchOptions::from(config)),
            config.sweep.clone(),
        )
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Substitution (fixed 26-letter key) first, once; then every key length
    /// with the remaining modes in configured order. Job `i` gets `seed + i`.
    pub fn plan(&self, seed: Option<u64>) -> CfResult<Vec<SweepJob>> {
        self.params.validate()?;
        let modes = self.params.get_modes()?;

        let mut specs: Vec<(CipherMode, usize)> = Vec::new();
        for &mode in &modes {
            if let Some(len) = mode.fixed_key_length() {
                specs.push((mode, len));
            }
        }
        for key_length in self.params.min_key_length..=self.params.max_key_length {
            for &mode in &modes {
                if mode.fixed_key_length().is_none() {
                    specs.push((mode, key_length));
                }
            }
        }

        Ok(specs
            .into_iter()
            .enumerate()
            .map(|(i, (mode, key_length))| SweepJob {
                label: format!("{}_{}", mode, key_length),
                mode,
                key_length,
                seed: seed.map(|s| s.wrapping_add(i as u64)),
            })
            .collect())
    }

    /// Runs every planned job in parallel and merges the results in plan
    /// order. The first failing job aborts the sweep.
    pub fn sweep<CB: ProgressCallback + ?Sized>(
        &self,
        ciphertext: &str,
        seed: Option<u64>,
        callback: &CB,
    ) -> CfResult<CandidatePool> {
        self.engine.options().validate()?;
        let jobs = self.plan(seed)?;
        let started = Instant::now();

        info!(
            "🔎 Sweeping {} candidates over key lengths {}..={}",
            jobs.len(),
            self.params.min_key_length,
            self.params.max_key_length
        );

        let run_job = |job: &SweepJob| -> CfResult<ScoredCandidate> {
            let scheme = job.mode.scheme(job.key_length)?;
            self.engine.run(scheme.as_ref(), ciphertext, job.seed, callback)
        };

        let results: Vec<CfResult<ScoredCandidate>> = if self.params.threads > 0 {
            let workers = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.threads)
                .build()
                .map_err(|e| CipherForgeError::config(format!("thread pool: {}", e)))?;
            workers.install(|| jobs.par_iter().map(run_job).collect())
        } else {
            jobs.par_iter().map(run_job).collect()
        };

        let mut pool = CandidatePool::new();
        for (job, result) in jobs.into_iter().zip(results) {
            let candidate = result?;
            debug!(
                "[{}] {} score={:.2} key={} preview={}",
                job.label,
                candidate.strategy,
                candidate.score,
                candidate.mode.format_key(&candidate.key),
                preview(&candidate.text, 60)
            );
            pool.insert(job.label, candidate)?;
        }

        info!(
            "Sweep finished: {} candidates in {:.2?}",
            pool.len(),
            started.elapsed()
        );
        Ok(pool)
    }

    /// Picks the winner: the arbiter's choice when it gives a usable verdict,
    /// otherwise the highest score (earliest label on ties).
    pub fn select(pool: &CandidatePool, arbiter: Option<&dyn Arbiter>) -> CfResult<SweepReport> {
        let (best_label, best) = pool
            .best()
            .ok_or_else(|| CipherForgeError::config("sweep produced no candidates"))?;

        if let Some(arbiter) = arbiter {
            let request = ArbitrationRequest::from_pool(pool);
            let verdict = arbiter
                .arbitrate(&request)
                .and_then(|v| v.validate(pool).map(|_| v));

            match verdict {
                Ok(v) => {
                    if let Some(c) = pool.get(&v.best_label) {
                        info!("Arbiter chose '{}'", v.best_label);
                        return Ok(SweepReport::new(&v.best_label, c, Some(v.suggestion), true));
                    }
                }
                Err(e) => {
                    warn!("⚠️  Arbitration failed ({}). Using best n-gram score.", e);
                }
            }
        }

        Ok(SweepReport::new(best_label, best, None, false))
    }

    pub fn crack<CB: ProgressCallback + ?Sized>(
        &self,
        ciphertext: &str,
        seed: Option<u64>,
        arbiter: Option<&dyn Arbiter>,
        callback: &CB,
    ) -> CfResult<(CandidatePool, SweepReport)> {
        let pool = self.sweep(ciphertext, seed, callback)?;
        let report = Self::select(&pool, arbiter)?;
        Ok((pool, report))
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().nth(max_chars).is_some() {
        out.push('…');
    }
    out
}
