use super::anneal::Annealer;
use super::exhaustive::search_exhaustive;
use crate::cipher::{CipherMode, CipherScheme, Key};
use crate::config::Config;
use crate::consts::{EMPTY_TEXT_SCORE, EXHAUSTIVE_KEY_SPACE_LIMIT};
use crate::error::{CfResult, CipherForgeError};
use crate::scorer::LanguageModel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum_macros::Display;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub temp_start: f64,
    pub temp_min: f64,
    pub cooling_rate: f64,
    pub steps_per_temp: usize,
    pub max_iterations: usize,
    pub restarts: usize,
    /// Key spaces up to this size are enumerated instead of annealed.
    pub exhaustive_limit: u128,
    pub max_time: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            temp_start: 15.0,
            temp_min: 2.0,
            cooling_rate: 0.97,
            steps_per_temp: 500,
            max_iterations: 100_000,
            restarts: 1,
            exhaustive_limit: EXHAUSTIVE_KEY_SPACE_LIMIT as u128,
            max_time: None,
        }
    }
}

impl From<&Config> for SearchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            temp_start: cfg.search.temp_start,
            temp_min: cfg.search.temp_min,
            cooling_rate: cfg.search.cooling_rate,
            steps_per_temp: cfg.search.steps_per_temp,
            max_iterations: cfg.search.max_iterations,
            restarts: cfg.search.restarts,
            exhaustive_limit: cfg.search.exhaustive_limit as u128,
            max_time: None,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> CfResult<()> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(CipherForgeError::config(format!(
                "cooling rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !(self.temp_min > 0.0 && self.temp_start > self.temp_min) {
            return Err(CipherForgeError::config(format!(
                "temperatures must satisfy 0 < temp_min < temp_start, got {} and {}",
                self.temp_min, self.temp_start
            )));
        }
        if self.steps_per_temp == 0 || self.max_iterations == 0 || self.restarts == 0 {
            return Err(CipherForgeError::config(
                "steps per temperature, iteration budget and restarts must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Exhaustive,
    Annealing,
    /// Nothing to search: the ciphertext has no letters.
    Skipped,
}

/// Best key found by one search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub mode: CipherMode,
    pub key: Key,
    pub key_length: usize,
    pub text: String,
    pub score: f64,
    pub strategy: Strategy,
    pub evaluations: u64,
    /// Stopped early by cancellation or the time limit.
    pub interrupted: bool,
}

/// Polled between batches of work.
/// Returning `false` stops the search, which then reports its best so far.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, evaluations: u64, best_score: f64) -> bool;
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _evaluations: u64, _best_score: f64) -> bool {
        true
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for CancelToken {
    fn on_progress(&self, _evaluations: u64, _best_score: f64) -> bool {
        !self.is_cancelled()
    }
}

/// Finds the highest-scoring key of a scheme for one ciphertext.
pub struct SearchEngine {
    model: Arc<LanguageModel>,
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(model: Arc<LanguageModel>, options: SearchOptions) -> Self {
        Self { model, options }
    }

    pub fn model(&self) -> &Arc<LanguageModel> {
        &self.model
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn strategy_for(&self, scheme: &dyn CipherScheme) -> Strategy {
        if scheme.key_space_size() <= self.options.exhaustive_limit {
            Strategy::Exhaustive
        } else {
            Strategy::Annealing
        }
    }

    pub fn run<CB: ProgressCallback + ?Sized>(
        &self,
        scheme: &dyn CipherScheme,
        ciphertext: &str,
        seed: Option<u64>,
        callback: &CB,
    ) -> CfResult<ScoredCandidate> {
        self.options.validate()?;

        let key_length = scheme.key_len();
        if key_length < 2 {
            return Err(CipherForgeError::config(format!(
                "key length must be at least 2 for a swap-based search, got {}",
                key_length
            )));
        }

        let mode = scheme.mode();

        if !ciphertext.bytes().any(|b| b.is_ascii_alphabetic()) {
            debug!("{}: ciphertext has no letters, skipping search", scheme.label());
            let key = Key::identity(key_length);
            let text = scheme.decode(ciphertext, &key);
            return Ok(ScoredCandidate {
                mode,
                key,
                key_length,
                text,
                score: EMPTY_TEXT_SCORE,
                strategy: Strategy::Skipped,
                evaluations: 0,
                interrupted: false,
            });
        }

        let started = Instant::now();
        let strategy = self.strategy_for(scheme);
        debug!(
            "{}: {} over {} keys",
            scheme.label(),
            strategy,
            scheme.key_space_size()
        );

        let (key, text, score, evaluations, interrupted) = match strategy {
            Strategy::Exhaustive => {
                let out = search_exhaustive(scheme, &self.model, ciphertext, |e, s| {
                    self.should_stop(callback, e, s, started)
                });
                (out.key, out.text, out.score, out.evaluations, out.interrupted)
            }
            _ => self.anneal(scheme, ciphertext, seed, callback, started),
        };

        debug!(
            "{}: best {:.2} after {} evaluations in {:.2?}{}",
            scheme.label(),
            score,
            evaluations,
            started.elapsed(),
            if interrupted { " (interrupted)" } else { "" }
        );

        Ok(ScoredCandidate {
            mode,
            key,
            key_length,
            text,
            score,
            strategy,
            evaluations,
            interrupted,
        })
    }

    fn anneal<CB: ProgressCallback + ?Sized>(
        &self,
        scheme: &dyn CipherScheme,
        ciphertext: &str,
        seed: Option<u64>,
        callback: &CB,
        started: Instant,
    ) -> (Key, String, f64, u64, bool) {
        let opts = &self.options;
        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };

        let mut annealer = Annealer::new(scheme, &self.model, ciphertext, opts.temp_start, rng);
        let mut interrupted = false;

        'restarts: for attempt in 0..opts.restarts {
            if attempt > 0 {
                annealer.restart(opts.temp_start);
            }

            // Temperature ladder: a batch of proposals per rung, then cool.
            let mut iterations = 0;
            while annealer.temperature > opts.temp_min && iterations < opts.max_iterations {
                let batch = opts.steps_per_temp.min(opts.max_iterations - iterations);
                annealer.evolve(batch);
                iterations += batch;
                annealer.cool(opts.cooling_rate);

                if self.should_stop(callback, annealer.evaluations, annealer.best_score, started)
                {
                    interrupted = true;
                    break 'restarts;
                }
            }

            debug!(
                "{}: attempt #{} ended at T={:.3}, current {:.2}, best {:.2}",
                scheme.label(),
                attempt + 1,
                annealer.temperature,
                annealer.score,
                annealer.best_score
            );
        }

        let (key, text, score, evaluations) = annealer.into_best();
        (key, text, score, evaluations, interrupted)
    }

    fn should_stop<CB: ProgressCallback + ?Sized>(
        &self,
        callback: &CB,
        evaluations: u64,
        best_score: f64,
        started: Instant,
    ) -> bool {
        if let Some(limit) = self.options.max_time {
            if started.elapsed() >= limit {
                return true;
            }
        }
        !callback.on_progress(evaluations, best_score)
    }
}
