use crate::cipher::{CipherScheme, Key};
use crate::scorer::LanguageModel;
use fastrand::Rng;

/// One simulated-annealing walker over the key space of a scheme.
///
/// `key`/`score` wander; `best_*` only ever improves.
pub struct Annealer<'a> {
    scheme: &'a dyn CipherScheme,
    model: &'a LanguageModel,
    ciphertext: &'a str,

    pub key: Key,
    pub score: f64,
    pub temperature: f64,

    pub best_key: Key,
    pub best_score: f64,
    pub best_text: String,

    pub evaluations: u64,
    rng: Rng,
}

impl<'a> Annealer<'a> {
    pub fn new(
        scheme: &'a dyn CipherScheme,
        model: &'a LanguageModel,
        ciphertext: &'a str,
        temperature: f64,
        mut rng: Rng,
    ) -> Self {
        let key = scheme.random_key(&mut rng);
        let text = scheme.decode(ciphertext, &key);
        let score = model.score(&text);

        Self {
            scheme,
            model,
            ciphertext,
            best_key: key.clone(),
            best_score: score,
            best_text: text,
            key,
            score,
            temperature,
            evaluations: 1,
            rng,
        }
    }

    /// Jumps to a fresh random key at `temperature`. The best so far is kept.
    pub fn restart(&mut self, temperature: f64) {
        self.key = self.scheme.random_key(&mut self.rng);
        let text = self.scheme.decode(self.ciphertext, &self.key);
        self.score = self.model.score(&text);
        self.evaluations += 1;
        self.temperature = temperature;
        self.record(text);
    }

    pub fn cool(&mut self, rate: f64) {
        self.temperature *= rate;
    }

    #[inline(always)]
    fn record(&mut self, text: String) {
        if self.score > self.best_score {
            self.best_score = self.score;
            self.best_key = self.key.clone();
            self.best_text = text;
        }
    }

    /// Metropolis criterion. `exp` underflows to 0 for large negative deltas.
    #[inline(always)]
    fn accept(&mut self, delta: f64) -> bool {
        if delta > 0.0 {
            return true;
        }
        if self.temperature <= 0.0 {
            return false;
        }
        self.rng.f64() < (delta / self.temperature).exp()
    }

    /// Runs `steps` propose/evaluate/commit-or-revert moves at the current
    /// temperature. Returns how many were accepted.
    pub fn evolve(&mut self, steps: usize) -> usize {
        let mut accepted = 0;

        for _ in 0..steps {
            let (i, j) = self.key.swap_random(&mut self.rng);
            let text = self.scheme.decode(self.ciphertext, &self.key);
            let score = self.model.score(&text);
            self.evaluations += 1;

            if self.accept(score - self.score) {
                self.score = score;
                self.record(text);
                accepted += 1;
            } else {
                // Same pair undoes the proposal exactly.
                self.key.swap(i, j);
            }
        }
        accepted
    }

    pub fn into_best(self) -> (Key, String, f64, u64) {
        (
            self.best_key,
            self.best_text,
            self.best_score,
            self.evaluations,
        )
    }
}
