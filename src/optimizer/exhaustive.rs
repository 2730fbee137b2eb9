use crate::cipher::{CipherScheme, Key};
use crate::consts::EXHAUSTIVE_POLL_INTERVAL;
use crate::scorer::LanguageModel;
use itertools::Itertools;

pub struct ExhaustiveOutcome {
    pub key: Key,
    pub text: String,
    pub score: f64,
    pub evaluations: u64,
    pub interrupted: bool,
}

/// Scores every permutation of the key domain in lexicographic order.
///
/// The first key reaching the maximum wins. `should_stop` is polled every
/// [`EXHAUSTIVE_POLL_INTERVAL`] keys with `(evaluations, best_score)`.
pub fn search_exhaustive<F>(
    scheme: &dyn CipherScheme,
    model: &LanguageModel,
    ciphertext: &str,
    mut should_stop: F,
) -> ExhaustiveOutcome
where
    F: FnMut(u64, f64) -> bool,
{
    let k = scheme.key_len();

    // Identity is the first permutation in lexicographic order.
    let key = Key::identity(k);
    let text = scheme.decode(ciphertext, &key);
    let score = model.score(&text);
    let mut best = ExhaustiveOutcome {
        key,
        text,
        score,
        evaluations: 1,
        interrupted: false,
    };

    for perm in (0..k).permutations(k).skip(1) {
        let key = Key::from_permutation(perm);
        let text = scheme.decode(ciphertext, &key);
        let score = model.score(&text);
        best.evaluations += 1;

        if score > best.score {
            best.key = key;
            best.text = text;
            best.score = score;
        }

        if best.evaluations % EXHAUSTIVE_POLL_INTERVAL == 0
            && should_stop(best.evaluations, best.score)
        {
            best.interrupted = true;
            break;
        }
    }

    best
}
