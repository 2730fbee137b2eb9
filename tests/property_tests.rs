use cipherforge::cipher::{CipherMode, CipherScheme, Key};
use cipherforge::scorer::LanguageModel;
use proptest::prelude::*;

// --- STRATEGIES ---

prop_compose! {
    fn arb_scheme()(
        mode in prop_oneof![
            Just(CipherMode::Substitution),
            Just(CipherMode::Columnar),
            Just(CipherMode::Block),
        ],
        len in 2usize..12
    ) -> (CipherMode, usize) {
        (mode, len)
    }
}

fn build((mode, len): (CipherMode, usize)) -> Box<dyn CipherScheme> {
    mode.scheme(len).unwrap()
}

fn is_permutation(key: &Key) -> bool {
    let mut sorted = key.as_slice().to_vec();
    sorted.sort_unstable();
    sorted.into_iter().eq(0..key.len())
}

proptest! {
    #[test]
    fn prop_neighbor_is_single_transposition(spec in arb_scheme(), seed in any::<u64>()) {
        let scheme = build(spec);
        let mut rng = fastrand::Rng::with_seed(seed);
        let key = scheme.random_key(&mut rng);
        prop_assert!(is_permutation(&key));

        let next = scheme.neighbor_key(&key, &mut rng);
        prop_assert!(is_permutation(&next));

        let diffs = key
            .as_slice()
            .iter()
            .zip(next.as_slice())
            .filter(|(a, b)| a != b)
            .count();
        prop_assert_eq!(diffs, 2);
    }

    #[test]
    fn prop_swap_is_self_inverse(len in 2usize..30, seed in any::<u64>()) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let original = Key::random(len, &mut rng);
        let mut key = original.clone();
        let (i, j) = key.swap_random(&mut rng);
        prop_assert_ne!(i, j);
        key.swap(i, j);
        prop_assert_eq!(key, original);
    }

    #[test]
    fn prop_decode_inverts_encode(
        spec in arb_scheme(),
        text in "[A-Z]{0,80}",
        seed in any::<u64>()
    ) {
        let scheme = build(spec);
        let mut rng = fastrand::Rng::with_seed(seed);
        let key = scheme.random_key(&mut rng);
        let cipher = scheme.encode(&text, &key);
        prop_assert_eq!(cipher.len(), text.len());
        prop_assert_eq!(scheme.decode(&cipher, &key), text);
    }

    #[test]
    fn prop_substitution_keeps_non_letters(text in "[a-zA-Z0-9 ,.!?]{0,60}", seed in any::<u64>()) {
        let scheme = CipherMode::Substitution.scheme(26).unwrap();
        let mut rng = fastrand::Rng::with_seed(seed);
        let key = scheme.random_key(&mut rng);
        let cipher = scheme.encode(&text, &key);
        for (a, b) in text.chars().zip(cipher.chars()) {
            prop_assert_eq!(a.is_ascii_alphabetic(), b.is_ascii_alphabetic());
            prop_assert_eq!(a.is_ascii_lowercase(), b.is_ascii_lowercase());
            if !a.is_ascii_alphabetic() {
                prop_assert_eq!(a, b);
            }
        }
        prop_assert_eq!(scheme.decode(&cipher, &key), text);
    }

    #[test]
    fn prop_score_ignores_case_and_noise(text in "[a-z ]{0,60}") {
        let model = LanguageModel::english_letters();
        let upper = text.to_ascii_uppercase().replace(' ', "");
        prop_assert_eq!(model.score(&text), model.score(&upper));
    }
}
