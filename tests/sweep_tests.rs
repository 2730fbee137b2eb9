mod common;

use cipherforge::cipher::{CipherMode, Key};
use cipherforge::config::{Config, SweepParams};
use cipherforge::error::{CfResult, CipherForgeError};
use cipherforge::optimizer::{NoProgress, ScoredCandidate, SearchEngine, SearchOptions, Strategy};
use cipherforge::sweep::{
    parse_verdict, Arbiter, ArbitrationRequest, CandidateAggregator, CandidatePool,
    CommandArbiter, Verdict,
};
use cipherforge::util::letters_upper;
use rstest::rstest;
use std::time::{Duration, Instant};

fn candidate(mode: CipherMode, len: usize, score: f64, text: &str) -> ScoredCandidate {
    ScoredCandidate {
        mode,
        key: Key::identity(len),
        key_length: len,
        text: text.to_string(),
        score,
        strategy: Strategy::Exhaustive,
        evaluations: 1,
        interrupted: false,
    }
}

fn sample_pool() -> CandidatePool {
    let mut pool = CandidatePool::new();
    pool.insert("columnar_2", candidate(CipherMode::Columnar, 2, -120.0, "HTEQIUKC"))
        .unwrap();
    pool.insert("block_2", candidate(CipherMode::Block, 2, -80.0, "THEQUICK"))
        .unwrap();
    pool.insert("columnar_3", candidate(CipherMode::Columnar, 3, -95.0, "TEHUQKIC"))
        .unwrap();
    pool
}

fn aggregator(params: SweepParams) -> CandidateAggregator {
    CandidateAggregator::new(
        SearchEngine::new(common::corpus_model(3), SearchOptions::default()),
        params,
    )
}

struct FailingArbiter;

impl Arbiter for FailingArbiter {
    fn arbitrate(&self, _request: &ArbitrationRequest) -> CfResult<Verdict> {
        Err(CipherForgeError::arbitration("service offline"))
    }
}

struct FixedArbiter(&'static str);

impl Arbiter for FixedArbiter {
    fn arbitrate(&self, _request: &ArbitrationRequest) -> CfResult<Verdict> {
        parse_verdict(self.0)
    }
}

// --- PLANNING ---

#[test]
fn test_plan_labels_and_seeds() {
    let agg = aggregator(SweepParams {
        min_key_length: 2,
        max_key_length: 3,
        modes: "substitution,columnar,block".to_string(),
        threads: 0,
    });
    let jobs = agg.plan(Some(100)).unwrap();
    let labels: Vec<&str> = jobs.iter().map(|j| j.label.as_str()).collect();

    assert_eq!(
        labels,
        vec!["substitution_26", "columnar_2", "block_2", "columnar_3", "block_3"]
    );
    let seeds: Vec<Option<u64>> = jobs.iter().map(|j| j.seed).collect();
    assert_eq!(seeds, vec![Some(100), Some(101), Some(102), Some(103), Some(104)]);
}

#[rstest]
#[case(1, 4, "columnar")]
#[case(5, 4, "columnar")]
#[case(2, 4, "rot13")]
#[case(2, 4, " , ")]
fn test_plan_rejects_bad_params(#[case] min: usize, #[case] max: usize, #[case] modes: &str) {
    let agg = aggregator(SweepParams {
        min_key_length: min,
        max_key_length: max,
        modes: modes.to_string(),
        threads: 0,
    });
    assert!(agg.plan(None).is_err());
}

// --- SWEEP ---

#[test]
fn test_sweep_finds_columnar_key() {
    let key = Key::new(vec![2, 0, 3, 1]).unwrap();
    let scheme = CipherMode::Columnar.scheme(4).unwrap();
    let cipher = scheme.encode(common::PLAINTEXT, &key);

    let agg = aggregator(SweepParams {
        min_key_length: 2,
        max_key_length: 5,
        modes: "columnar,block".to_string(),
        threads: 2,
    });
    let (pool, report) = agg.crack(&cipher, Some(7), None, &NoProgress).unwrap();

    assert_eq!(pool.len(), 8);
    assert_eq!(
        pool.labels().collect::<Vec<_>>(),
        vec![
            "columnar_2", "block_2", "columnar_3", "block_3", "columnar_4", "block_4",
            "columnar_5", "block_5"
        ]
    );
    assert_eq!(report.best_label, "columnar_4");
    assert_eq!(report.key, key);
    assert_eq!(report.decoded_text, letters_upper(common::PLAINTEXT));
    assert!(!report.arbitrated);
    assert_eq!(report.suggestion, None);
}

#[test]
fn test_sweep_is_reproducible_with_seed() {
    let scheme = CipherMode::Block.scheme(3).unwrap();
    let cipher = scheme.encode(common::PLAINTEXT, &Key::new(vec![1, 2, 0]).unwrap());
    let config = Config {
        sweep: SweepParams {
            min_key_length: 2,
            max_key_length: 3,
            modes: "substitution,block".to_string(),
            threads: 0,
        },
        ..Config::default()
    };
    let mut opts = SearchOptions::from(&config);
    opts.max_iterations = 3_000;

    let agg = CandidateAggregator::new(
        SearchEngine::new(common::corpus_model(3), opts),
        config.sweep.clone(),
    );
    let a = agg.sweep(&cipher, Some(5), &NoProgress).unwrap();
    let b = agg.sweep(&cipher, Some(5), &NoProgress).unwrap();

    assert_eq!(a.len(), 3);
    for ((la, ca), (lb, cb)) in a.iter().zip(b.iter()) {
        assert_eq!(la, lb);
        assert_eq!(ca, cb);
    }
}

#[test]
fn test_sweep_on_empty_ciphertext() {
    let agg = aggregator(SweepParams {
        min_key_length: 2,
        max_key_length: 3,
        modes: "columnar".to_string(),
        threads: 0,
    });
    let pool = agg.sweep("", None, &NoProgress).unwrap();
    assert_eq!(pool.len(), 2);
    assert!(pool.iter().all(|(_, c)| c.strategy == Strategy::Skipped));
}

// --- SELECTION ---

#[test]
fn test_select_highest_score_without_arbiter() {
    let report = CandidateAggregator::select(&sample_pool(), None).unwrap();
    assert_eq!(report.best_label, "block_2");
    assert_eq!(report.score, -80.0);
    assert!(!report.arbitrated);
}

#[test]
fn test_failing_arbiter_falls_back_to_score() {
    let pool = sample_pool();
    let report = CandidateAggregator::select(&pool, Some(&FailingArbiter)).unwrap();
    assert_eq!(report.best_label, "block_2");
    assert_eq!(report.decoded_text, "THEQUICK");
    assert_eq!(report.suggestion, None);
    assert!(!report.arbitrated);
}

#[test]
fn test_arbiter_choice_is_used() {
    let arbiter = FixedArbiter(r#"{"best_label": "columnar_3", "suggestion": "the quick"}"#);
    let report = CandidateAggregator::select(&sample_pool(), Some(&arbiter)).unwrap();
    assert_eq!(report.best_label, "columnar_3");
    assert_eq!(report.decoded_text, "TEHUQKIC");
    assert_eq!(report.suggestion.as_deref(), Some("the quick"));
    assert!(report.arbitrated);
}

#[rstest]
#[case(r#"{"best_label": "block_9", "suggestion": "the quick"}"#)]
#[case(r#"{"best_label": "columnar_3", "suggestion": "THEQUICK"}"#)]
#[case(r#"{"label": "columnar_3"}"#)]
#[case("I think the second one looks best")]
#[case("")]
fn test_unusable_verdicts_fall_back(#[case] reply: &'static str) {
    let report =
        CandidateAggregator::select(&sample_pool(), Some(&FixedArbiter(reply))).unwrap();
    assert_eq!(report.best_label, "block_2");
    assert!(!report.arbitrated);
}

#[test]
fn test_ties_go_to_earliest_label() {
    let mut pool = CandidatePool::new();
    pool.insert("columnar_2", candidate(CipherMode::Columnar, 2, -50.0, "AB"))
        .unwrap();
    pool.insert("block_2", candidate(CipherMode::Block, 2, -50.0, "BA"))
        .unwrap();
    let report = CandidateAggregator::select(&pool, None).unwrap();
    assert_eq!(report.best_label, "columnar_2");
}

#[test]
fn test_empty_pool_is_an_error() {
    assert!(CandidateAggregator::select(&CandidatePool::new(), None).is_err());
}

#[test]
fn test_duplicate_labels_rejected() {
    let mut pool = sample_pool();
    let err = pool
        .insert("block_2", candidate(CipherMode::Block, 2, 0.0, "X"))
        .unwrap_err();
    assert!(matches!(err, CipherForgeError::Config(_)));
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_ranked_order() {
    let pool = sample_pool();
    let labels: Vec<&str> = pool.ranked().into_iter().map(|(l, _)| l).collect();
    assert_eq!(labels, vec!["block_2", "columnar_3", "columnar_2"]);
}

// --- COMMAND ARBITER ---

#[cfg(unix)]
#[test]
fn test_command_arbiter_large_request_does_not_deadlock() {
    // `cat` echoes while reading; 300 KB overflows both pipe buffers.
    let mut pool = CandidatePool::new();
    let text = "A".repeat(300_000);
    pool.insert("block_2", candidate(CipherMode::Block, 2, -1.0, &text))
        .unwrap();
    let request = ArbitrationRequest::from_pool(&pool);
    let arbiter = CommandArbiter::new("cat", vec![]).with_timeout(Duration::from_secs(20));

    let started = Instant::now();
    let err = arbiter.arbitrate(&request).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(15));
    // The echoed request is not a verdict.
    assert!(matches!(err, CipherForgeError::ArbitrationUnavailable(_)));

    let report = CandidateAggregator::select(&pool, Some(&arbiter)).unwrap();
    assert_eq!(report.best_label, "block_2");
    assert!(!report.arbitrated);
}

#[cfg(unix)]
#[test]
fn test_command_arbiter_times_out() {
    let pool = sample_pool();
    let arbiter = CommandArbiter::new("sleep", vec!["30".to_string()])
        .with_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let err = arbiter
        .arbitrate(&ArbitrationRequest::from_pool(&pool))
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(err, CipherForgeError::ArbitrationUnavailable(_)));

    let report = CandidateAggregator::select(&pool, Some(&arbiter)).unwrap();
    assert_eq!(report.best_label, "block_2");
    assert_eq!(report.suggestion, None);
}

#[cfg(unix)]
#[test]
fn test_command_arbiter_reads_verdict() {
    let script = concat!(
        "cat > /dev/null; ",
        r#"echo '{"best_label": "columnar_3", "suggestion": "the quick"}'"#
    );
    let arbiter = CommandArbiter::new("sh", vec!["-c".to_string(), script.to_string()]);
    let report = CandidateAggregator::select(&sample_pool(), Some(&arbiter)).unwrap();
    assert_eq!(report.best_label, "columnar_3");
    assert!(report.arbitrated);
}

#[test]
fn test_command_arbiter_missing_program() {
    let arbiter = CommandArbiter::new("/definitely/not/an/arbiter", vec![]);
    let err = arbiter
        .arbitrate(&ArbitrationRequest::from_pool(&sample_pool()))
        .unwrap_err();
    assert!(matches!(err, CipherForgeError::ArbitrationUnavailable(_)));
}

// --- VERDICT PARSING ---

#[rstest]
#[case(r#"{"best_label": "block_2", "suggestion": "the quick"}"#)]
#[case("```json\n{\"best_label\": \"block_2\", \"suggestion\": \"the quick\"}\n```")]
#[case("```\n{\"best_label\": \"block_2\", \"suggestion\": \"the quick\"}\n```\n")]
#[case("  \n{\"best_label\": \"block_2\", \"suggestion\": \"the quick\"}\n")]
fn test_parse_verdict_formats(#[case] raw: &str) {
    let v = parse_verdict(raw).unwrap();
    assert_eq!(v.best_label, "block_2");
    assert_eq!(v.suggestion, "the quick");
}

#[test]
fn test_request_lists_every_candidate() {
    let request = ArbitrationRequest::from_pool(&sample_pool());
    assert_eq!(request.candidates.len(), 3);
    assert_eq!(request.candidates[1].label, "block_2");
    let prompt = request.prompt();
    assert!(prompt.contains("Label: columnar_3"));
    assert!(prompt.contains("best_label"));
}

// --- EXPORT ---

#[test]
fn test_csv_export() {
    let mut buf = Vec::new();
    sample_pool().write_csv(&mut buf).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("label,mode,key_length,key,score"));
    assert!(lines[2].starts_with("block_2,block,2,\"0,1\",-80"));
}
