use crate::reports;
use cipherforge::cipher::CipherMode;
use cipherforge::config::Config;
use cipherforge::consts::ARBITER_TIMEOUT_SECS;
use cipherforge::error::{CfResult, CipherForgeError};
use cipherforge::optimizer::{SearchEngine, SearchOptions};
use cipherforge::scorer::LanguageModel;
use cipherforge::sweep::{Arbiter, CandidateAggregator, CommandArbiter};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::read_input;

#[derive(Args, Debug, Clone)]
pub struct CrackArgs {
    #[command(flatten)]
    pub config: Config,

    /// Ciphertext to crack (default: stdin)
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Per-candidate time limit in seconds
    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    /// Candidate rows to show in the summary table
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Print the final report as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write every candidate to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// External command that picks the most readable candidate
    #[arg(long)]
    pub arbiter: Option<String>,

    #[arg(long = "arbiter-arg", allow_hyphen_values = true)]
    pub arbiter_args: Vec<String>,

    /// Seconds the arbiter may take before falling back to the best score
    #[arg(long, default_value_t = ARBITER_TIMEOUT_SECS)]
    pub arbiter_timeout: u64,
}

pub fn run(args: &CrackArgs, config: Config, model: Arc<LanguageModel>) -> CfResult<()> {
    let ciphertext = read_input(&args.text, &args.file)?;
    if ciphertext.trim().is_empty() {
        return Err(CipherForgeError::config("no ciphertext given"));
    }

    let mut options = SearchOptions::from(&config);
    options.max_time = args.time.map(Duration::from_secs);

    let aggregator = CandidateAggregator::new(SearchEngine::new(model, options), config.sweep);
    let arbiter = args.arbiter.as_ref().map(|program| {
        CommandArbiter::new(program.clone(), args.arbiter_args.clone())
            .with_timeout(Duration::from_secs(args.arbiter_timeout))
    });

    let (pool, report) = aggregator.crack(
        &ciphertext,
        args.seed,
        arbiter.as_ref().map(|a| a as &dyn Arbiter),
        &cipherforge::optimizer::NoProgress,
    )?;

    if let Some(path) = &args.export {
        let file = File::create(path)?;
        pool.write_csv(BufWriter::new(file))?;
        info!("💾 Wrote {} candidates to {}", pool.len(), path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    reports::print_candidate_table(&pool, args.top);
    reports::print_final_report(&report);
    if report.mode == CipherMode::Substitution {
        reports::print_substitution_key(&report.key);
    }
    Ok(())
}
