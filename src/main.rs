use cipherforge::error::{CfResult, CipherForgeError};
use cipherforge::scorer::LanguageModel;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classical cipher cracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// N-gram frequency table (`GRAM COUNT` per line)
    #[arg(global = true, short, long)]
    ngrams: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = cipherforge::consts::DEFAULT_NGRAM_SIZE)]
    ngram_size: usize,

    /// JSON file with search and sweep settings; CLI flags override it
    #[arg(global = true, long = "config")]
    config_file: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sweep cipher modes and key lengths to recover the plaintext
    Crack(cmd::crack::CrackArgs),
    /// Encrypt text under a given or random key
    Encrypt(cmd::encrypt::EncryptArgs),
    /// Score text against the language model
    Score(cmd::score::ScoreArgs),
}

fn load_model(cli: &Cli) -> CfResult<Arc<LanguageModel>> {
    match &cli.ngrams {
        Some(path) => {
            info!("📂 Loading n-grams: {}", path.display());
            Ok(Arc::new(LanguageModel::load_with_fallback(
                path,
                cli.ngram_size,
            )?))
        }
        None => {
            warn!("⚠️  No n-gram table given. Scoring with English letter frequencies only.");
            Ok(Arc::new(LanguageModel::english_letters()))
        }
    }
}

fn execute(cli: Cli, matches: &clap::ArgMatches) -> CfResult<()> {
    match &cli.command {
        Commands::Crack(args) => {
            let mut config = match &cli.config_file {
                Some(path) => {
                    info!("⚖️  Loading config from: {}", path.display());
                    cipherforge::config::Config::load_from_file(path)?
                }
                None => args.config.clone(),
            };
            if cli.config_file.is_some() {
                let sub_matches = matches
                    .subcommand_matches("crack")
                    .ok_or_else(|| CipherForgeError::config("missing crack arguments"))?;
                config.merge_from_cli(&args.config, sub_matches);
            }
            let model = load_model(&cli)?;
            cmd::crack::run(args, config, model)
        }
        Commands::Encrypt(args) => cmd::encrypt::run(args),
        Commands::Score(args) => {
            let model = load_model(&cli)?;
            cmd::score::run(args, &model)
        }
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(cli, &matches) {
        error!("❌ {}", e);
        process::exit(1);
    }
}
