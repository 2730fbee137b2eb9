use cipherforge::cipher::CipherMode;
use cipherforge::error::{CfResult, CipherForgeError};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::read_input;

#[derive(Args, Debug, Clone)]
pub struct EncryptArgs {
    #[arg(short, long)]
    pub mode: CipherMode,

    /// Key as printed by `crack` (letters for substitution, indices otherwise)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Length of the random key when `--key` is absent
    #[arg(short = 'l', long)]
    pub key_length: Option<usize>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub fn run(args: &EncryptArgs) -> CfResult<()> {
    let plaintext = read_input(&args.text, &args.file)?;

    let (scheme, key) = match &args.key {
        Some(raw) => {
            let key = args.mode.parse_key(raw)?;
            let scheme = args.mode.scheme(key.len())?;
            (scheme, key)
        }
        None => {
            let len = args
                .mode
                .fixed_key_length()
                .or(args.key_length)
                .ok_or_else(|| {
                    CipherForgeError::config(format!(
                        "{} needs --key or --key-length",
                        args.mode
                    ))
                })?;
            let scheme = args.mode.scheme(len)?;
            let mut rng = match args.seed {
                Some(s) => fastrand::Rng::with_seed(s),
                None => fastrand::Rng::new(),
            };
            let key = scheme.random_key(&mut rng);
            (scheme, key)
        }
    };
    scheme.validate_key(&key)?;

    info!("🔑 {} key: {}", scheme.label(), args.mode.format_key(&key));
    println!("{}", scheme.encode(&plaintext, &key));
    Ok(())
}
