use cipherforge::error::CfResult;
use cipherforge::scorer::LanguageModel;
use cipherforge::util::letter_codes;
use clap::Args;
use std::path::PathBuf;

use super::read_input;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub fn run(args: &ScoreArgs, model: &LanguageModel) -> CfResult<()> {
    let text = read_input(&args.text, &args.file)?;
    let letters = letter_codes(&text).len();
    let score = model.score(&text);

    println!("Model:   {}-gram ({} entries)", model.n(), model.len());
    if let Some((gram, lp)) = model.best_ngram() {
        println!("Top:     {} ({:.3})", gram, lp);
    }
    println!("Letters: {}", letters);
    println!("Score:   {:.3}", score);
    if letters > 0 {
        println!("Per letter: {:.4}", score / letters as f64);
    }
    Ok(())
}
