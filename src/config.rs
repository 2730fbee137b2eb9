use crate::cipher::CipherMode;
use crate::consts::EXHAUSTIVE_KEY_SPACE_LIMIT;
use crate::error::{CfResult, CipherForgeError};
use clap::{parser::ValueSource, ArgMatches, Args};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub sweep: SweepParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 15.0)]
    pub temp_start: f64,
    #[arg(long, default_value_t = 2.0)]
    pub temp_min: f64,
    #[arg(long, default_value_t = 0.97)]
    pub cooling_rate: f64,
    #[arg(long, default_value_t = 500)]
    pub steps_per_temp: usize,
    #[arg(long, default_value_t = 100_000)]
    pub max_iterations: usize,
    #[arg(long, default_value_t = 1)]
    pub restarts: usize,

    // 8! by default; bigger key spaces are annealed
    #[arg(long, default_value_t = EXHAUSTIVE_KEY_SPACE_LIMIT)]
    pub exhaustive_limit: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            temp_start: 15.0,
            temp_min: 2.0,
            cooling_rate: 0.97,
            steps_per_temp: 500,
            max_iterations: 100_000,
            restarts: 1,
            exhaustive_limit: EXHAUSTIVE_KEY_SPACE_LIMIT,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    #[arg(long, default_value_t = 2)]
    pub min_key_length: usize,
    #[arg(long, default_value_t = 10)]
    pub max_key_length: usize,

    /// Comma separated: substitution, columnar, block
    #[arg(long, default_value = "columnar,block")]
    pub modes: String,

    /// Worker threads for the sweep (0 = one per core)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            min_key_length: 2,
            max_key_length: 10,
            modes: "columnar,block".to_string(),
            threads: 0,
        }
    }
}

impl SweepParams {
    /// Parsed `modes` in the order given, without duplicates.
    pub fn get_modes(&self) -> CfResult<Vec<CipherMode>> {
        let mut modes = Vec::new();
        for part in self.modes.split(',') {
            let name = part.trim();
            if name.is_empty() {
                continue;
            }
            let mode = CipherMode::from_str(name).map_err(|_| {
                CipherForgeError::config(format!(
                    "unknown cipher mode '{}' (expected one of: {})",
                    name,
                    CipherMode::iter().join(", ")
                ))
            })?;
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
        if modes.is_empty() {
            return Err(CipherForgeError::config("no cipher modes selected"));
        }
        Ok(modes)
    }

    pub fn validate(&self) -> CfResult<()> {
        if self.min_key_length < 2 {
            return Err(CipherForgeError::config(format!(
                "minimum key length must be at least 2, got {}",
                self.min_key_length
            )));
        }
        if self.max_key_length < self.min_key_length {
            return Err(CipherForgeError::config(format!(
                "key length range {}..={} is empty",
                self.min_key_length, self.max_key_length
            )));
        }
        self.get_modes().map(|_| ())
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CipherForgeError::NotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies onto `self` only the values the user typed on the command line,
    /// so file settings survive clap defaults.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.temp_start);
        update_if_present!(search.temp_min);
        update_if_present!(search.cooling_rate);
        update_if_present!(search.steps_per_temp);
        update_if_present!(search.max_iterations);
        update_if_present!(search.restarts);
        update_if_present!(search.exhaustive_limit);

        update_if_present!(sweep.min_key_length);
        update_if_present!(sweep.max_key_length);
        update_if_present!(sweep.modes);
        update_if_present!(sweep.threads);
    }
}
