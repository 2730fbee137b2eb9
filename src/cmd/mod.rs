pub mod crack;
pub mod encrypt;
pub mod score;

use cipherforge::error::{CfResult, CipherForgeError};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Text from `--text`, then `--file`, then stdin.
pub fn read_input(text: &Option<String>, file: &Option<PathBuf>) -> CfResult<String> {
    if let Some(t) = text {
        return Ok(t.clone());
    }
    if let Some(path) = file {
        return fs::read_to_string(path).map_err(|e| CipherForgeError::NotFound {
            path: path.clone(),
            reason: e.to_string(),
        });
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
