//! Optional second opinion on which candidate reads as natural language.
//!
//! The arbiter is an outside collaborator (typically a language model behind
//! some command). Anything it gets wrong is reported as
//! [`CipherForgeError::ArbitrationUnavailable`] and the caller falls back to
//! the score ranking.

use super::pool::CandidatePool;
use crate::cipher::CipherMode;
use crate::consts::{ARBITER_POLL_MS, ARBITER_TIMEOUT_SECS};
use crate::error::{CfResult, CipherForgeError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const INSTRUCTIONS: &str = "We are breaking a classical cipher. Below are several candidate \
decryptions, each with a label, a cipher mode, a key length and the decrypted text. \
1) Decide which candidate label has the most plausible English plaintext. \
2) Provide a cleaned-up suggestion of that plaintext in natural English, with normal spaces \
between words and proper punctuation. Respond ONLY with JSON of the form \
{\"best_label\": \"<label>\", \"suggestion\": \"<plaintext>\"}.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSummary {
    pub label: String,
    pub mode: CipherMode,
    pub key_length: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArbitrationRequest {
    pub instructions: String,
    pub candidates: Vec<CandidateSummary>,
}

impl ArbitrationRequest {
    pub fn from_pool(pool: &CandidatePool) -> Self {
        Self {
            instructions: INSTRUCTIONS.to_string(),
            candidates: pool
                .iter()
                .map(|(label, c)| CandidateSummary {
                    label: label.to_string(),
                    mode: c.mode,
                    key_length: c.key_length,
                    text: c.text.clone(),
                })
                .collect(),
        }
    }

    /// Plain-text rendering for arbiters that take a prompt rather than JSON.
    pub fn prompt(&self) -> String {
        let mut out = format!("{}\n\nCandidates:\n\n", self.instructions);
        for c in &self.candidates {
            out.push_str(&format!(
                "Label: {}\nMode: {}\nKey length: {}\nDecrypted text: {}\n\n",
                c.label, c.mode, c.key_length, c.text
            ));
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub best_label: String,
    pub suggestion: String,
}

impl Verdict {
    /// The label must exist in the pool and the suggestion must be split into
    /// words.
    pub fn validate(&self, pool: &CandidatePool) -> CfResult<()> {
        if !pool.contains(&self.best_label) {
            return Err(CipherForgeError::arbitration(format!(
                "arbiter chose unknown label '{}'",
                self.best_label
            )));
        }
        if self.suggestion.split_whitespace().nth(1).is_none() {
            return Err(CipherForgeError::arbitration(
                "arbiter suggestion has no word boundaries",
            ));
        }
        Ok(())
    }
}

pub trait Arbiter: Send + Sync {
    fn arbitrate(&self, request: &ArbitrationRequest) -> CfResult<Verdict>;
}

/// Parses an arbiter reply: a JSON verdict, optionally inside a Markdown code
/// fence.
pub fn parse_verdict(raw: &str) -> CfResult<Verdict> {
    let trimmed = raw.trim();
    let body = if trimmed.starts_with("```") {
        let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
        if lines
            .last()
            .is_some_and(|l| l.trim_start().starts_with("```"))
        {
            lines.pop();
        }
        lines.join("\n")
    } else {
        trimmed.to_string()
    };

    if body.trim().is_empty() {
        return Err(CipherForgeError::arbitration("empty arbiter response"));
    }

    serde_json::from_str(body.trim())
        .map_err(|e| CipherForgeError::arbitration(format!("malformed verdict: {}", e)))
}

/// Runs an external program as the arbiter: the request JSON goes to its
/// stdin and its stdout is parsed with [`parse_verdict`].
///
/// Pipes are serviced on helper threads so a child that answers before it has
/// read its whole input cannot deadlock. A child still running at the
/// deadline is killed.
#[derive(Debug, Clone)]
pub struct CommandArbiter {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandArbiter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(ARBITER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Reads a pipe to EOF on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("arbiter pipe read failed: {}", e);
        }
        let _ = tx.send(buf);
    });
    rx
}

impl Arbiter for CommandArbiter {
    fn arbitrate(&self, request: &ArbitrationRequest) -> CfResult<Verdict> {
        let unavailable = |what: &str, e: std::io::Error| {
            CipherForgeError::arbitration(format!("{} '{}': {}", what, self.program, e))
        };

        let payload = serde_json::to_vec(request)?;
        debug!(
            "Running arbiter '{}' with {} candidates ({} bytes, timeout {:?})",
            self.program,
            request.candidates.len(),
            payload.len(),
            self.timeout
        );

        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| unavailable("could not start", e))?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // Detached: a child that stops reading early just closes the pipe.
        if let Some(mut stdin) = child.stdin.take() {
            thread::spawn(move || {
                if let Err(e) = stdin.write_all(&payload) {
                    debug!("arbiter closed its input early: {}", e);
                }
            });
        }

        let poll = Duration::from_millis(ARBITER_POLL_MS);
        let status = loop {
            match child
                .try_wait()
                .map_err(|e| unavailable("could not wait for", e))?
            {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CipherForgeError::arbitration(format!(
                        "'{}' gave no answer within {:?}",
                        self.program, self.timeout
                    )));
                }
                None => thread::sleep(poll),
            }
        };

        // Output may lag the exit slightly; a grandchild holding the pipe
        // open must not stall us past the deadline plus a short grace.
        let collect = |rx: Option<Receiver<Vec<u8>>>| -> CfResult<Vec<u8>> {
            let Some(rx) = rx else {
                return Ok(Vec::new());
            };
            let wait = deadline
                .saturating_duration_since(Instant::now())
                .max(poll * 10);
            rx.recv_timeout(wait).map_err(|_| {
                CipherForgeError::arbitration(format!(
                    "'{}' kept its output open past the deadline",
                    self.program
                ))
            })
        };
        let out = collect(stdout)?;

        if !status.success() {
            let err = collect(stderr).unwrap_or_default();
            return Err(CipherForgeError::arbitration(format!(
                "'{}' exited with {}: {}",
                self.program,
                status,
                String::from_utf8_lossy(&err).trim()
            )));
        }

        parse_verdict(&String::from_utf8_lossy(&out))
    }
}
