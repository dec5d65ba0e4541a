//! Subprocess execution boundary for generated code.
//!
//! Generated source never runs in-process. It is written to a scratch file,
//! executed by the configured interpreter as a child process with captured
//! stdout/stderr, and bounded by a wall-clock limit. The scratch file is
//! removed afterwards whatever the outcome.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::errors::SandboxError;

/// Captured result of one child process run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` when the child was killed by a signal.
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl RunOutput {
    /// Whether the child exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs source files through an interpreter in a child process.
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Interpreter command, e.g. `python3`.
    runtime: String,
    /// Scratch file extension, without the dot.
    extension: String,
    /// Wall-clock limit per run.
    timeout: Duration,
}

impl Sandbox {
    pub fn new(runtime: impl Into<String>, extension: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            extension: extension.into(),
            timeout,
        }
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write `source` to a temporary file and run it.
    ///
    /// The temporary file is deleted when this returns, on success and on
    /// failure alike.
    pub async fn run_source(&self, source: &str, input: &str) -> Result<RunOutput, SandboxError> {
        let suffix = format!(".{}", self.extension);
        let mut scratch = tempfile::Builder::new()
            .prefix("metacrew-run-")
            .suffix(&suffix)
            .tempfile()?;
        scratch.write_all(source.as_bytes())?;
        scratch.flush()?;

        let result = self.run_file(scratch.path(), input).await;
        if let Err(e) = scratch.close() {
            log::warn!("Failed to remove scratch file: {}", e);
        }
        result
    }

    /// Run an existing source file, feeding `input` on stdin.
    pub async fn run_file(&self, path: &Path, input: &str) -> Result<RunOutput, SandboxError> {
        let start = Instant::now();
        log::info!(
            "Sandbox executing: {} {} (limit {:?})",
            self.runtime,
            path.display(),
            self.timeout
        );

        let mut cmd = Command::new(&self.runtime);
        cmd.arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: self.runtime.clone(),
            source,
        })?;

        // Written from its own task so the time limit also covers a child
        // that never drains its stdin.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            tokio::spawn(async move {
                if input.is_empty() {
                    return;
                }
                // A child that never reads stdin closes the pipe early; that
                // is not a failure of the run itself.
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    log::debug!("Child closed stdin early: {}", e);
                }
            })
        });

        let waited = tokio::time::timeout(self.timeout, child.wait_with_output()).await;
        if let Some(writer) = writer {
            writer.abort();
        }
        let output = waited.map_err(|_| {
            log::warn!("Sandbox execution timed out after {:?}", self.timeout);
            SandboxError::Timeout(self.timeout)
        })??;

        let run = RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        log::debug!(
            "Sandbox run finished: exit={:?}, {} bytes stdout, {} bytes stderr",
            run.exit_code,
            run.stdout.len(),
            run.stderr.len()
        );
        Ok(run)
    }
}
