// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcriber adapter that runs an external program once per URL.
//!
//! The program receives the URL and the resolved model through its argument
//! template and prints the transcript on standard output. A non-zero exit
//! fails the job.

pub mod args;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use murmur_config::model::TranscriberConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::{PluginAdapter, ReplyHandle, Transcriber};
use murmur_core::types::{AdapterType, HealthStatus, ReplyFormat, TranscriptionRequest};
use tokio::process::Command;
use tracing::{debug, info};

/// Characters of stderr kept in failure messages.
const STDERR_EXCERPT_CHARS: usize = 500;

/// Runs the configured transcriber program for every URL of a job.
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &TranscriberConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the program for one URL and returns its trimmed standard output.
    ///
    /// The child is killed if the returned future is dropped, so a cancelled
    /// job does not leave a transcription running.
    pub async fn run_one(&self, url: &str, model: &str) -> Result<String, MurmurError> {
        let argv = args::render_args(&self.args, url, model);
        debug!(program = self.program.as_str(), args = ?argv, "spawning transcriber");

        let output = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MurmurError::Transcription {
                message: format!("failed to run {}: {e}", self.program),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = stderr_excerpt(&output.stderr);
            return Err(MurmurError::transcription(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {stderr}", self.program, output.status)
            }));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(MurmurError::transcription(format!(
                "{} produced no transcript for {url}",
                self.program
            )));
        }
        Ok(transcript)
    }
}

#[async_trait]
impl PluginAdapter for CommandTranscriber {
    fn name(&self) -> &str {
        "command"
    }

    fn version(&self) -> semver::Version {
        semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .unwrap_or_else(|_| semver::Version::new(0, 1, 0))
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transcriber
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        match resolve_program(&self.program) {
            Some(_) => Ok(HealthStatus::Healthy),
            None => Ok(HealthStatus::Unhealthy(format!(
                "transcriber program not found: {}",
                self.program
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        Ok(())
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        reply: Arc<dyn ReplyHandle>,
    ) -> Result<(), MurmurError> {
        for url in &request.urls {
            info!(
                job_id = request.job_id.as_str(),
                model = request.model.as_str(),
                url = url.as_str(),
                "transcribing"
            );
            let transcript = self.run_one(url, &request.model).await?;
            reply.reply(&transcript, ReplyFormat::Plain).await?;
        }
        Ok(())
    }
}

/// Locates `program` the way the shell would: paths are checked directly,
/// bare names are searched in `PATH`.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 || path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_EXCERPT_CHARS);
    text.chars().skip(skip).collect()
}
