//! Concrete usage data sources
//!
//! [`CcusageCommand`] runs the usage tool (`ccusage blocks --json` by
//! default) and parses its stdout. [`JsonFileSource`] reads the same
//! payload from a file, which is handy for replaying a captured snapshot.

use async_trait::async_trait;
use ccmonitor_core::error::{CcmonitorError, Result};
use ccmonitor_core::provider::UsageDataSource;
use ccmonitor_core::types::Snapshot;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// How long the usage tool may run before the tick is abandoned
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Snapshot source backed by an external command
#[derive(Debug, Clone)]
pub struct CcusageCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CcusageCommand {
    /// `<program> blocks --json`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["blocks".to_string(), "--json".to_string()],
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Replace the default arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl UsageDataSource for CcusageCommand {
    async fn fetch(&self) -> Result<Snapshot> {
        let output = timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| CcmonitorError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(CcmonitorError::CommandFailed {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let snapshot = Snapshot::from_json(&stdout)?;
        debug!(
            "Fetched {} blocks from '{}'",
            snapshot.blocks.len(),
            self.command_line()
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("command '{}'", self.command_line())
    }
}

/// Snapshot source that re-reads a JSON file every tick
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl UsageDataSource for JsonFileSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Snapshot::from_json(&raw)
    }

    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }
}
