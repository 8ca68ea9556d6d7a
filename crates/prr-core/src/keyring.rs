//! Keyring import through the external key-management executable

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{Error, KeyBundle, Result};

/// Non-interactive batch import.
pub const IMPORT_ARGS: [&str; 4] = ["--no-tty", "--batch", "--quiet", "--import"];

/// What the key-management process reported for a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Imports a key bundle into the local keyring.
#[async_trait]
pub trait Import: Send + Sync {
    async fn import(&self, bundle: &KeyBundle) -> Result<ImportReport>;
}

/// Runs `gpg --no-tty --batch --quiet --import` with the bundle on stdin.
///
/// A non-zero exit becomes [`Error::ProcessFailed`] carrying the exit code
/// and captured stderr. The child is killed if the import future is dropped.
#[derive(Debug, Clone)]
pub struct GpgImporter {
    program: PathBuf,
}

impl GpgImporter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Import for GpgImporter {
    async fn import(&self, bundle: &KeyBundle) -> Result<ImportReport> {
        debug!(program = %self.program.display(), bytes = bundle.len(), "Spawning key import");

        let mut child = Command::new(&self.program)
            .args(IMPORT_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::ProcessSpawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| Error::ProcessSpawn {
            program: self.program.clone(),
            source: std::io::Error::other("stdin was not captured"),
        })?;

        // stdin is fed while stdout/stderr drain.
        let feed = async move {
            let written = stdin.write_all(bundle.as_bytes()).await;
            drop(stdin);
            written
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|source| Error::ProcessSpawn {
            program: self.program.clone(),
            source,
        })?;
        let report = ImportReport {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(Error::ProcessFailed {
                program: self.program.clone(),
                exit_code: report.exit_code,
                message: failure_message(&report),
            });
        }

        // A child that exits successfully without reading all of stdin is
        // accepted; anything else while writing is a failure.
        if let Err(source) = fed
            && source.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(Error::ProcessSpawn {
                program: self.program.clone(),
                source,
            });
        }

        if !report.stderr.trim().is_empty() {
            debug!(stderr = %report.stderr.trim(), "Key import diagnostics");
        }
        info!(program = %self.program.display(), "Imported key bundle");
        Ok(report)
    }
}

fn failure_message(report: &ImportReport) -> String {
    let status = match report.exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    };
    let stderr = report.stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}
