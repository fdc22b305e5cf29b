//! External collaborators: mesh codecs and the batch processes
//! (simplifier, Blender unfolding) run off the interaction thread.

pub mod jobs;
pub mod mesh_io;
pub mod obj;
pub mod simplify;
pub mod unfold;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;

use mesh_io::MeshIoError;

pub use jobs::{JobQueue, JobResult};
pub use obj::ObjMeshIo;
pub use simplify::{ratio_from_percent, SimplifyRequest, Simplifier};
pub use unfold::{UnfoldReport, UnfoldRequest, Unfolder};

/// Captured result of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} took longer than {secs}s and was terminated")]
    Timeout { program: String, secs: u64 },
    #[error("{program} error:\n{stderr}")]
    ProcessFailed { program: String, stderr: String },
    #[error("{0}")]
    Unfolding(String),
    #[error("simplification ratio {0} is outside (0, 1]")]
    InvalidRatio(f32),
    #[error("page size {width}x{height} must be non-zero")]
    InvalidPage { width: f64, height: f64 },
    #[error("{what} not found at {}", path.display())]
    Missing { what: &'static str, path: PathBuf },
    #[error(transparent)]
    MeshIo(#[from] MeshIoError),
    #[error("external tools are not configured")]
    NotConfigured,
}

/// Runs an external program to completion
pub trait ProcessRunner: Send + Sync {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> impl Future<Output = Result<ProcessOutput, ExternalError>> + Send;
}

/// Production runner on `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ExternalError> {
        let name = program.display().to_string();
        tracing::info!("Running {name} {}", args.join(" "));

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExternalError::Spawn {
                program: name.clone(),
                source,
            })?;

        // dropping the wait future on timeout kills the child
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!("{name} timed out after {}s", timeout.as_secs());
                return Err(ExternalError::Timeout {
                    program: name,
                    secs: timeout.as_secs(),
                });
            }
        };

        let result = ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.stderr.trim().is_empty() {
            tracing::warn!("{name} stderr: {}", result.stderr.trim());
        }
        tracing::debug!("{name} exited with {:?}", result.status);
        Ok(result)
    }
}
