//! Mesh simplification through an external batch process

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shared::SimplifyMethod;

use super::{ExternalError, ProcessOutput, ProcessRunner};
use crate::state::settings::AppSettings;

/// Convert the settings percentage into the ratio the process expects
pub fn ratio_from_percent(percent: f32) -> f32 {
    percent.clamp(10.0, 100.0) / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub method: SimplifyMethod,
    /// Fraction of the input to keep, in (0, 1]
    pub ratio: f32,
}

pub struct Simplifier<R> {
    runner: Arc<R>,
    program: PathBuf,
    timeout: Duration,
}

impl<R: ProcessRunner> Simplifier<R> {
    pub fn new(runner: Arc<R>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    pub fn from_settings(runner: Arc<R>, settings: &AppSettings) -> Self {
        Self::new(
            runner,
            settings.external.simplifier_path.clone(),
            Duration::from_secs(settings.external.timeout_secs),
        )
    }

    /// `<input> <output> <method> <ratio>`
    pub fn args(request: &SimplifyRequest) -> Vec<String> {
        vec![
            request.input.display().to_string(),
            request.output.display().to_string(),
            request.method.as_str().to_string(),
            request.ratio.to_string(),
        ]
    }

    /// Run the simplifier; a non-zero exit carries stderr back verbatim.
    pub async fn simplify(&self, request: &SimplifyRequest) -> Result<ProcessOutput, ExternalError> {
        if !(request.ratio > 0.0 && request.ratio <= 1.0) {
            return Err(ExternalError::InvalidRatio(request.ratio));
        }
        tracing::info!(
            "{} of {} (ratio {})",
            request.method.display_name(),
            request.input.display(),
            request.ratio
        );

        let output = self
            .runner
            .run(&self.program, &Self::args(request), self.timeout)
            .await?;
        if !output.success() {
            return Err(ExternalError::ProcessFailed {
                program: self.program.display().to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
