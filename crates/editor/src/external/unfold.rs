//! Papercraft unfolding through Blender running a Python script

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use shared::{ExportFormat, PageSize};

use super::{ExternalError, ProcessOutput, ProcessRunner};
use crate::state::settings::AppSettings;

const TRANSIENT_ERRORS: [&str; 2] = [
    "ZeroDivisionError: float division by zero",
    "RuntimeError: Invalid Input Error: An island is too big to fit onto page",
];

const TRACEBACK_ERROR: &str = "RuntimeError: Error: Python: Traceback (most recent call last)";

/// Why an unfolding attempt did not produce output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfoldFailure {
    /// Pieces did not fit the page; retry on a larger one
    Transient,
    Fatal(String),
}

/// Classify one Blender run. `None` means the attempt succeeded.
pub fn classify(output: &ProcessOutput) -> Option<UnfoldFailure> {
    let stderr = output.stderr.as_str();
    if TRANSIENT_ERRORS.iter().any(|e| stderr.contains(e)) {
        return Some(UnfoldFailure::Transient);
    }
    if stderr.contains(TRACEBACK_ERROR) {
        return Some(UnfoldFailure::Fatal(
            "Model was too complex to perform unfolding.".to_string(),
        ));
    }
    if let Some(message) = runtime_error(stderr) {
        return Some(UnfoldFailure::Fatal(message));
    }
    if !output.success() {
        return Some(UnfoldFailure::Fatal(output.stderr.clone()));
    }
    None
}

/// Text after the first `RuntimeError:` up to the end of its line
fn runtime_error(stderr: &str) -> Option<String> {
    let (_, rest) = stderr.split_once("RuntimeError:")?;
    let message = rest.lines().next().unwrap_or_default().trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnfoldRequest {
    pub input_model: PathBuf,
    pub output_dir: PathBuf,
    /// Output file stem
    pub file_name: String,
    pub page: PageSize,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnfoldReport {
    /// Page size the successful attempt used
    pub page: PageSize,
    pub attempts: u32,
}

pub struct Unfolder<R> {
    runner: Arc<R>,
    blender: PathBuf,
    script: PathBuf,
    timeout: Duration,
    max_attempts: u32,
}

impl<R: ProcessRunner> Unfolder<R> {
    pub fn new(
        runner: Arc<R>,
        blender: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            runner,
            blender: blender.into(),
            script: script.into(),
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_settings(runner: Arc<R>, settings: &AppSettings) -> Self {
        Self::new(
            runner,
            settings.external.blender_path.clone(),
            settings.external.unfold_script_path.clone(),
            Duration::from_secs(settings.external.timeout_secs),
            settings.unfolding.max_attempts,
        )
    }

    pub fn args(&self, request: &UnfoldRequest, page: PageSize) -> Vec<String> {
        vec![
            "-b".into(),
            "-P".into(),
            self.script.display().to_string(),
            "--".into(),
            "--input_model".into(),
            request.input_model.display().to_string(),
            "--output_model".into(),
            request.output_dir.display().to_string(),
            "--fn".into(),
            request.file_name.clone(),
            "--dw".into(),
            page.width.to_string(),
            "--dh".into(),
            page.height.to_string(),
            "--ext".into(),
            request.format.as_str().to_string(),
        ]
    }

    /// Run Blender, enlarging the page by one unit per side after every
    /// transient failure, up to the attempt limit.
    pub async fn unfold(&self, request: &UnfoldRequest) -> Result<UnfoldReport, ExternalError> {
        if !request.page.is_valid() {
            return Err(ExternalError::InvalidPage {
                width: request.page.width,
                height: request.page.height,
            });
        }
        // bare program names are resolved through PATH by the runner
        if self.blender.components().count() > 1 {
            require_file("Blender executable", &self.blender)?;
        }
        require_file("Unfolding script", &self.script)?;

        let mut page = request.page;
        for attempt in 1..=self.max_attempts {
            let output = self
                .runner
                .run(&self.blender, &self.args(request, page), self.timeout)
                .await?;
            match classify(&output) {
                None => {
                    tracing::info!(
                        "Unfolded {} on {}x{} after {attempt} attempt(s)",
                        request.input_model.display(),
                        page.width,
                        page.height
                    );
                    return Ok(UnfoldReport {
                        page,
                        attempts: attempt,
                    });
                }
                Some(UnfoldFailure::Transient) => {
                    tracing::warn!(
                        "Pieces do not fit {}x{}, enlarging page",
                        page.width,
                        page.height
                    );
                    page = page.enlarged();
                }
                Some(UnfoldFailure::Fatal(message)) => {
                    return Err(ExternalError::Unfolding(message));
                }
            }
        }
        Err(ExternalError::Unfolding(format!(
            "Pieces did not fit a page after {} attempts.",
            self.max_attempts
        )))
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ExternalError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ExternalError::Missing {
            what,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ScriptedRunner;

    fn failed(stderr: &str) -> ProcessOutput {
        ProcessOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn ok() -> ProcessOutput {
        ProcessOutput {
            status: Some(0),
            ..Default::default()
        }
    }

    type Setup = (tempfile::TempDir, Arc<ScriptedRunner>, Unfolder<ScriptedRunner>);

    fn setup(outputs: Vec<ProcessOutput>, max_attempts: u32) -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("unfold.py");
        std::fs::write(&script, "# script").unwrap();
        let runner = Arc::new(ScriptedRunner::new(outputs));
        let unfolder = Unfolder::new(
            runner.clone(),
            "blender",
            script,
            Duration::from_secs(1),
            max_attempts,
        );
        (dir, runner, unfolder)
    }

    fn request() -> UnfoldRequest {
        UnfoldRequest {
            input_model: PathBuf::from("model.obj"),
            output_dir: PathBuf::from("out"),
            file_name: "model".into(),
            page: PageSize::new(25.0, 25.0),
            format: ExportFormat::Svg,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&ok()), None);
        assert_eq!(
            classify(&failed("ZeroDivisionError: float division by zero")),
            Some(UnfoldFailure::Transient)
        );
        assert_eq!(
            classify(&ProcessOutput {
                stderr: "RuntimeError: Invalid Input Error: An island is too big to fit onto page\n"
                    .into(),
                ..ok()
            }),
            Some(UnfoldFailure::Transient)
        );
        assert_eq!(
            classify(&failed("RuntimeError: Error: Python: Traceback (most recent call last)\n  File")),
            Some(UnfoldFailure::Fatal("Model was too complex to perform unfolding.".into()))
        );
        assert_eq!(
            classify(&failed("blah\nRuntimeError:   Mesh has no faces  \nmore")),
            Some(UnfoldFailure::Fatal("Mesh has no faces".into()))
        );
        assert_eq!(
            classify(&failed("Segmentation fault")),
            Some(UnfoldFailure::Fatal("Segmentation fault".into()))
        );
    }

    #[tokio::test]
    async fn test_transient_failures_enlarge_page() {
        let (_dir, runner, unfolder) = setup(
            vec![
                failed("ZeroDivisionError: float division by zero"),
                failed("ZeroDivisionError: float division by zero"),
                ok(),
            ],
            100,
        );
        let report = unfolder.unfold(&request()).await.unwrap();
        assert_eq!(report.attempts, 3);
        assert_eq!(report.page, PageSize::new(27.0, 27.0));

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        let last = &calls[2].1;
        let dw = last.iter().position(|a| a == "--dw").unwrap();
        assert_eq!(last[dw + 1], "27");
        assert_eq!(last.last().map(String::as_str), Some("SVG"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let transient = failed("ZeroDivisionError: float division by zero");
        let (_dir, runner, unfolder) = setup(vec![transient.clone(), transient.clone(), transient], 2);
        let err = unfolder.unfold(&request()).await.unwrap_err();
        assert!(matches!(err, ExternalError::Unfolding(_)));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let (_dir, runner, unfolder) = setup(vec![failed("RuntimeError: bad normals")], 100);
        let err = unfolder.unfold(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "bad normals");
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_page_and_missing_script() {
        let (_dir, runner, unfolder) = setup(vec![], 100);
        let mut req = request();
        req.page = PageSize::new(0.0, 25.0);
        let err = unfolder.unfold(&req).await.unwrap_err();
        assert!(matches!(err, ExternalError::InvalidPage { .. }));

        let missing = Unfolder::new(
            runner.clone(),
            "blender",
            "/nonexistent/unfold.py",
            Duration::from_secs(1),
            3,
        );
        let err = missing.unfold(&request()).await.unwrap_err();
        assert!(matches!(err, ExternalError::Missing { .. }));
        assert!(runner.calls().is_empty());
    }
}
