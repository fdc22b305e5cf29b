//! Background jobs. External processes run on the tokio runtime; results
//! come back over a channel and are applied by whoever owns the scene.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::{
    ExternalError, ProcessOutput, ProcessRunner, SimplifyRequest, Simplifier, UnfoldReport,
    UnfoldRequest, Unfolder,
};
use crate::geometry::MeshId;

#[derive(Debug)]
pub enum JobResult {
    Simplified {
        /// Mesh the result replaces; `None` for the whole scene
        target: Option<MeshId>,
        output: PathBuf,
        result: Result<ProcessOutput, ExternalError>,
    },
    Unfolded {
        request: UnfoldRequest,
        result: Result<UnfoldReport, ExternalError>,
    },
}

pub struct JobQueue<R> {
    handle: Handle,
    simplifier: Arc<Simplifier<R>>,
    unfolder: Arc<Unfolder<R>>,
    tx: mpsc::UnboundedSender<JobResult>,
    rx: mpsc::UnboundedReceiver<JobResult>,
    pending: usize,
}

impl<R: ProcessRunner + 'static> JobQueue<R> {
    pub fn new(handle: Handle, simplifier: Simplifier<R>, unfolder: Unfolder<R>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle,
            simplifier: Arc::new(simplifier),
            unfolder: Arc::new(unfolder),
            tx,
            rx,
            pending: 0,
        }
    }

    /// Jobs submitted but not yet collected
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn submit_simplify(&mut self, target: Option<MeshId>, request: SimplifyRequest) {
        let simplifier = self.simplifier.clone();
        let tx = self.tx.clone();
        self.pending += 1;
        self.handle.spawn(async move {
            let result = simplifier.simplify(&request).await;
            if let Err(e) = &result {
                tracing::warn!("Simplification failed: {e}");
            }
            // receiver gone means the editor shut down
            let _ = tx.send(JobResult::Simplified {
                target,
                output: request.output,
                result,
            });
        });
    }

    pub fn submit_unfold(&mut self, request: UnfoldRequest) {
        let unfolder = self.unfolder.clone();
        let tx = self.tx.clone();
        self.pending += 1;
        self.handle.spawn(async move {
            let result = unfolder.unfold(&request).await;
            if let Err(e) = &result {
                tracing::warn!("Unfolding failed: {e}");
            }
            let _ = tx.send(JobResult::Unfolded { request, result });
        });
    }

    /// Finished results, without waiting
    pub fn drain(&mut self) -> Vec<JobResult> {
        let mut done = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            done.push(result);
        }
        done
    }

    /// Wait for the next result; `None` when nothing is outstanding
    pub async fn next(&mut self) -> Option<JobResult> {
        if self.pending == 0 {
            return None;
        }
        let result = self.rx.recv().await?;
        self.pending -= 1;
        Some(result)
    }
}
