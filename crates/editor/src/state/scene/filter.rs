//! Size filter driven by the "hide small parts" slider

use super::Scene;
use crate::geometry::MeshHandle;

/// What one filter pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub hidden: usize,
    pub restored: usize,
}

impl Scene {
    /// Hide every candidate whose dimensions are all below `threshold_percent`
    /// of the largest minimum dimension among `candidates`, and bring back
    /// hidden candidates that qualify again.
    ///
    /// The result depends only on `candidates` and the threshold, never on
    /// what is visible right now, so slider moves in any order converge.
    pub fn filter_by_size(&mut self, candidates: &[MeshHandle], threshold_percent: f32) -> FilterOutcome {
        let reference = candidates
            .iter()
            .map(|m| m.borrow().compute_dimensions().min_element())
            .fold(0.0_f32, f32::max);
        let cutoff = reference * threshold_percent / 100.0;

        let mut outcome = FilterOutcome::default();
        for mesh in candidates {
            let dims = mesh.borrow().compute_dimensions();
            let too_small = dims.max_element() < cutoff;
            match (too_small, self.contains(mesh)) {
                (true, true) => {
                    self.remove(mesh);
                    outcome.hidden += 1;
                }
                (false, false) => {
                    self.add(mesh.clone());
                    outcome.restored += 1;
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Size filter {threshold_percent}% (cutoff {cutoff:.3}): hid {}, restored {}",
            outcome.hidden,
            outcome.restored
        );
        outcome
    }
}
