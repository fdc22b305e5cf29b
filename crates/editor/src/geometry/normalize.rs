//! Fit freshly imported geometry into the editor's working volume.

use glam::Vec3;
use shared::Rgb;

use super::{Aabb, Mesh};

/// Largest allowed model dimension after import
pub const TARGET_SIZE: f32 = 10.0;

/// What `normalize_imported` did to the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeReport {
    /// Uniform scale applied (1.0 when the model already fit)
    pub scale: f32,
    /// Translation applied after scaling
    pub offset: Vec3,
}

impl NormalizeReport {
    pub fn scaled(&self) -> bool {
        self.scale != 1.0
    }
}

/// Scale the whole model down so its largest bound dimension is at most
/// [`TARGET_SIZE`], center the combined bounds on the origin and paint
/// every mesh with `default_color`.
pub fn normalize_imported(meshes: &mut [Mesh], default_color: Rgb) -> NormalizeReport {
    let bounds = combined_bounds(meshes);
    let largest = bounds.size().max_element();

    let scale = if largest > TARGET_SIZE {
        TARGET_SIZE / largest
    } else {
        1.0
    };
    let offset = -bounds.center() * scale;

    for mesh in meshes.iter_mut() {
        mesh.map_vertices(|v| v * scale + offset);
        mesh.set_color(default_color);
    }

    if scale != 1.0 {
        tracing::info!("Scaled imported model by {scale:.4} (largest dimension {largest:.2})");
    }

    NormalizeReport { scale, offset }
}

fn combined_bounds(meshes: &[Mesh]) -> Aabb {
    meshes
        .iter()
        .filter(|m| m.vertex_count() > 0)
        .map(Mesh::compute_bounds)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Aabb::ZERO)
}
