//! Bounding-box stand-ins for export

use super::Scene;
use crate::geometry::primitives::{box_mesh, GENERATED_CYLINDER_NAME};
use crate::geometry::MeshHandle;

impl Scene {
    /// Replace every mesh except generated cylinders by a box built from its
    /// center and dimensions. The box keeps the mesh's name, color and
    /// transform. Returns the resulting mesh list.
    pub fn replace_with_bounding_boxes(&mut self) -> Vec<MeshHandle> {
        let originals: Vec<MeshHandle> = self.meshes.clone();
        let mut replaced = 0;
        for original in &originals {
            let boxed = {
                let mesh = original.borrow();
                if mesh.name() == GENERATED_CYLINDER_NAME {
                    continue;
                }
                let center = mesh.compute_center();
                let dims = mesh.compute_dimensions();
                let mut boxed = box_mesh(center, dims.x, dims.y, dims.z, mesh.name()).with_color(mesh.color());
                boxed.set_transform_from(&mesh);
                boxed
            };
            self.replace(original, MeshHandle::new(boxed));
            replaced += 1;
        }
        tracing::info!("Replaced {replaced} meshes with bounding boxes");
        self.meshes.clone()
    }
}
