use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use shared::Primitive;

use super::Mesh;

/// Name given to generated cylinders; bounding-box replacement skips them.
pub const GENERATED_CYLINDER_NAME: &str = "GeneratedCylinder";

/// Default segment count for generated cylinders
pub const CYLINDER_SEGMENTS: u32 = 32;

/// Axis-aligned box with 8 shared corners and 12 triangles.
pub fn box_mesh(center: Vec3, width: f32, height: f32, depth: f32, name: &str) -> Mesh {
    let h = Vec3::new(width, height, depth) * 0.5;

    let vertices = vec![
        center + Vec3::new(-h.x, -h.y, -h.z),
        center + Vec3::new(h.x, -h.y, -h.z),
        center + Vec3::new(h.x, h.y, -h.z),
        center + Vec3::new(-h.x, h.y, -h.z),
        center + Vec3::new(-h.x, -h.y, h.z),
        center + Vec3::new(h.x, -h.y, h.z),
        center + Vec3::new(h.x, h.y, h.z),
        center + Vec3::new(-h.x, h.y, h.z),
    ];

    let triangles = vec![
        // Back (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // Front (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // Left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+X)
        [1, 2, 6],
        [1, 6, 5],
        // Bottom (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // Top (+Y)
        [3, 7, 6],
        [3, 6, 2],
    ];

    build(name, vertices, triangles)
}

/// Closed cylinder: two rings of `segments` vertices plus two cap centers,
/// four triangles per segment. Built along +Y, then rotated onto
/// `direction` and moved to `center`.
pub fn cylinder_mesh(center: Vec3, radius: f32, height: f32, segments: u32, direction: Vec3) -> Mesh {
    let n = segments.max(3);
    let hh = height * 0.5;
    let rotation = direction
        .try_normalize()
        .map(|dir| Quat::from_rotation_arc(Vec3::Y, dir))
        .unwrap_or(Quat::IDENTITY);

    let mut vertices = Vec::with_capacity(2 * n as usize + 2);
    for y in [-hh, hh] {
        for i in 0..n {
            let a = i as f32 * TAU / n as f32;
            vertices.push(Vec3::new(radius * a.cos(), y, radius * a.sin()));
        }
    }
    let bottom = vertices.len() as u32;
    vertices.push(Vec3::new(0.0, -hh, 0.0));
    let top = bottom + 1;
    vertices.push(Vec3::new(0.0, hh, 0.0));

    let mut triangles = Vec::with_capacity(4 * n as usize);
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push([i, n + j, j]);
        triangles.push([i, n + i, n + j]);
        triangles.push([bottom, i, j]);
        triangles.push([top, n + j, n + i]);
    }

    for v in &mut vertices {
        *v = center + rotation * *v;
    }

    build(GENERATED_CYLINDER_NAME, vertices, triangles)
}

/// Build a mesh from a serialized primitive description
pub fn from_primitive(primitive: &Primitive, name: &str) -> Mesh {
    match primitive {
        Primitive::Box {
            center,
            width,
            height,
            depth,
        } => box_mesh(Vec3::from(*center), *width, *height, *depth, name),
        Primitive::Cylinder {
            center,
            radius,
            height,
            segments,
        } => {
            let mut mesh = cylinder_mesh(Vec3::from(*center), *radius, *height, *segments, Vec3::Y);
            mesh.set_name(name);
            mesh
        }
    }
}

fn build(name: &str, vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Mesh {
    // Indices are generated above and always in range
    Mesh::from_trusted(name, vertices, triangles).with_color(shared::RED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_mesh_counts_and_dimensions() {
        let mesh = box_mesh(Vec3::new(1.0, 0.0, 0.0), 2.0, 4.0, 6.0, "Box");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.name(), "Box");
        assert_eq!(mesh.color(), shared::RED);
        assert!(mesh
            .compute_dimensions()
            .abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-6));
        assert!(mesh.compute_center().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_cylinder_mesh_counts() {
        let mesh = cylinder_mesh(Vec3::ZERO, 1.0, 2.0, 32, Vec3::Y);
        assert_eq!(mesh.vertex_count(), 66);
        assert_eq!(mesh.triangle_count(), 128);
        assert_eq!(mesh.name(), GENERATED_CYLINDER_NAME);
    }

    #[test]
    fn test_cylinder_mesh_dimensions_along_y() {
        let mesh = cylinder_mesh(Vec3::new(0.0, 3.0, 0.0), 0.5, 4.0, 32, Vec3::Y);
        let dims = mesh.compute_dimensions();
        assert!((dims.x - 1.0).abs() < 1e-3);
        assert!((dims.y - 4.0).abs() < 1e-5);
        assert!(mesh.compute_center().abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-3));
    }

    #[test]
    fn test_cylinder_mesh_direction_x() {
        let mesh = cylinder_mesh(Vec3::ZERO, 0.5, 4.0, 16, Vec3::X);
        let dims = mesh.compute_dimensions();
        assert!((dims.x - 4.0).abs() < 1e-4);
        assert!(dims.y < 1.01);
    }

    #[test]
    fn test_from_primitive_keeps_name() {
        let primitive = Primitive::Cylinder {
            center: [0.0; 3],
            radius: 1.0,
            height: 1.0,
            segments: 8,
        };
        let mesh = from_primitive(&primitive, "Pipe");
        assert_eq!(mesh.name(), "Pipe");
        assert_eq!(mesh.triangle_count(), 32);
    }
}
