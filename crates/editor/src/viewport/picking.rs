use egui::Pos2;
use glam::{Mat4, Vec3, Vec4};

use super::camera::CameraView;
use super::surface::RenderSurface;
use crate::geometry::{Mesh, MeshHandle};
use crate::state::scene::Scene;

/// Parallel-ray and behind-origin rejection threshold
pub const EPSILON: f32 = 1e-7;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Carry the ray into another frame by an affine matrix
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}

/// Nearest mesh under the pointer
#[derive(Debug, Clone)]
pub struct PickHit {
    pub mesh: MeshHandle,
    /// Distance from ray origin to hit point
    pub distance: f32,
}

/// Cast a world-space ray through a pixel of the surface.
pub fn screen_ray(camera: &dyn CameraView, width: f32, height: f32, pointer: Pos2) -> Ray {
    // Screen → NDC
    let ndc_x = 2.0 * pointer.x / width - 1.0;
    let ndc_y = 1.0 - 2.0 * pointer.y / height;
    let clip = Vec4::new(ndc_x, ndc_y, -1.0, 1.0);

    // Clip → eye, keep only the direction
    let eye = camera.projection_matrix(width / height).inverse() * clip;
    let eye = Vec4::new(eye.x, eye.y, -1.0, 0.0);

    // Eye → world
    let world = (camera.view_matrix().inverse() * eye).truncate().normalize();

    Ray {
        origin: camera.position(),
        direction: world,
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_intersects_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    // Outside triangle (u)
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    // Outside triangle (v)
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Nearest hit distance on one mesh, tested in the mesh's local frame.
///
/// The model matrix is rigid, so distances along the local ray equal
/// world distances.
pub fn ray_intersects_mesh(ray: &Ray, mesh: &Mesh) -> Option<f32> {
    let local = ray.transformed(&mesh.model_matrix().inverse());
    let mut best: Option<f32> = None;
    for [v0, v1, v2] in mesh.triangle_vertices() {
        if let Some(t) = ray_intersects_triangle(&local, v0, v1, v2) {
            if best.is_none_or(|b| t < b) {
                best = Some(t);
            }
        }
    }
    best
}

/// Nearest hit across every mesh of the scene. At equal distance the mesh
/// met first in scene order wins.
pub fn ray_intersects_scene(ray: &Ray, scene: &Scene) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for handle in scene.iter() {
        let Some(distance) = ray_intersects_mesh(ray, &handle.borrow()) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(PickHit {
                mesh: handle.clone(),
                distance,
            });
        }
    }
    best
}

/// Resolves the mesh under a pointer position. Commands borrow a picker
/// when they execute, so tests can substitute their own.
pub trait Picker {
    fn pick(
        &self,
        scene: &Scene,
        camera: &dyn CameraView,
        surface: &dyn RenderSurface,
        pointer: Pos2,
    ) -> Option<PickHit>;
}

/// Brute-force ray caster over every triangle of the scene
#[derive(Debug, Clone, Copy, Default)]
pub struct RayCaster;

impl Picker for RayCaster {
    fn pick(
        &self,
        scene: &Scene,
        camera: &dyn CameraView,
        surface: &dyn RenderSurface,
        pointer: Pos2,
    ) -> Option<PickHit> {
        let ray = screen_ray(camera, surface.width(), surface.height(), pointer);
        let hit = ray_intersects_scene(&ray, scene);
        if let Some(hit) = &hit {
            tracing::debug!(
                "Picked '{}' at distance {:.3}",
                hit.mesh.borrow().name(),
                hit.distance
            );
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::viewport::camera::Camera;
    use crate::viewport::surface::HeadlessSurface;
    use glam::Quat;

    fn down_z(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 1.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_triangle_hit_distance() {
        let t = ray_intersects_triangle(&down_z(0.25, 0.25), Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn test_triangle_miss_outside() {
        let t = ray_intersects_triangle(&down_z(2.0, 2.0), Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(t.is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3::new(0.1, 0.1, 0.0), Vec3::X);
        assert!(ray_intersects_triangle(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::NEG_Z);
        assert!(ray_intersects_triangle(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_scene_picks_nearest() {
        let mut scene = Scene::new();
        // ray from z=1 toward -Z: far plane at z=-4 (distance 5), near at z=-1 (distance 2)
        let far = scene.add_mesh(fixtures::triangle_at_z("far", -4.0));
        let near = scene.add_mesh(fixtures::triangle_at_z("near", -1.0));

        let hit = ray_intersects_scene(&down_z(0.1, 0.1), &scene).unwrap();
        assert_eq!(hit.mesh, near);
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert_ne!(hit.mesh, far);
    }

    #[test]
    fn test_scene_tie_keeps_first() {
        let mut scene = Scene::new();
        let first = scene.add_mesh(fixtures::triangle_at_z("a", 0.0));
        scene.add_mesh(fixtures::triangle_at_z("b", 0.0));
        let hit = ray_intersects_scene(&down_z(0.1, 0.1), &scene).unwrap();
        assert_eq!(hit.mesh, first);
    }

    #[test]
    fn test_empty_scene_and_empty_mesh_miss() {
        let mut scene = Scene::new();
        assert!(ray_intersects_scene(&down_z(0.0, 0.0), &scene).is_none());
        scene.add_mesh(Mesh::new("empty", vec![], vec![]).unwrap());
        assert!(ray_intersects_scene(&down_z(0.0, 0.0), &scene).is_none());
    }

    #[test]
    fn test_translated_mesh_is_picked_where_drawn() {
        let mut mesh = fixtures::triangle_at_z("t", 0.0);
        mesh.translate(Vec3::new(10.0, 0.0, 0.0));
        assert!(ray_intersects_mesh(&down_z(0.1, 0.1), &mesh).is_none());
        let t = ray_intersects_mesh(&down_z(10.1, 0.1), &mesh).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_mesh_keeps_world_distance() {
        let mut mesh = fixtures::triangle_at_z("t", 0.0);
        mesh.translate(Vec3::new(0.0, 0.0, -2.0));
        mesh.rotate(Quat::from_rotation_z(0.5));
        let t = ray_intersects_mesh(&down_z(0.0, 0.0), &mesh).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_screen_ray_through_center() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 10.0));
        let ray = screen_ray(&cam, 800.0, 600.0, Pos2::new(400.0, 300.0));
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 10.0));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_screen_ray_matches_projection() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 10.0));
        let target = Vec3::new(2.0, -1.0, 0.0);
        let (x, y) = cam.project(target, 800.0, 600.0).unwrap();
        let ray = screen_ray(&cam, 800.0, 600.0, Pos2::new(x, y));
        let expected = (target - cam.position).normalize();
        assert!(ray.direction.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_ray_caster_picks_box() {
        let mut scene = Scene::new();
        let b = scene.add_mesh(crate::geometry::primitives::box_mesh(Vec3::ZERO, 2.0, 2.0, 2.0, "Box"));
        let cam = Camera::new(Vec3::new(0.0, 0.0, 10.0));
        let surface = HeadlessSurface::new(800.0, 600.0);

        let hit = RayCaster
            .pick(&scene, &cam, &surface, Pos2::new(400.0, 300.0))
            .unwrap();
        assert_eq!(hit.mesh, b);
        assert!((hit.distance - 9.0).abs() < 1e-4);

        assert!(RayCaster
            .pick(&scene, &cam, &surface, Pos2::new(5.0, 5.0))
            .is_none());
    }
}
