//! Geometry kernel: indexed triangle meshes and their derived quantities.

pub mod normalize;
pub mod primitives;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use shared::Rgb;
use thiserror::Error;
use uuid::Uuid;

use crate::state::scene::MeshSummary;

/// Errors raised by bounds-checked geometry access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Stable identity of a mesh, independent of its position in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(Uuid);

impl MeshId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeshId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MeshId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Degenerate box at the origin (bounds of an empty mesh)
    pub const ZERO: Aabb = Aabb {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Bounds of a point set, `ZERO` when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::ZERO;
        };
        let (min, max) = iter.fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self { min, max }
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// CPU-side render buffer: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }
}

/// One editable object: geometry plus orientation, translation and color.
///
/// Positions are stored in the mesh's local frame. Orientation and
/// translation are applied at render time through [`Mesh::model_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: MeshId,
    name: String,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    orientation: Quat,
    translation: Vec3,
    color: Rgb,
}

impl Mesh {
    /// Build a mesh, checking every triangle index against the vertex list.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, GeometryError> {
        let len = vertices.len();
        for tri in &triangles {
            for &index in tri {
                if index as usize >= len {
                    return Err(GeometryError::IndexOutOfRange {
                        what: "vertex",
                        index: index as usize,
                        len,
                    });
                }
            }
        }
        Ok(Self::from_trusted(name, vertices, triangles))
    }

    /// Build a mesh whose indices are known to be valid
    pub(crate) fn from_trusted(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        debug_assert!(triangles
            .iter()
            .flatten()
            .all(|&i| (i as usize) < vertices.len()));
        Self {
            id: MeshId::new(),
            name: name.into(),
            vertices,
            triangles,
            orientation: Quat::IDENTITY,
            translation: Vec3::ZERO,
            color: shared::GREY,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn vertex(&self, index: usize) -> Result<Vec3, GeometryError> {
        self.vertices
            .get(index)
            .copied()
            .ok_or(GeometryError::IndexOutOfRange {
                what: "vertex",
                index,
                len: self.vertices.len(),
            })
    }

    pub fn triangle(&self, index: usize) -> Result<[u32; 3], GeometryError> {
        self.triangles
            .get(index)
            .copied()
            .ok_or(GeometryError::IndexOutOfRange {
                what: "triangle",
                index,
                len: self.triangles.len(),
            })
    }

    /// Local-frame corner positions of every triangle
    pub fn triangle_vertices(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles.iter().map(|[a, b, c]| {
            [
                self.vertices[*a as usize],
                self.vertices[*b as usize],
                self.vertices[*c as usize],
            ]
        })
    }

    pub fn compute_bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    pub fn compute_center(&self) -> Vec3 {
        self.compute_bounds().center()
    }

    /// Twice the largest positive excursion from the center on each axis.
    pub fn compute_dimensions(&self) -> Vec3 {
        let center = self.compute_center();
        let extent = self
            .vertices
            .iter()
            .fold(Vec3::ZERO, |acc, v| acc.max(*v - center));
        extent * 2.0
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Compose a rotation on the left of the stored orientation.
    pub fn rotate(&mut self, rotation: Quat) {
        self.orientation = (rotation * self.orientation).normalize();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    /// Copy orientation and translation from another mesh
    pub fn set_transform_from(&mut self, other: &Mesh) {
        self.orientation = other.orientation;
        self.translation = other.translation;
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Local → world transform
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.translation)
    }

    /// Rewrite vertex positions in place (used by import normalization)
    pub(crate) fn map_vertices(&mut self, f: impl Fn(Vec3) -> Vec3) {
        for v in &mut self.vertices {
            *v = f(*v);
        }
    }

    /// Build the interleaved render buffer with smooth vertex normals.
    pub fn mesh_data(&self) -> MeshData {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            // Area-weighted face normal
            let n = (self.vertices[b] - self.vertices[a]).cross(self.vertices[c] - self.vertices[a]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }

        let mut vertices = Vec::with_capacity(self.vertices.len() * 9);
        for (p, n) in self.vertices.iter().zip(&normals) {
            let n = n.normalize_or_zero();
            vertices.extend_from_slice(&[
                p.x,
                p.y,
                p.z,
                n.x,
                n.y,
                n.z,
                self.color[0],
                self.color[1],
                self.color[2],
            ]);
        }

        MeshData {
            vertices,
            indices: self.triangles.iter().flatten().copied().collect(),
        }
    }

    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            id: self.id,
            name: self.name.clone(),
            vertex_count: self.vertices.len(),
        }
    }
}

/// Shared, mutable reference to a mesh.
///
/// The scene and any number of undo mementos may hold the same mesh.
/// Equality is identity: two handles are equal only if they point at the
/// same allocation.
#[derive(Debug, Clone)]
pub struct MeshHandle(Rc<RefCell<Mesh>>);

impl MeshHandle {
    pub fn new(mesh: Mesh) -> Self {
        Self(Rc::new(RefCell::new(mesh)))
    }

    pub fn borrow(&self) -> Ref<'_, Mesh> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Mesh> {
        self.0.borrow_mut()
    }

    pub fn id(&self) -> MeshId {
        self.0.borrow().id
    }

    pub fn ptr_eq(&self, other: &MeshHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles (scene slot plus mementos)
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for MeshHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for MeshHandle {}

impl From<Mesh> for MeshHandle {
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh)
    }
}
