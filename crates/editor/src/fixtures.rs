//! Factory functions and fakes for tests and scripted sessions.
//!
//! Provides small meshes with known geometry plus in-memory stand-ins for the
//! picker, the mesh codec and the process runner.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use egui::Pos2;
use glam::Vec3;

use crate::external::mesh_io::{MeshIo, MeshIoError};
use crate::external::{ExternalError, ProcessOutput, ProcessRunner};
use crate::geometry::{Mesh, MeshHandle};
use crate::state::scene::Scene;
use crate::viewport::{CameraView, PickHit, Picker, RenderSurface};

// ── Mesh factories ──────────────────────────────────────────────

/// Triangle (0,0,0), (1,0,0), (0,1,0)
pub fn unit_triangle(name: &str) -> Mesh {
    Mesh::from_trusted(name, vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]])
}

/// Large triangle in the plane `z`, covering the origin
pub fn triangle_at_z(name: &str, z: f32) -> Mesh {
    Mesh::from_trusted(
        name,
        vec![
            Vec3::new(-5.0, -5.0, z),
            Vec3::new(5.0, -5.0, z),
            Vec3::new(0.0, 5.0, z),
        ],
        vec![[0, 1, 2]],
    )
}

/// Closed box spanning `center ± half_extents`
pub fn box_corners(name: &str, center: Vec3, half_extents: Vec3) -> Mesh {
    let corners = (0..8)
        .map(|i| {
            let sign = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            center + sign * half_extents
        })
        .collect();
    let triangles = vec![
        [0, 2, 1],
        [1, 2, 3],
        [4, 5, 6],
        [5, 7, 6],
        [0, 1, 4],
        [1, 5, 4],
        [2, 6, 3],
        [3, 6, 7],
        [0, 4, 2],
        [2, 4, 6],
        [1, 3, 5],
        [3, 7, 5],
    ];
    Mesh::from_trusted(name, corners, triangles)
}

// ── Picker ──────────────────────────────────────────────────────

/// Picker that reports a fixed mesh while it is in the scene
#[derive(Debug, Clone, Default)]
pub struct FixedPicker {
    target: Option<MeshHandle>,
}

impl FixedPicker {
    pub fn hit(mesh: &MeshHandle) -> Self {
        Self {
            target: Some(mesh.clone()),
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }
}

impl Picker for FixedPicker {
    fn pick(
        &self,
        scene: &Scene,
        _camera: &dyn CameraView,
        _surface: &dyn RenderSurface,
        _pointer: Pos2,
    ) -> Option<PickHit> {
        let mesh = self.target.as_ref().filter(|m| scene.contains(m))?;
        Some(PickHit {
            mesh: mesh.clone(),
            distance: 1.0,
        })
    }
}

// ── Mesh codec ──────────────────────────────────────────────────

/// Mesh "files" kept in memory, keyed by path
#[derive(Debug, Default)]
pub struct MemoryMeshIo {
    files: RefCell<HashMap<PathBuf, Vec<Mesh>>>,
}

impl MemoryMeshIo {
    pub fn insert(&self, path: impl Into<PathBuf>, meshes: Vec<Mesh>) {
        self.files.borrow_mut().insert(path.into(), meshes);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}

impl MeshIo for MemoryMeshIo {
    fn import(&self, path: &Path) -> Result<Vec<Mesh>, MeshIoError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| MeshIoError::Read {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            })
    }

    fn export(&self, meshes: &[MeshHandle], path: &Path) -> Result<PathBuf, MeshIoError> {
        if meshes.is_empty() {
            return Err(MeshIoError::Empty(path.to_path_buf()));
        }
        let copies = meshes.iter().map(|m| m.borrow().clone()).collect();
        self.insert(path, copies);
        Ok(path.to_path_buf())
    }
}

// ── Process runner ──────────────────────────────────────────────

/// Runner that replays canned outputs and records every invocation.
/// Once the script runs out it reports success with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: Mutex<VecDeque<ProcessOutput>>,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new(outputs: Vec<ProcessOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            calls: Mutex::default(),
        }
    }

    /// Program and arguments of each run so far
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ProcessRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        _timeout: Duration,
    ) -> Result<ProcessOutput, ExternalError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((program.to_path_buf(), args.to_vec()));
        }
        let next = self.outputs.lock().ok().and_then(|mut o| o.pop_front());
        Ok(next.unwrap_or(ProcessOutput {
            status: Some(0),
            ..Default::default()
        }))
    }
}
