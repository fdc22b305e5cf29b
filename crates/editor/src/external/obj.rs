//! Wavefront OBJ codec for the simplification and unfolding round trips.
//!
//! Reads `o`/`g` groups, `v` positions and `f` faces (fan-triangulated,
//! `v/vt/vn` and negative indices accepted); everything else is skipped.
//! Writes one `o` group per mesh with its vertices in the mesh frame.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use glam::Vec3;

use super::mesh_io::{MeshIo, MeshIoError};
use crate::geometry::{Mesh, MeshHandle};

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjMeshIo;

/// One `o`/`g` group while reading
struct Group {
    name: String,
    /// Global vertex index -> index within this group
    remap: Vec<(usize, u32)>,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl Group {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remap: Vec::new(),
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    fn local(&mut self, global: usize, positions: &[Vec3]) -> u32 {
        if let Some(&(_, local)) = self.remap.iter().find(|(g, _)| *g == global) {
            return local;
        }
        let local = self.vertices.len() as u32;
        self.vertices.push(positions[global]);
        self.remap.push((global, local));
        local
    }
}

/// Parse OBJ text. `path` only labels errors.
pub fn parse_obj(text: &str, path: &Path) -> Result<Vec<Mesh>, MeshIoError> {
    let fail = |line: usize, reason: &str| MeshIoError::Read {
        path: path.to_path_buf(),
        reason: format!("line {line}: {reason}"),
    };

    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    let mut positions: Vec<Vec3> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut current = Group::new(default_name);

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<f32> = parts
                    .take(3)
                    .map(|p| p.parse::<f32>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| fail(line_no, "bad vertex coordinate"))?;
                let [x, y, z] = coords[..] else {
                    return Err(fail(line_no, "vertex needs three coordinates"));
                };
                positions.push(Vec3::new(x, y, z));
            }
            Some("o") | Some("g") => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let next = Group::new(if name.is_empty() { current.name.clone() } else { name });
                let finished = std::mem::replace(&mut current, next);
                if !finished.triangles.is_empty() {
                    groups.push(finished);
                }
            }
            Some("f") => {
                let mut corners = Vec::new();
                for token in parts {
                    let index = token
                        .split('/')
                        .next()
                        .and_then(|v| v.parse::<i64>().ok())
                        .ok_or_else(|| fail(line_no, "bad face index"))?;
                    let global = resolve(index, positions.len())
                        .ok_or_else(|| fail(line_no, "face index out of range"))?;
                    corners.push(current.local(global, &positions));
                }
                if corners.len() < 3 {
                    return Err(fail(line_no, "face needs at least three vertices"));
                }
                for k in 1..corners.len() - 1 {
                    current.triangles.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }
    if !current.triangles.is_empty() {
        groups.push(current);
    }

    groups
        .into_iter()
        .map(|g| {
            Mesh::new(g.name, g.vertices, g.triangles).map_err(|e| MeshIoError::Read {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// 1-based or negative (relative to the end) OBJ index to 0-based
fn resolve(index: i64, count: usize) -> Option<usize> {
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    usize::try_from(resolved).ok().filter(|&r| r < count)
}

/// OBJ text for `meshes`, one group each
pub fn write_obj(meshes: &[MeshHandle]) -> String {
    let mut out = String::new();
    let mut offset = 1usize;
    for handle in meshes {
        let mesh = handle.borrow();
        // writing to a String cannot fail
        let _ = writeln!(out, "o {}", mesh.name());
        for v in mesh.vertices() {
            let _ = writeln!(out, "v {} {} {}", v.x, v.y, v.z);
        }
        for [a, b, c] in mesh.triangles() {
            let [a, b, c] = [*a as usize + offset, *b as usize + offset, *c as usize + offset];
            let _ = writeln!(out, "f {a} {b} {c}");
        }
        offset += mesh.vertex_count();
    }
    out
}

impl MeshIo for ObjMeshIo {
    fn import(&self, path: &Path) -> Result<Vec<Mesh>, MeshIoError> {
        if !has_obj_extension(path) {
            return Err(MeshIoError::Unsupported(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| MeshIoError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let meshes = parse_obj(&text, path)?;
        tracing::debug!("Read {} meshes from {}", meshes.len(), path.display());
        Ok(meshes)
    }

    fn export(&self, meshes: &[MeshHandle], path: &Path) -> Result<PathBuf, MeshIoError> {
        if meshes.is_empty() {
            return Err(MeshIoError::Empty(path.to_path_buf()));
        }
        let path = path.with_extension("obj");
        let write_err = |e: std::io::Error| MeshIoError::Write {
            path: path.clone(),
            reason: e.to_string(),
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        std::fs::write(&path, write_obj(meshes)).map_err(write_err)?;
        tracing::debug!("Wrote {} meshes to {}", meshes.len(), path.display());
        Ok(path)
    }
}

fn has_obj_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
}
