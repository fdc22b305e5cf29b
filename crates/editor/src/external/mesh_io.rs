//! Mesh file codec seam. Parsing and writing model formats lives behind this
//! trait; the editor only moves whole meshes across it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geometry::{Mesh, MeshHandle};

#[derive(Debug, Error)]
pub enum MeshIoError {
    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
    #[error("unsupported mesh format: {0}")]
    Unsupported(String),
    #[error("{} contains no meshes", .0.display())]
    Empty(PathBuf),
}

pub trait MeshIo {
    /// Read every mesh in a model file
    fn import(&self, path: &Path) -> Result<Vec<Mesh>, MeshIoError>;

    /// Write meshes to `path`, returning the file actually written
    fn export(&self, meshes: &[MeshHandle], path: &Path) -> Result<PathBuf, MeshIoError>;
}
