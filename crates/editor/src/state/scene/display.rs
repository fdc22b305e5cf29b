//! Display helpers for the mesh list

use std::fmt;

use serde::Serialize;

use crate::geometry::MeshId;

/// One row of the mesh list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshSummary {
    pub id: MeshId,
    pub name: String,
    pub vertex_count: usize,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} vertices)", self.name, self.vertex_count)
    }
}

/// Get shortened ID (first 8 characters)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
