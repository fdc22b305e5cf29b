//! Scene registry
//!
//! Ordered collection of the meshes being edited, with observers for
//! keeping mesh lists in sync.

mod bbox_ops;
mod display;
mod filter;
mod history;

pub use display::{short_id, MeshSummary};
pub use filter::FilterOutcome;
pub use history::{CommandHistory, MAX_HISTORY};

use std::fmt;

use glam::Vec3;

use crate::geometry::{Mesh, MeshHandle, MeshId};

/// Structural change notification
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added { index: usize, id: MeshId },
    Removed { index: usize, id: MeshId },
    Replaced { index: usize, old: MeshId, new: MeshId },
    Cleared,
}

/// Token returned by [`Scene::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&SceneEvent)>;

/// The meshes currently visible, in insertion order.
///
/// Never holds the same mesh twice. Indices stay stable until the next
/// add or remove.
#[derive(Default)]
pub struct Scene {
    meshes: Vec<MeshHandle>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("meshes", &self.meshes)
            .field("observers", &self.observers.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scene version (increments on every structural change)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn meshes(&self) -> &[MeshHandle] {
        &self.meshes
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshHandle> {
        self.meshes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&MeshHandle> {
        self.meshes.get(index)
    }

    pub fn index_of(&self, mesh: &MeshHandle) -> Option<usize> {
        self.meshes.iter().position(|m| m.ptr_eq(mesh))
    }

    pub fn contains(&self, mesh: &MeshHandle) -> bool {
        self.index_of(mesh).is_some()
    }

    /// Find a mesh by ID
    pub fn find(&self, id: MeshId) -> Option<MeshHandle> {
        self.meshes.iter().find(|m| m.id() == id).cloned()
    }

    /// Append a mesh; a mesh already in the scene is left where it is.
    pub fn add(&mut self, mesh: MeshHandle) {
        if self.contains(&mesh) {
            return;
        }
        let index = self.meshes.len();
        let id = mesh.id();
        self.meshes.push(mesh);
        tracing::debug!("Scene add #{index} ({id})");
        self.notify(SceneEvent::Added { index, id });
    }

    /// Wrap a new mesh in a handle and append it
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle::new(mesh);
        self.add(handle.clone());
        handle
    }

    /// Insert at `index` (clamped to the end); no-op if already present.
    pub fn insert(&mut self, index: usize, mesh: MeshHandle) {
        if self.contains(&mesh) {
            return;
        }
        let index = index.min(self.meshes.len());
        let id = mesh.id();
        self.meshes.insert(index, mesh);
        tracing::debug!("Scene insert #{index} ({id})");
        self.notify(SceneEvent::Added { index, id });
    }

    /// Remove a mesh; returns the index it occupied.
    pub fn remove(&mut self, mesh: &MeshHandle) -> Option<usize> {
        let index = self.index_of(mesh)?;
        let removed = self.meshes.remove(index);
        let id = removed.id();
        tracing::debug!("Scene remove #{index} ({id})");
        self.notify(SceneEvent::Removed { index, id });
        Some(index)
    }

    /// Put `new` in `old`'s slot. When `old` is absent, `new` is appended.
    pub fn replace(&mut self, old: &MeshHandle, new: MeshHandle) {
        let Some(index) = self.index_of(old) else {
            tracing::debug!("Scene replace: mesh {} absent, appending", old.id());
            self.add(new);
            return;
        };
        if self.contains(&new) {
            // Already visible elsewhere: just drop the old one
            self.remove(old);
            return;
        }
        let event = SceneEvent::Replaced {
            index,
            old: old.id(),
            new: new.id(),
        };
        self.meshes[index] = new;
        tracing::debug!("Scene replace #{index}");
        self.notify(event);
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        tracing::debug!("Scene cleared");
        self.notify(SceneEvent::Cleared);
    }

    pub fn mesh_center(&self, mesh: &MeshHandle) -> Vec3 {
        mesh.borrow().compute_center()
    }

    pub fn mesh_dimensions(&self, mesh: &MeshHandle) -> Vec3 {
        mesh.borrow().compute_dimensions()
    }

    /// Summaries for the mesh list panel
    pub fn summaries(&self) -> Vec<MeshSummary> {
        self.meshes.iter().map(|m| m.borrow().summary()).collect()
    }

    // ── Observers ─────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: impl FnMut(&SceneEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the observer was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: SceneEvent) {
        self.version += 1;
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }
}
