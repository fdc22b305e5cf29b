//! Interaction controller
//!
//! Routes pointer, wheel and key input: the primary button drives the
//! active tool state, the secondary button pans, the middle button orbits
//! and the wheel zooms.

pub mod keyboard;
mod pipeline;
pub mod states;

use std::path::Path;

use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};
use glam::Vec3;
use shared::{Rgb, ToolKind};

use crate::edit::{EditContext, EditError, Outcome, SetToolCommand};
use crate::external::mesh_io::{MeshIo, MeshIoError};
use crate::external::JobResult;
use crate::geometry::normalize::normalize_imported;
use crate::geometry::{Mesh, MeshHandle};
use crate::state::scene::{CommandHistory, FilterOutcome, Scene};
use crate::state::settings::{AppSettings, SimplificationSettings, UnfoldingSettings};
use crate::viewport::{Camera, CameraView, Picker, RayCaster, RenderSurface};

use keyboard::KeyAction;
use states::{Frame, InteractionState};

/// Sensitivities read once from settings when the controller is built
#[derive(Debug, Clone, PartialEq)]
pub struct Sensitivity {
    pub yaw: f32,
    pub pitch: f32,
    pub pan: f32,
    pub zoom: f32,
    pub mesh_move: f32,
    pub mesh_rotate: f32,
}

impl Sensitivity {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: f32| settings.lookup(name).unwrap_or(fallback);
        Self {
            yaw: get("CameraYawSensitivity", defaults.yaw),
            pitch: get("CameraPitchSensitivity", defaults.pitch),
            pan: get("CameraPanSensitivity", defaults.pan),
            zoom: get("ZoomSensitivity", defaults.zoom),
            mesh_move: get("MeshMoveSensitivity", defaults.mesh_move),
            mesh_rotate: get("MeshRotationSensitivity", defaults.mesh_rotate),
        }
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            yaw: 0.2,
            pitch: 0.2,
            pan: 10.0,
            zoom: 1.0,
            mesh_move: 0.2,
            mesh_rotate: 0.2,
        }
    }
}

#[derive(Clone, Copy)]
enum PointerEvent {
    Down,
    Move,
    Up,
}

/// Owns the scene, history and camera and turns raw input into edits.
pub struct InteractionController<S: RenderSurface> {
    scene: Scene,
    history: CommandHistory,
    camera: Camera,
    surface: S,
    picker: Box<dyn Picker>,
    tool: ToolKind,
    state: InteractionState,
    sensitivity: Sensitivity,
    pressed: Option<PointerButton>,
    last_pointer: Pos2,
    /// Meshes the size filter works from
    candidates: Vec<MeshHandle>,
    mesh_color: Rgb,
    highlight_color: Rgb,
    simplification: SimplificationSettings,
    unfolding: UnfoldingSettings,
}

impl<S: RenderSurface> InteractionController<S> {
    pub fn new(surface: S, camera: Camera, settings: &AppSettings) -> Self {
        Self {
            scene: Scene::new(),
            history: CommandHistory::new(),
            camera,
            surface,
            picker: Box::new(RayCaster),
            tool: ToolKind::Default,
            state: InteractionState::for_tool(ToolKind::Default),
            sensitivity: Sensitivity::from_settings(settings),
            pressed: None,
            last_pointer: Pos2::ZERO,
            candidates: Vec::new(),
            mesh_color: settings.mesh_color(),
            highlight_color: settings.highlight_color(),
            simplification: settings.simplification.clone(),
            unfolding: settings.unfolding.clone(),
        }
    }

    /// Replace the ray caster
    pub fn with_picker(mut self, picker: Box<dyn Picker>) -> Self {
        self.picker = picker;
        self
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn sensitivity(&self) -> &Sensitivity {
        &self.sensitivity
    }

    /// Mesh the active state points at, with the color to highlight it in
    pub fn highlighted(&self) -> Option<(&MeshHandle, Rgb)> {
        self.state.selection().map(|m| (m, self.highlight_color))
    }

    pub fn candidates(&self) -> &[MeshHandle] {
        &self.candidates
    }

    // ── Scene content ─────────────────────────────────────────

    /// Add a mesh to the scene and to the size-filter candidates
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = self.scene.add_mesh(mesh);
        self.candidates.push(handle.clone());
        self.surface.invalidate();
        handle
    }

    /// Normalize and add freshly imported meshes
    pub fn load_imported(&mut self, mut meshes: Vec<Mesh>) -> Vec<MeshHandle> {
        let report = normalize_imported(&mut meshes, self.mesh_color);
        let handles: Vec<MeshHandle> = meshes.into_iter().map(|m| self.add_mesh(m)).collect();
        tracing::info!(
            "Imported {} meshes (scale {:.4})",
            handles.len(),
            report.scale
        );
        handles
    }

    pub fn apply_size_filter(&mut self, threshold_percent: f32) -> FilterOutcome {
        let outcome = self.scene.filter_by_size(&self.candidates, threshold_percent);
        self.surface.invalidate();
        outcome
    }

    /// Swap every mesh but generated cylinders for its bounding box,
    /// keeping the filter candidates pointed at what is in the scene.
    /// History is cleared: recorded edits refer to the replaced meshes.
    pub fn replace_with_bounding_boxes(&mut self) -> Vec<MeshHandle> {
        let before = self.scene.meshes().to_vec();
        let after = self.scene.replace_with_bounding_boxes();
        for (old, new) in before.iter().zip(&after) {
            self.retarget_candidates(old, new);
        }
        self.forget_history();
        self.surface.invalidate();
        after
    }

    /// Re-import a simplification result. With a target, the first imported
    /// mesh takes the target's slot, name and transform in the default mesh
    /// color; without one, the whole scene is replaced. History is cleared
    /// either way.
    pub fn apply_simplified(
        &mut self,
        io: &dyn MeshIo,
        target: Option<&MeshHandle>,
        output: &Path,
    ) -> Result<Vec<MeshHandle>, EditError> {
        let mut meshes = io.import(output)?;
        if meshes.is_empty() {
            return Err(MeshIoError::Empty(output.to_path_buf()).into());
        }

        let Some(target) = target else {
            self.clear();
            return Ok(self.load_imported(meshes));
        };

        let mut simplified = meshes.swap_remove(0);
        {
            let old = target.borrow();
            simplified.set_name(old.name());
            simplified.set_transform_from(&old);
        }
        simplified.set_color(self.mesh_color);
        let handle = MeshHandle::new(simplified);
        self.scene.replace(target, handle.clone());
        self.retarget_candidates(target, &handle);
        self.forget_history();
        tracing::info!(
            "Simplified '{}': {} vertices",
            handle.borrow().name(),
            handle.borrow().vertex_count()
        );
        self.surface.invalidate();
        Ok(vec![handle])
    }

    /// Apply a finished background job. A simplification whose target mesh
    /// has left the scene is dropped.
    pub fn apply_job_result(
        &mut self,
        io: &dyn MeshIo,
        result: JobResult,
    ) -> Result<Vec<MeshHandle>, EditError> {
        match result {
            JobResult::Simplified {
                target,
                output,
                result,
            } => {
                result?;
                let target = match target {
                    Some(id) => match self.scene.find(id) {
                        Some(handle) => Some(handle),
                        None => {
                            tracing::warn!("Simplified mesh {id} is no longer in the scene");
                            return Ok(Vec::new());
                        }
                    },
                    None => None,
                };
                self.apply_simplified(io, target.as_ref(), &output)
            }
            JobResult::Unfolded { request, result } => {
                let report = result?;
                tracing::info!(
                    "Unfolding of {} written to {} ({} attempts)",
                    request.input_model.display(),
                    request.output_dir.display(),
                    report.attempts
                );
                Ok(Vec::new())
            }
        }
    }

    /// Empty the scene and forget history and filter candidates
    pub fn clear(&mut self) {
        self.scene.clear();
        self.candidates.clear();
        self.forget_history();
        self.surface.invalidate();
    }

    fn retarget_candidates(&mut self, old: &MeshHandle, new: &MeshHandle) {
        for candidate in self.candidates.iter_mut().filter(|c| c.ptr_eq(old)) {
            *candidate = new.clone();
        }
    }

    /// Drop every undo entry and any drag or selection in progress
    fn forget_history(&mut self) {
        if !self.history.is_empty() {
            tracing::debug!("Clearing {} history entries", self.history.len());
        }
        self.history.clear();
        self.state = InteractionState::for_tool(self.tool);
    }

    // ── Tools and undo ────────────────────────────────────────

    /// Switch tool through an undoable command
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<Outcome, EditError> {
        let pointer = self.last_pointer;
        let mut ctx = EditContext {
            scene: &mut self.scene,
            surface: &mut self.surface,
            camera: &self.camera,
            picker: self.picker.as_ref(),
            pointer,
            tool: &mut self.tool,
        };
        let outcome = self
            .history
            .push_and_execute(Box::new(SetToolCommand::new(tool)), &mut ctx)?;
        self.sync_state();
        Ok(outcome)
    }

    /// Undo the newest command. Returns false when history is empty.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let Some(mut command) = self.history.pop() else {
            return Ok(false);
        };
        let pointer = self.last_pointer;
        let mut ctx = EditContext {
            scene: &mut self.scene,
            surface: &mut self.surface,
            camera: &self.camera,
            picker: self.picker.as_ref(),
            pointer,
            tool: &mut self.tool,
        };
        command.undo(&mut ctx)?;
        tracing::info!("Undid {}", command.label());
        self.sync_state();
        Ok(true)
    }

    /// Arm the rotate tool's drag (gizmo handle grabbed)
    pub fn begin_rotation(&mut self, axis: Vec3) -> bool {
        self.state.begin_rotation(axis)
    }

    fn sync_state(&mut self) {
        if self.state.tool() != self.tool {
            tracing::debug!("Interaction state -> {:?}", self.tool);
            self.state = InteractionState::for_tool(self.tool);
            self.surface.invalidate();
        }
    }

    // ── Pointer input ─────────────────────────────────────────

    pub fn pointer_down(&mut self, button: PointerButton, pos: Pos2) -> Result<(), EditError> {
        self.pressed = Some(button);
        self.last_pointer = pos;
        match button {
            PointerButton::Primary => self.dispatch(PointerEvent::Down, pos),
            _ => Ok(()),
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> Result<(), EditError> {
        let delta = pos - self.last_pointer;
        self.last_pointer = pos;
        match self.pressed {
            Some(PointerButton::Secondary) => {
                self.pan(delta);
                Ok(())
            }
            Some(PointerButton::Middle) => {
                self.orbit(delta);
                Ok(())
            }
            _ => self.dispatch(PointerEvent::Move, pos),
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton, pos: Pos2) -> Result<(), EditError> {
        self.pressed = None;
        self.last_pointer = pos;
        match button {
            PointerButton::Primary => self.dispatch(PointerEvent::Up, pos),
            _ => Ok(()),
        }
    }

    /// Mouse wheel, in notches (one detent = 1.0)
    pub fn scroll(&mut self, notches: f32) {
        let step = self.camera.front() * notches * self.sensitivity.zoom;
        self.camera.translate(step);
        self.surface.invalidate();
    }

    pub fn key_pressed(&mut self, key: Key, modifiers: Modifiers) -> Result<(), EditError> {
        match keyboard::map_key(key, modifiers, &self.camera) {
            Some(KeyAction::MoveCamera(step)) => {
                self.camera.translate(step);
                self.surface.invalidate();
            }
            Some(KeyAction::Undo) => {
                self.undo()?;
            }
            Some(KeyAction::SelectTool(tool)) => {
                self.set_tool(tool)?;
            }
            None => {}
        }
        Ok(())
    }

    fn pan(&mut self, delta: Vec2) {
        let (w, h) = (self.surface.width(), self.surface.height());
        let pan = self.sensitivity.pan;
        let offset =
            -self.camera.right() * (delta.x / w * pan) + self.camera.up() * (delta.y / h * pan);
        self.camera.translate(offset);
        self.surface.invalidate();
    }

    fn orbit(&mut self, delta: Vec2) {
        self.camera
            .turn(delta.x * self.sensitivity.yaw, -delta.y * self.sensitivity.pitch);
        self.surface.invalidate();
    }

    fn dispatch(&mut self, event: PointerEvent, pos: Pos2) -> Result<(), EditError> {
        let mut frame = Frame {
            ctx: EditContext {
                scene: &mut self.scene,
                surface: &mut self.surface,
                camera: &self.camera,
                picker: self.picker.as_ref(),
                pointer: pos,
                tool: &mut self.tool,
            },
            history: &mut self.history,
            sensitivity: &self.sensitivity,
        };
        match event {
            PointerEvent::Down => self.state.on_pointer_down(&mut frame),
            PointerEvent::Move => self.state.on_pointer_move(&mut frame),
            PointerEvent::Up => self.state.on_pointer_up(&mut frame),
        }
    }
}
