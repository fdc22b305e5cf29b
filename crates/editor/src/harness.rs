//! Headless editor harness for programmatic sessions.
//!
//! Drives a real `InteractionController` over a fixed-size surface that only
//! counts redraw requests. The camera sits at (0, 0, 10) looking down -Z.
//! With `ExternalTools` attached, simplification and unfolding jobs run on a
//! private runtime and are applied when the script waits for them.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use egui::{PointerButton, Pos2};
use glam::Vec3;
use shared::{Primitive, SimplifyMethod, ToolKind};
use tokio::runtime::Runtime;

use crate::edit::{EditError, Outcome};
use crate::external::mesh_io::MeshIo;
use crate::external::{
    ExternalError, JobQueue, ProcessRunner, SimplifyRequest, Simplifier, TokioRunner,
    UnfoldRequest, Unfolder,
};
use crate::geometry::primitives::{self, CYLINDER_SEGMENTS};
use crate::geometry::{MeshHandle, MeshId};
use crate::interaction::InteractionController;
use crate::state::settings::AppSettings;
use crate::viewport::{Camera, CameraView, HeadlessSurface, Picker, RenderSurface};

pub const SURFACE_WIDTH: f32 = 800.0;
pub const SURFACE_HEIGHT: f32 = 600.0;

/// Mesh codec, job queue and scratch directory for the process round trips
pub struct ExternalTools<R> {
    runtime: Runtime,
    jobs: JobQueue<R>,
    io: Rc<dyn MeshIo>,
    work_dir: PathBuf,
}

impl<R: ProcessRunner + 'static> ExternalTools<R> {
    /// Tool paths and timeouts come from `settings.external`.
    pub fn new(runner: Arc<R>, io: Rc<dyn MeshIo>, settings: &AppSettings) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let jobs = JobQueue::new(
            runtime.handle().clone(),
            Simplifier::from_settings(runner.clone(), settings),
            Unfolder::from_settings(runner, settings),
        );
        Ok(Self {
            runtime,
            jobs,
            io,
            work_dir: settings.external.work_dir.clone(),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Jobs queued and not yet applied
    pub fn pending(&self) -> usize {
        self.jobs.pending()
    }
}

/// Headless editor session
pub struct EditorHarness<R = TokioRunner> {
    pub controller: InteractionController<HeadlessSurface>,
    tools: Option<ExternalTools<R>>,
}

impl Default for EditorHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHarness {
    /// Create a harness with default settings
    pub fn new() -> Self {
        Self::with_settings(&AppSettings::default())
    }

    /// Harness without external tools
    pub fn with_settings(settings: &AppSettings) -> Self {
        Self::build(settings, None)
    }
}

impl<R: ProcessRunner + 'static> EditorHarness<R> {
    /// Harness that can export, simplify, unfold and re-import
    pub fn with_external(settings: &AppSettings, tools: ExternalTools<R>) -> Self {
        Self::build(settings, Some(tools))
    }

    fn build(settings: &AppSettings, tools: Option<ExternalTools<R>>) -> Self {
        Self {
            controller: InteractionController::new(
                HeadlessSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT),
                Camera::new(Vec3::new(0.0, 0.0, 10.0)),
                settings,
            ),
            tools,
        }
    }

    /// Replace the ray caster
    pub fn with_picker(self, picker: Box<dyn Picker>) -> Self {
        Self {
            controller: self.controller.with_picker(picker),
            tools: self.tools,
        }
    }

    pub fn tools(&self) -> Option<&ExternalTools<R>> {
        self.tools.as_ref()
    }

    // ── Scene content ─────────────────────────────────────────

    pub fn add_box(&mut self, name: &str, center: Vec3, width: f32, height: f32, depth: f32) -> MeshHandle {
        self.controller
            .add_mesh(primitives::box_mesh(center, width, height, depth, name))
    }

    /// Upright cylinder named `GeneratedCylinder`
    pub fn add_cylinder(&mut self, center: Vec3, radius: f32, height: f32) -> MeshHandle {
        self.controller.add_mesh(primitives::cylinder_mesh(
            center,
            radius,
            height,
            CYLINDER_SEGMENTS,
            Vec3::Y,
        ))
    }

    pub fn add_primitive(&mut self, name: &str, primitive: &Primitive) -> MeshHandle {
        self.controller
            .add_mesh(primitives::from_primitive(primitive, name))
    }

    pub fn find(&self, id: MeshId) -> Option<MeshHandle> {
        self.controller.scene().find(id)
    }

    fn require(&self, id: MeshId) -> Result<MeshHandle, EditError> {
        self.find(id).ok_or(EditError::NotInScene(id))
    }

    pub fn clear(&mut self) {
        self.controller.clear();
    }

    // ── Input ─────────────────────────────────────────────────

    pub fn set_tool(&mut self, tool: ToolKind) -> Result<Outcome, EditError> {
        self.controller.set_tool(tool)
    }

    /// Primary-button press and release at one point
    pub fn click(&mut self, at: Pos2) -> Result<(), EditError> {
        self.controller.pointer_down(PointerButton::Primary, at)?;
        self.controller.pointer_up(PointerButton::Primary, at)
    }

    /// Click the pixel a world point projects to
    pub fn click_world(&mut self, point: Vec3) -> Result<bool, EditError> {
        let Some(at) = self.screen_point_of(point) else {
            return Ok(false);
        };
        self.click(at)?;
        Ok(true)
    }

    /// Primary-button drag in `steps` equal moves
    pub fn drag(&mut self, from: Pos2, to: Pos2, steps: usize) -> Result<(), EditError> {
        self.controller.pointer_down(PointerButton::Primary, from)?;
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.controller.pointer_move(from.lerp(to, t))?;
        }
        self.controller.pointer_up(PointerButton::Primary, to)
    }

    /// Rotate-tool drag with the gizmo handle for `axis` grabbed
    pub fn rotate_drag(&mut self, from: Pos2, to: Pos2, axis: Vec3) -> Result<(), EditError> {
        self.controller.pointer_down(PointerButton::Primary, from)?;
        self.controller.begin_rotation(axis);
        self.controller.pointer_move(to)?;
        self.controller.pointer_up(PointerButton::Primary, to)
    }

    /// Undo the last operation
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.controller.undo()
    }

    // ── External tools ────────────────────────────────────────

    fn tools_mut(&mut self) -> Result<&mut ExternalTools<R>, EditError> {
        self.tools
            .as_mut()
            .ok_or(EditError::External(ExternalError::NotConfigured))
    }

    /// Import a model file, normalized like any other import
    pub fn import(&mut self, path: &Path) -> Result<Vec<MeshHandle>, EditError> {
        let meshes = self.tools_mut()?.io.import(path)?;
        Ok(self.controller.load_imported(meshes))
    }

    /// Write every scene mesh to one model file
    pub fn export_scene(&mut self, path: &Path) -> Result<PathBuf, EditError> {
        let tools = self.tools_mut()?;
        let io = tools.io.clone();
        Ok(io.export(self.controller.scene().meshes(), path)?)
    }

    pub fn simplify_mesh(
        &mut self,
        id: MeshId,
        method: Option<SimplifyMethod>,
    ) -> Result<SimplifyRequest, EditError> {
        let target = self.require(id)?;
        let Self { controller, tools, .. } = self;
        let tools = tools
            .as_mut()
            .ok_or(EditError::External(ExternalError::NotConfigured))?;
        controller.simplify_mesh(tools.io.as_ref(), &mut tools.jobs, &target, &tools.work_dir, method)
    }

    pub fn simplify_scene(&mut self, method: Option<SimplifyMethod>) -> Result<SimplifyRequest, EditError> {
        let Self { controller, tools, .. } = self;
        let tools = tools
            .as_mut()
            .ok_or(EditError::External(ExternalError::NotConfigured))?;
        controller.simplify_scene(tools.io.as_ref(), &mut tools.jobs, &tools.work_dir, method)
    }

    /// Unfold a mesh; pages go to `output_dir`, or `unfolded/` in the work dir.
    pub fn unfold_mesh(
        &mut self,
        id: MeshId,
        output_dir: Option<&Path>,
    ) -> Result<UnfoldRequest, EditError> {
        let target = self.require(id)?;
        let Self { controller, tools, .. } = self;
        let tools = tools
            .as_mut()
            .ok_or(EditError::External(ExternalError::NotConfigured))?;
        let output_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| tools.work_dir.join("unfolded"));
        controller.unfold_mesh(tools.io.as_ref(), &mut tools.jobs, &target, &tools.work_dir, &output_dir)
    }

    /// Block until every queued job has finished and apply each result in
    /// completion order. One entry per job.
    pub fn wait_jobs(&mut self) -> Result<Vec<Result<Vec<MeshHandle>, EditError>>, EditError> {
        let Self { controller, tools, .. } = self;
        let tools = tools
            .as_mut()
            .ok_or(EditError::External(ExternalError::NotConfigured))?;
        let mut applied = Vec::new();
        while let Some(result) = tools.runtime.block_on(tools.jobs.next()) {
            applied.push(controller.apply_job_result(tools.io.as_ref(), result));
        }
        Ok(applied)
    }

    // ── Inspection ────────────────────────────────────────────

    /// Number of meshes in the scene
    pub fn mesh_count(&self) -> usize {
        self.controller.scene().len()
    }

    pub fn history_len(&self) -> usize {
        self.controller.history().len()
    }

    pub fn tool(&self) -> ToolKind {
        self.controller.tool()
    }

    pub fn redraw_count(&self) -> usize {
        self.controller.surface().redraw_count()
    }

    /// Pixel position of a world point, `None` when behind the camera
    pub fn screen_point_of(&self, point: Vec3) -> Option<Pos2> {
        let surface = self.controller.surface();
        self.controller
            .camera()
            .project(point, surface.width(), surface.height())
            .map(|(x, y)| Pos2::new(x, y))
    }

    /// Camera position, for assertions
    pub fn camera_position(&self) -> Vec3 {
        self.controller.camera().position()
    }
}
