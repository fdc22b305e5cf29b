//! Export → external process → re-import round trips.
//!
//! Each operation writes its input through `MeshIo`, builds the process
//! request from settings and hands it to the `JobQueue`. Finished jobs come
//! back through `apply_job_result`.

use std::path::{Path, PathBuf};

use shared::SimplifyMethod;

use super::InteractionController;
use crate::edit::EditError;
use crate::external::mesh_io::MeshIo;
use crate::external::{ratio_from_percent, JobQueue, ProcessRunner, SimplifyRequest, UnfoldRequest};
use crate::geometry::MeshHandle;
use crate::viewport::RenderSurface;

impl<S: RenderSurface> InteractionController<S> {
    /// Method from settings unless overridden
    fn simplify_method(&self, method: Option<SimplifyMethod>) -> SimplifyMethod {
        method.unwrap_or(self.simplification.method)
    }

    fn simplify_request(&self, input: PathBuf, output: PathBuf, method: SimplifyMethod) -> SimplifyRequest {
        SimplifyRequest {
            input,
            output,
            method,
            ratio: ratio_from_percent(self.simplification.ratio_percent),
        }
    }

    fn require_in_scene(&self, mesh: &MeshHandle) -> Result<(), EditError> {
        if self.scene.contains(mesh) {
            Ok(())
        } else {
            Err(EditError::NotInScene(mesh.id()))
        }
    }

    /// Simplify one mesh; the result replaces it in place.
    pub fn simplify_mesh<R: ProcessRunner + 'static>(
        &self,
        io: &dyn MeshIo,
        jobs: &mut JobQueue<R>,
        target: &MeshHandle,
        work_dir: &Path,
        method: Option<SimplifyMethod>,
    ) -> Result<SimplifyRequest, EditError> {
        self.require_in_scene(target)?;
        let id = target.id();
        let input = io.export(
            std::slice::from_ref(target),
            &work_dir.join(format!("simplify_{id}.obj")),
        )?;
        let method = self.simplify_method(method);
        let output = work_dir.join(format!("simplified_{}_{id}.obj", method.as_str()));
        let request = self.simplify_request(input, output, method);

        tracing::info!("Queued {} of '{}'", request.method.display_name(), target.borrow().name());
        jobs.submit_simplify(Some(id), request.clone());
        Ok(request)
    }

    /// Simplify the whole scene; the result replaces every mesh.
    pub fn simplify_scene<R: ProcessRunner + 'static>(
        &self,
        io: &dyn MeshIo,
        jobs: &mut JobQueue<R>,
        work_dir: &Path,
        method: Option<SimplifyMethod>,
    ) -> Result<SimplifyRequest, EditError> {
        if self.scene.is_empty() {
            return Err(EditError::EmptyScene);
        }
        let input = io.export(self.scene.meshes(), &work_dir.join("scene_to_simplify.obj"))?;
        let method = self.simplify_method(method);
        let output = work_dir.join(format!("simplified_scene_{}.obj", method.as_str()));
        let request = self.simplify_request(input, output, method);

        tracing::info!("Queued {} of {} meshes", request.method.display_name(), self.scene.len());
        jobs.submit_simplify(None, request.clone());
        Ok(request)
    }

    /// Unfold one mesh into printable pages under `output_dir`, named after
    /// the mesh, with page size and format from settings.
    pub fn unfold_mesh<R: ProcessRunner + 'static>(
        &self,
        io: &dyn MeshIo,
        jobs: &mut JobQueue<R>,
        target: &MeshHandle,
        work_dir: &Path,
        output_dir: &Path,
    ) -> Result<UnfoldRequest, EditError> {
        self.require_in_scene(target)?;
        let input_model = io.export(
            std::slice::from_ref(target),
            &work_dir.join(format!("unfold_{}.obj", target.id())),
        )?;
        let request = UnfoldRequest {
            input_model,
            output_dir: output_dir.to_path_buf(),
            file_name: file_stem_for(target.borrow().name()),
            page: self.unfolding.page,
            format: self.unfolding.format,
        };

        tracing::info!(
            "Queued unfolding of '{}' on {}x{}",
            target.borrow().name(),
            request.page.width,
            request.page.height
        );
        jobs.submit_unfold(request.clone());
        Ok(request)
    }
}

/// Mesh name reduced to a portable file stem
fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unfolded".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use glam::Vec3;
    use shared::{ExportFormat, PageSize};
    use tokio::runtime::Handle;

    use super::*;
    use crate::external::{JobResult, ProcessOutput, Simplifier, Unfolder};
    use crate::fixtures::{self, MemoryMeshIo, ScriptedRunner};
    use crate::state::settings::AppSettings;
    use crate::viewport::{Camera, HeadlessSurface};

    fn controller(settings: &AppSettings) -> InteractionController<HeadlessSurface> {
        InteractionController::new(
            HeadlessSurface::new(800.0, 600.0),
            Camera::new(Vec3::new(0.0, 0.0, 10.0)),
            settings,
        )
    }

    fn queue(runner: Arc<ScriptedRunner>, script: &Path) -> JobQueue<ScriptedRunner> {
        let timeout = Duration::from_secs(1);
        JobQueue::new(
            Handle::current(),
            Simplifier::new(runner.clone(), "simplify", timeout),
            Unfolder::new(runner, "blender", script, timeout, 3),
        )
    }

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("Wheel left"), "Wheel_left");
        assert_eq!(file_stem_for(""), "unfolded");
    }

    #[tokio::test]
    async fn test_simplify_mesh_exports_and_uses_settings() {
        let mut settings = AppSettings::default();
        settings.simplification.method = SimplifyMethod::VertexClustering;
        settings.simplification.ratio_percent = 5.0;
        let mut c = controller(&settings);
        let a = c.add_mesh(fixtures::box_corners("part", Vec3::ZERO, Vec3::ONE));

        let runner = Arc::new(ScriptedRunner::new(vec![]));
        let mut jobs = queue(runner.clone(), Path::new("unused.py"));
        let io = MemoryMeshIo::default();
        let work = Path::new("work");

        let request = c.simplify_mesh(&io, &mut jobs, &a, work, None).unwrap();
        assert!(io.contains(&request.input));
        assert_eq!(request.method, SimplifyMethod::VertexClustering);
        assert_eq!(request.ratio, 0.1);
        assert_eq!(
            request.output,
            work.join(format!("simplified_vertex_clustering_{}.obj", a.id()))
        );

        io.insert(request.output.clone(), vec![fixtures::unit_triangle("decimated")]);
        let result = jobs.next().await.unwrap();
        let applied = c.apply_job_result(&io, result).unwrap();
        assert_eq!(c.scene().meshes(), applied.as_slice());
        assert_eq!(applied[0].borrow().name(), "part");
        assert_eq!(runner.calls()[0].1[2], "vertex_clustering");
    }

    #[tokio::test]
    async fn test_simplify_scene_replaces_everything() {
        let mut c = controller(&AppSettings::default());
        c.add_mesh(fixtures::unit_triangle("a"));
        c.add_mesh(fixtures::unit_triangle("b"));

        let runner = Arc::new(ScriptedRunner::new(vec![]));
        let mut jobs = queue(runner, Path::new("unused.py"));
        let io = MemoryMeshIo::default();

        let request = c
            .simplify_scene(&io, &mut jobs, Path::new("work"), Some(SimplifyMethod::FastQuadricDecimation))
            .unwrap();
        assert_eq!(request.output, Path::new("work/simplified_scene_fast_quadric_decimation.obj"));
        assert_eq!(io.import(&request.input).unwrap().len(), 2);

        io.insert(request.output.clone(), vec![fixtures::unit_triangle("merged")]);
        let applied = c.apply_job_result(&io, jobs.next().await.unwrap()).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(c.scene().len(), 1);
        assert_eq!(c.candidates().len(), 1);
    }

    #[tokio::test]
    async fn test_simplify_scene_needs_meshes() {
        let c = controller(&AppSettings::default());
        let mut jobs = queue(Arc::new(ScriptedRunner::new(vec![])), Path::new("unused.py"));
        let err = c
            .simplify_scene(&MemoryMeshIo::default(), &mut jobs, Path::new("work"), None)
            .unwrap_err();
        assert!(matches!(err, EditError::EmptyScene));
        assert_eq!(jobs.pending(), 0);
    }

    #[tokio::test]
    async fn test_simplify_mesh_outside_scene_is_rejected() {
        let c = controller(&AppSettings::default());
        let stray = MeshHandle::new(fixtures::unit_triangle("stray"));
        let mut jobs = queue(Arc::new(ScriptedRunner::new(vec![])), Path::new("unused.py"));
        let err = c
            .simplify_mesh(&MemoryMeshIo::default(), &mut jobs, &stray, Path::new("work"), None)
            .unwrap_err();
        assert!(matches!(err, EditError::NotInScene(id) if id == stray.id()));
    }

    #[tokio::test]
    async fn test_unfold_mesh_uses_page_and_format_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("unfold.py");
        std::fs::write(&script, "").unwrap();

        let mut settings = AppSettings::default();
        settings.unfolding.page = PageSize::new(30.0, 20.0);
        settings.unfolding.format = ExportFormat::Pdf;
        let mut c = controller(&settings);
        let a = c.add_mesh(fixtures::unit_triangle("Left wing"));

        let runner = Arc::new(ScriptedRunner::new(vec![ProcessOutput {
            status: Some(0),
            ..Default::default()
        }]));
        let mut jobs = queue(runner.clone(), &script);
        let io = MemoryMeshIo::default();

        let request = c
            .unfold_mesh(&io, &mut jobs, &a, Path::new("work"), Path::new("pages"))
            .unwrap();
        assert!(io.contains(&request.input_model));
        assert_eq!(request.file_name, "Left_wing");
        assert_eq!(request.page, PageSize::new(30.0, 20.0));

        let result = jobs.next().await.unwrap();
        assert!(matches!(&result, JobResult::Unfolded { result: Ok(_), .. }));
        assert!(c.apply_job_result(&io, result).unwrap().is_empty());
        let args = &runner.calls()[0].1;
        assert_eq!(&args[args.len() - 6..], &["--dw", "30", "--dh", "20", "--ext", "PDF"]);
    }
}
