//! JSON command protocol for scripted editor sessions.
//!
//! Each command maps onto one harness call; pointer commands go through the
//! same controller path as live input. Import, export and the process round
//! trips need a harness built with external tools.

use std::path::PathBuf;

use egui::{PointerButton, Pos2};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{Primitive, SimplifyMethod, ToolKind};

use crate::external::{ProcessRunner, SimplifyRequest};
use crate::geometry::{MeshHandle, MeshId};
use crate::harness::EditorHarness;

/// Pointer button as written in scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

impl From<ScriptButton> for PointerButton {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Primary => PointerButton::Primary,
            ScriptButton::Secondary => PointerButton::Secondary,
            ScriptButton::Middle => PointerButton::Middle,
        }
    }
}

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ScriptCommand {
    CreateBox {
        name: String,
        #[serde(default)]
        center: [f32; 3],
        width: f32,
        height: f32,
        depth: f32,
    },
    CreateCylinder {
        #[serde(default)]
        center: [f32; 3],
        radius: f32,
        height: f32,
    },
    /// Any serialized primitive
    CreatePrimitive {
        name: String,
        primitive: Primitive,
    },
    SetTool {
        tool: ToolKind,
    },
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        button: ScriptButton,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
        #[serde(default)]
        button: ScriptButton,
    },
    /// Mouse wheel, in notches
    Scroll {
        notches: f32,
    },
    /// Grab the rotate gizmo handle for `axis`
    BeginRotation {
        axis: [f32; 3],
    },
    /// Undo the last operation.
    Undo,
    FilterBySize {
        threshold: f32,
    },
    BoundingBoxes,
    /// List the scene meshes and editor state.
    Inspect,
    /// Clear the entire scene.
    Clear,
    /// Load a model file into the scene
    Import {
        path: PathBuf,
    },
    ExportScene {
        path: PathBuf,
    },
    /// Queue simplification of one mesh; the method defaults to settings
    SimplifyMesh {
        id: MeshId,
        #[serde(default)]
        method: Option<SimplifyMethod>,
    },
    SimplifyScene {
        #[serde(default)]
        method: Option<SimplifyMethod>,
    },
    UnfoldMesh {
        id: MeshId,
        #[serde(default)]
        output_dir: Option<PathBuf>,
    },
    /// Wait for queued jobs and apply their results.
    WaitJobs,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

impl<E: std::fmt::Display> From<Result<CommandResponse, E>> for CommandResponse {
    fn from(result: Result<CommandResponse, E>) -> Self {
        result.unwrap_or_else(|e| CommandResponse::err(e.to_string()))
    }
}

fn mesh_ids(handles: &[MeshHandle]) -> Vec<MeshId> {
    handles.iter().map(|h| h.id()).collect()
}

fn simplify_data(request: &SimplifyRequest) -> serde_json::Value {
    serde_json::json!({
        "input": request.input.display().to_string(),
        "output": request.output.display().to_string(),
        "method": request.method,
        "ratio": request.ratio,
    })
}

/// Execute a single command on the harness.
pub fn execute_command<R: ProcessRunner + 'static>(
    harness: &mut EditorHarness<R>,
    cmd: ScriptCommand,
) -> CommandResponse {
    match cmd {
        ScriptCommand::CreateBox {
            name,
            center,
            width,
            height,
            depth,
        } => {
            let mesh = harness.add_box(&name, Vec3::from(center), width, height, depth);
            let id = mesh.id();
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        ScriptCommand::CreateCylinder {
            center,
            radius,
            height,
        } => {
            let id = harness.add_cylinder(Vec3::from(center), radius, height).id();
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        ScriptCommand::CreatePrimitive { name, primitive } => {
            let id = harness.add_primitive(&name, &primitive).id();
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        ScriptCommand::SetTool { tool } => harness
            .controller
            .set_tool(tool)
            .map(|outcome| {
                CommandResponse::ok_with_data(serde_json::json!({
                    "tool": tool,
                    "changed": outcome == crate::edit::Outcome::Applied,
                }))
            })
            .into(),

        ScriptCommand::PointerDown { x, y, button } => harness
            .controller
            .pointer_down(button.into(), Pos2::new(x, y))
            .map(|_| CommandResponse::ok())
            .into(),

        ScriptCommand::PointerMove { x, y } => harness
            .controller
            .pointer_move(Pos2::new(x, y))
            .map(|_| CommandResponse::ok())
            .into(),

        ScriptCommand::PointerUp { x, y, button } => harness
            .controller
            .pointer_up(button.into(), Pos2::new(x, y))
            .map(|_| CommandResponse::ok())
            .into(),

        ScriptCommand::Scroll { notches } => {
            harness.controller.scroll(notches);
            CommandResponse::ok()
        }

        ScriptCommand::BeginRotation { axis } => {
            let armed = harness.controller.begin_rotation(Vec3::from(axis));
            CommandResponse::ok_with_data(serde_json::json!({ "armed": armed }))
        }

        ScriptCommand::Undo => harness
            .controller
            .undo()
            .map(|undone| CommandResponse::ok_with_data(serde_json::json!({ "undone": undone })))
            .into(),

        ScriptCommand::FilterBySize { threshold } => {
            let outcome = harness.controller.apply_size_filter(threshold);
            CommandResponse::ok_with_data(serde_json::json!({
                "hidden": outcome.hidden,
                "restored": outcome.restored,
                "mesh_count": harness.controller.scene().len(),
            }))
        }

        ScriptCommand::BoundingBoxes => {
            let meshes = harness.controller.replace_with_bounding_boxes();
            CommandResponse::ok_with_data(serde_json::json!({ "ids": mesh_ids(&meshes) }))
        }

        ScriptCommand::Inspect => {
            let meshes: Vec<serde_json::Value> = harness
                .controller
                .scene()
                .iter()
                .map(|handle| {
                    let mesh = handle.borrow();
                    serde_json::json!({
                        "id": mesh.id(),
                        "name": mesh.name(),
                        "vertex_count": mesh.vertex_count(),
                        "triangle_count": mesh.triangle_count(),
                        "center": mesh.compute_center().to_array(),
                        "dimensions": mesh.compute_dimensions().to_array(),
                        "translation": mesh.translation().to_array(),
                        "orientation": mesh.orientation().to_array(),
                    })
                })
                .collect();
            let selected = harness.controller.state().selection().map(|m| m.id());
            CommandResponse::ok_with_data(serde_json::json!({
                "mesh_count": meshes.len(),
                "meshes": meshes,
                "tool": harness.controller.tool(),
                "selected": selected,
                "history": harness.controller.history().labels(),
            }))
        }

        ScriptCommand::Clear => {
            harness.controller.clear();
            CommandResponse::ok()
        }

        ScriptCommand::Import { path } => harness
            .import(&path)
            .map(|meshes| CommandResponse::ok_with_data(serde_json::json!({ "ids": mesh_ids(&meshes) })))
            .into(),

        ScriptCommand::ExportScene { path } => harness
            .export_scene(&path)
            .map(|written| {
                CommandResponse::ok_with_data(serde_json::json!({ "path": written.display().to_string() }))
            })
            .into(),

        ScriptCommand::SimplifyMesh { id, method } => harness
            .simplify_mesh(id, method)
            .map(|request| CommandResponse::ok_with_data(simplify_data(&request)))
            .into(),

        ScriptCommand::SimplifyScene { method } => harness
            .simplify_scene(method)
            .map(|request| CommandResponse::ok_with_data(simplify_data(&request)))
            .into(),

        ScriptCommand::UnfoldMesh { id, output_dir } => harness
            .unfold_mesh(id, output_dir.as_deref())
            .map(|request| {
                CommandResponse::ok_with_data(serde_json::json!({
                    "input": request.input_model.display().to_string(),
                    "output_dir": request.output_dir.display().to_string(),
                    "file_name": request.file_name,
                }))
            })
            .into(),

        ScriptCommand::WaitJobs => match harness.wait_jobs() {
            Ok(results) => {
                let mut ids = Vec::new();
                let mut errors = Vec::new();
                for result in results {
                    match result {
                        Ok(meshes) => ids.extend(mesh_ids(&meshes)),
                        Err(e) => errors.push(e.to_string()),
                    }
                }
                let data = serde_json::json!({
                    "ids": ids,
                    "mesh_count": harness.controller.scene().len(),
                });
                if errors.is_empty() {
                    CommandResponse::ok_with_data(data)
                } else {
                    CommandResponse {
                        data: Some(data),
                        ..CommandResponse::err(errors.join("; "))
                    }
                }
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json<R: ProcessRunner + 'static>(
    harness: &mut EditorHarness<R>,
    json: &str,
) -> Result<CommandResponse, String> {
    let cmd: ScriptCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch<R: ProcessRunner + 'static>(
    harness: &mut EditorHarness<R>,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ScriptCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
