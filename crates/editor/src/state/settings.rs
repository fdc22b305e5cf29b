//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{ExportFormat, PageSize, Rgb, SimplifyMethod};

/// Camera and mesh-manipulation sensitivities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Degrees of yaw per pixel of middle-button drag
    pub camera_yaw_sensitivity: f32,
    /// Degrees of pitch per pixel of middle-button drag
    pub camera_pitch_sensitivity: f32,
    /// World units per full-surface right-button drag
    pub camera_pan_sensitivity: f32,
    /// World units per wheel notch
    pub zoom_sensitivity: f32,
    /// World units per pixel of move-tool drag
    pub mesh_move_sensitivity: f32,
    /// Degrees per pixel of rotate-tool drag
    pub mesh_rotation_sensitivity: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            camera_yaw_sensitivity: 0.2,
            camera_pitch_sensitivity: 0.2,
            camera_pan_sensitivity: 10.0,
            zoom_sensitivity: 1.0,
            mesh_move_sensitivity: 0.2,
            mesh_rotation_sensitivity: 0.2,
        }
    }
}

/// Named colors from the palette in `shared`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingSettings {
    pub mesh_color: String,
    pub highlight_color: String,
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self {
            mesh_color: "red".to_string(),
            highlight_color: "cyan".to_string(),
        }
    }
}

/// Locations of the external tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSettings {
    pub simplifier_path: PathBuf,
    pub blender_path: PathBuf,
    pub unfold_script_path: PathBuf,
    /// Scratch directory for exported inputs and process outputs
    pub work_dir: PathBuf,
    /// Per-invocation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExternalSettings {
    fn default() -> Self {
        Self {
            simplifier_path: PathBuf::from("simplify"),
            blender_path: PathBuf::from("blender"),
            unfold_script_path: PathBuf::from("scripts/unfold.py"),
            work_dir: std::env::temp_dir().join("unbox-editor"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnfoldingSettings {
    pub page: PageSize,
    pub format: ExportFormat,
    /// Page-enlarging retries before giving up
    pub max_attempts: u32,
}

impl Default for UnfoldingSettings {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            format: ExportFormat::Svg,
            max_attempts: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplificationSettings {
    pub method: SimplifyMethod,
    /// Target size in percent of the input, clamped to 10..=100
    pub ratio_percent: f32,
}

impl Default for SimplificationSettings {
    fn default() -> Self {
        Self {
            method: SimplifyMethod::QuadricEdgeCollapse,
            ratio_percent: 50.0,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub ui: UiSettings,
    pub rendering: RenderingSettings,
    pub external: ExternalSettings,
    pub unfolding: UnfoldingSettings,
    pub simplification: SimplificationSettings,
}

impl AppSettings {
    /// Load settings from the user config dir, or return defaults
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit file; missing or broken files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("No settings at {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to the user config dir
    pub fn save(&self) {
        let Some(path) = config_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::warn!("Failed to save settings to {}: {e}", path.display());
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Named numeric lookup used by the interaction controller
    pub fn lookup(&self, name: &str) -> Option<f32> {
        let ui = &self.ui;
        match name {
            "CameraYawSensitivity" => Some(ui.camera_yaw_sensitivity),
            "CameraPitchSensitivity" => Some(ui.camera_pitch_sensitivity),
            "CameraPanSensitivity" => Some(ui.camera_pan_sensitivity),
            "ZoomSensitivity" => Some(ui.zoom_sensitivity),
            "MeshMoveSensitivity" => Some(ui.mesh_move_sensitivity),
            "MeshRotationSensitivity" => Some(ui.mesh_rotation_sensitivity),
            _ => None,
        }
    }

    /// Color for imported meshes; grey when the name is unknown
    pub fn mesh_color(&self) -> Rgb {
        shared::named_color(&self.rendering.mesh_color).unwrap_or(shared::GREY)
    }

    pub fn highlight_color(&self) -> Rgb {
        shared::named_color(&self.rendering.highlight_color).unwrap_or(shared::CYAN)
    }
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "unbox3d", "unbox-editor")
        .map(|dirs| dirs.config_dir().join("settings.json"))
}
