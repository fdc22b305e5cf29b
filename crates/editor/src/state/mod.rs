pub mod scene;
pub mod settings;

pub use scene::{CommandHistory, MeshSummary, Scene, SceneEvent};
pub use settings::AppSettings;
