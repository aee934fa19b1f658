//! User-triggered editor actions

use crate::sources::SourceRef;

/// Actions queued by the UI and processed in order by [`SceneEditor`](crate::SceneEditor)
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Append the nodes of a document to the scene
    LoadScene(SourceRef),
    /// Replace the scene with a document
    ImportScene(SourceRef),
    ClearScene,
    ExportScene,
    SetSkybox(String),
    SetGround { texture: String, repeats: u32 },
}

impl EditorAction {
    /// Human-readable name for logs
    pub fn description(&self) -> &'static str {
        match self {
            EditorAction::LoadScene(_) => "Load Scene",
            EditorAction::ImportScene(_) => "Import Scene",
            EditorAction::ClearScene => "Clear Scene",
            EditorAction::ExportScene => "Export Scene",
            EditorAction::SetSkybox(_) => "Set Skybox",
            EditorAction::SetGround { .. } => "Set Ground",
        }
    }

    /// Whether the action removes or replaces placed objects
    pub fn invalidates_selection(&self) -> bool {
        matches!(self, EditorAction::ImportScene(_) | EditorAction::ClearScene)
    }
}
