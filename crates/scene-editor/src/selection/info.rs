//! Info panel collaborator

use scene_core::{Transform, encode_display_quat, encode_display_vec3};

/// What the info panel shows for the selected object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInfo {
    pub name: String,
    pub position: String,
    pub rotation: String,
    pub scale: String,
}

impl SelectionInfo {
    pub fn new(name: impl Into<String>, transform: &Transform) -> Self {
        Self {
            name: name.into(),
            position: encode_display_vec3(transform.position),
            rotation: encode_display_quat(transform.rotation),
            scale: encode_display_vec3(transform.scale),
        }
    }
}

/// Displays details of the current selection
pub trait InfoDisplay: Send {
    fn show(&mut self, info: &SelectionInfo);
    fn hide(&mut self);
}

/// Writes selection details to the log
#[derive(Debug, Default)]
pub struct TracingInfoDisplay {
    visible: bool,
}

impl TracingInfoDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl InfoDisplay for TracingInfoDisplay {
    fn show(&mut self, info: &SelectionInfo) {
        self.visible = true;
        tracing::info!(
            name = %info.name,
            position = %info.position,
            rotation = %info.rotation,
            scale = %info.scale,
            "Selected object"
        );
    }

    fn hide(&mut self) {
        if self.visible {
            tracing::debug!("Selection info hidden");
        }
        self.visible = false;
    }
}
