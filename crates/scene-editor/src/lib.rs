//! Scene editor core
//!
//! Persistence and interaction for a 3D scene editor:
//! - cache: one template per model, shared between concurrent loads
//! - store: the placed objects and environment the renderer reads
//! - pipeline: load / import / export of scene documents
//! - selection: click to select, `g` to drag the selection along the ground
//! - editor: facade processing queued user actions

pub mod actions;
pub mod assets;
pub mod cache;
pub mod config;
pub mod editor;
pub mod logging;
pub mod pipeline;
pub mod selection;
pub mod sources;
pub mod store;
pub mod task;

#[cfg(test)]
mod testing;

pub use actions::EditorAction;
pub use assets::{GltfTemplateLoader, Template, TemplateLoadError, TemplateLoader};
pub use cache::ModelCache;
pub use config::{EditorConfig, SharedConfig, create_shared_config};
pub use editor::SceneEditor;
pub use pipeline::{LoadReport, PipelineError, PipelineState, ScenePipeline};
pub use selection::{
    InfoDisplay, PickTarget, Selection, SelectionController, SelectionEffect, SelectionEvent,
    SelectionInfo, SelectionState, TracingInfoDisplay,
};
pub use sources::{
    DefaultDocumentSource, DirectorySink, DocumentSink, DocumentSource, SourceError, SourceRef,
};
pub use store::{InstantiatedObject, SceneStore, SharedSceneStore, create_shared_store};
