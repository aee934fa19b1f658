//! Template asset loading
//!
//! A template is the immutable render subtree a model file decodes to. The
//! model cache only ever clones templates; it never places them in the scene.

mod gltf_loader;

pub use gltf_loader::GltfTemplateLoader;

use std::sync::Arc;

use futures::future::BoxFuture;
use scene_renderer::SceneNode;

/// Immutable clone source shared by the cache
pub type Template = Arc<SceneNode>;

/// Loading a template failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to load template '{template_id}': {reason}")]
pub struct TemplateLoadError {
    pub template_id: String,
    pub reason: String,
}

impl TemplateLoadError {
    pub fn new(template_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            template_id: template_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Produces template subtrees from template ids
pub trait TemplateLoader: Send + Sync {
    /// Starts loading a template; the returned future owns everything it needs.
    fn load_template(&self, template_id: &str)
    -> BoxFuture<'static, Result<SceneNode, TemplateLoadError>>;
}
