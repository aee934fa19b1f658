//! Scene document store
//!
//! Owns the render tree plus the ordered list of objects the pipeline
//! instantiated, and the environment parameters they were loaded with.

use std::sync::Arc;

use parking_lot::Mutex;
use scene_core::{Environment, Transform};
use scene_renderer::{ObjectId, RenderTree, SceneNode};

/// Shared store handle
pub type SharedSceneStore = Arc<Mutex<SceneStore>>;

/// An object placed in the scene from a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiatedObject {
    pub id: ObjectId,
    pub template_id: String,
}

/// Scene state read by the renderer and written by the pipeline
pub struct SceneStore {
    render: RenderTree,
    environment: Environment,
    ground_size: f32,
    loaded: Vec<InstantiatedObject>,
}

impl SceneStore {
    /// Creates a store and applies the initial environment to the render tree
    pub fn new(environment: Environment, ground_size: f32) -> Self {
        let mut store = Self {
            render: RenderTree::new(),
            environment: environment.clone(),
            ground_size,
            loaded: Vec::new(),
        };
        store.apply_environment(&environment);
        store
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Objects in load order
    pub fn loaded_objects(&self) -> &[InstantiatedObject] {
        &self.loaded
    }

    pub fn object_transform(&self, id: ObjectId) -> Option<Transform> {
        self.render.object_transform(id)
    }

    pub fn render(&self) -> &RenderTree {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderTree {
        &mut self.render
    }

    /// Appends an instantiated object under the id its leaves were tagged with
    pub fn push_object(&mut self, id: ObjectId, template_id: impl Into<String>, root: SceneNode) {
        self.render.add_object(id, root);
        self.loaded.push(InstantiatedObject {
            id,
            template_id: template_id.into(),
        });
    }

    /// Removes every instantiated object; the environment is untouched
    pub fn clear(&mut self) -> usize {
        let removed = self.loaded.len();
        for object in self.loaded.drain(..) {
            self.render.remove_object(object.id);
        }
        tracing::info!("Cleared {} objects", removed);
        removed
    }

    /// Swaps environment and objects in one step
    pub fn replace(
        &mut self,
        environment: Environment,
        objects: Vec<(ObjectId, String, SceneNode)>,
    ) {
        self.clear();
        self.apply_environment(&environment);
        self.environment = environment;
        for (id, template_id, root) in objects {
            self.push_object(id, template_id, root);
        }
    }

    pub fn set_ground(&mut self, texture: &str, repeats: u32) {
        self.environment.ground_texture = texture.to_string();
        self.environment.ground_repeats = repeats;
        self.render
            .environment_mut()
            .set_ground(texture, repeats, self.ground_size);
        tracing::info!("Ground set to {} (x{})", texture, repeats);
    }

    pub fn set_sky(&mut self, image: &str) {
        self.environment.sky_image = image.to_string();
        self.render.environment_mut().set_sky(image);
        tracing::info!("Sky set to {}", image);
    }

    fn apply_environment(&mut self, environment: &Environment) {
        let resources = self.render.environment_mut();
        resources.set_ground(
            &environment.ground_texture,
            environment.ground_repeats,
            self.ground_size,
        );
        resources.set_sky(&environment.sky_image);
    }
}

/// Creates a shared store
pub fn create_shared_store(environment: Environment, ground_size: f32) -> SharedSceneStore {
    Arc::new(Mutex::new(SceneStore::new(environment, ground_size)))
}
