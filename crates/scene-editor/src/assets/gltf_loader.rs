//! glTF binary (`.glb`) template loading

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use glam::{Quat, Vec3};
use scene_core::Transform;
use scene_renderer::{Geometry, Material, Mesh, SceneNode};

use super::{TemplateLoadError, TemplateLoader};
use crate::task::run_blocking;

/// Loads `<models_dir>/<template_id>.glb` on a worker thread
#[derive(Debug, Clone)]
pub struct GltfTemplateLoader {
    models_dir: PathBuf,
}

impl GltfTemplateLoader {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn path_for(&self, template_id: &str) -> PathBuf {
        self.models_dir.join(format!("{template_id}.glb"))
    }
}

impl TemplateLoader for GltfTemplateLoader {
    fn load_template(
        &self,
        template_id: &str,
    ) -> BoxFuture<'static, Result<SceneNode, TemplateLoadError>> {
        let path = self.path_for(template_id);
        let id = template_id.to_string();
        let cancelled_id = id.clone();
        tracing::info!("Loading glTF model: {:?}", path);

        run_blocking(
            "gltf-loader",
            move || load_glb(&id, &path),
            move || TemplateLoadError::new(cancelled_id, "loader thread stopped"),
        )
    }
}

/// Decode a glTF file into a template subtree rooted at a node named after the template
pub fn load_glb(template_id: &str, path: &Path) -> Result<SceneNode, TemplateLoadError> {
    let fail = |reason: String| TemplateLoadError::new(template_id, reason);

    let (document, buffers, _images) = gltf::import(path).map_err(|e| fail(e.to_string()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| fail("file contains no scene".into()))?;

    let mut root = SceneNode::new(template_id);
    for node in scene.nodes() {
        root.children.push(convert_node(&node, &buffers).map_err(fail)?);
    }

    if root.mesh_count() == 0 {
        return Err(fail("file contains no triangle meshes".into()));
    }

    Ok(root)
}

fn convert_node(node: &gltf::Node, buffers: &[gltf::buffer::Data]) -> Result<SceneNode, String> {
    let name = node.name().unwrap_or("node").to_string();
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut out = SceneNode::new(name.clone()).with_transform(Transform::new(
        Vec3::from(translation),
        Quat::from_array(rotation),
        Vec3::from(scale),
    ));

    if let Some(mesh) = node.mesh() {
        let mut meshes = Vec::new();
        for primitive in mesh.primitives() {
            if let Some(converted) = convert_primitive(&primitive, buffers)? {
                meshes.push(converted);
            }
        }

        // A single primitive lives on the node itself, several become children
        if meshes.len() == 1 {
            out.mesh = meshes.pop();
        } else {
            for (i, m) in meshes.into_iter().enumerate() {
                out.children
                    .push(SceneNode::new(format!("{name}.{i}")).with_mesh(m));
            }
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, buffers)?);
    }

    Ok(out)
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Result<Option<Mesh>, String> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::debug!("Skipping primitive with mode {:?}", primitive.mode());
        return Ok(None);
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| "primitive without positions".to_string())?
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let material = primitive.material();
    let converted = Material::standard(
        material.name().unwrap_or("material"),
        material.pbr_metallic_roughness().base_color_factor(),
    )
    .with_emissive(material.emissive_factor());

    Ok(Some(Mesh::new(
        Arc::new(Geometry::new(positions, indices)),
        converted,
    )))
}
