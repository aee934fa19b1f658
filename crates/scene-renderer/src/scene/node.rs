//! Scene graph nodes.

use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use scene_core::Transform;
use uuid::Uuid;

use super::BoundingBox;
use crate::material::Material;

/// Handle of an instantiated object in the render tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies a single node inside a render subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable triangle data, shared between all copies of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
}

impl Geometry {
    pub fn new(vertices: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::from_points(&vertices);
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            [-h.x, -h.y, -h.z],
            [h.x, -h.y, -h.z],
            [h.x, h.y, -h.z],
            [-h.x, h.y, -h.z],
            [-h.x, -h.y, h.z],
            [h.x, -h.y, h.z],
            [h.x, h.y, h.z],
            [-h.x, h.y, h.z],
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(vertices, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Renderable leaf data.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// A node of a render subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    /// Owning object, set on selectable leaves.
    pub pick: Option<ObjectId>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform: Transform::IDENTITY,
            mesh: None,
            pick: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visits every node depth-first with its accumulated world matrix.
    pub fn visit(&self, parent: Mat4, f: &mut impl FnMut(&SceneNode, Mat4)) {
        let world = parent * self.transform.to_mat4();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    /// Mutable depth-first visit (no world matrices).
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Number of nodes carrying a mesh.
    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.visit(Mat4::IDENTITY, &mut |node, _| {
            if node.mesh.is_some() {
                count += 1;
            }
        });
        count
    }

    /// Deep copy with fresh node ids.
    ///
    /// Geometry stays shared (it is immutable), materials and transforms are
    /// copied so the result can be positioned and highlighted on its own.
    pub fn deep_copy(&self) -> SceneNode {
        SceneNode {
            id: NodeId::new(),
            name: self.name.clone(),
            transform: self.transform,
            mesh: self.mesh.clone(),
            pick: self.pick,
            children: self.children.iter().map(SceneNode::deep_copy).collect(),
        }
    }
}
