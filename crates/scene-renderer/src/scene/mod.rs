//! Scene management for renderable objects.
//!
//! This module separates scene data management from rendering logic: the
//! [`RenderTree`] is the single source of truth for what is drawn, and the
//! GPU side only reads it.

mod bounds;
mod node;

pub use bounds::*;
pub use node::*;

use std::collections::HashMap;

use glam::Vec3;
use scene_core::Transform;

use crate::environment::EnvironmentResources;
use crate::material::Material;
use crate::picking::{self, Intersection, Ray};

/// A top-level instantiated subtree.
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub id: ObjectId,
    /// Root node; its transform is the object's live transform.
    pub root: SceneNode,
}

/// Render tree containing all instantiated objects and the environment.
pub struct RenderTree {
    objects: HashMap<ObjectId, RenderObject>,
    environment: EnvironmentResources,
    dirty: bool,
}

impl RenderTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            environment: EnvironmentResources::new(),
            dirty: false,
        }
    }

    /// Returns true if the tree has been modified since last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the tree as clean (called after rendering).
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Inserts an object subtree.
    pub fn add_object(&mut self, id: ObjectId, root: SceneNode) {
        self.objects.insert(id, RenderObject { id, root });
        self.dirty = true;
    }

    /// Removes an object subtree.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<RenderObject> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&RenderObject> {
        self.objects.get(&id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut RenderObject> {
        self.dirty = true;
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns an iterator over all objects (unordered).
    pub fn objects(&self) -> impl Iterator<Item = &RenderObject> {
        self.objects.values()
    }

    /// Live transform of an object.
    pub fn object_transform(&self, id: ObjectId) -> Option<Transform> {
        self.objects.get(&id).map(|o| o.root.transform)
    }

    /// Moves an object, leaving rotation and scale untouched.
    pub fn set_object_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.root.transform.position = position;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Material of a mesh leaf.
    pub fn material(&self, object: ObjectId, node: NodeId) -> Option<&Material> {
        self.objects
            .get(&object)?
            .root
            .find(node)?
            .mesh
            .as_ref()
            .map(|mesh| &mesh.material)
    }

    /// Swaps the material of a mesh leaf, returning the previous one.
    pub fn set_material(
        &mut self,
        object: ObjectId,
        node: NodeId,
        material: Material,
    ) -> Option<Material> {
        let mesh = self
            .objects
            .get_mut(&object)?
            .root
            .find_mut(node)?
            .mesh
            .as_mut()?;
        self.dirty = true;
        Some(std::mem::replace(&mut mesh.material, material))
    }

    pub fn environment(&self) -> &EnvironmentResources {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut EnvironmentResources {
        self.dirty = true;
        &mut self.environment
    }

    /// Intersects a ray with every mesh leaf and the ground, nearest first.
    pub fn intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for object in self.objects.values() {
            picking::intersect_subtree(ray, object.id, &object.root, &mut hits);
        }
        if let Some(hit) = self.intersect_ground(ray) {
            hits.push(hit);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Intersects a ray with the ground plane only.
    pub fn intersect_ground(&self, ray: &Ray) -> Option<Intersection> {
        self.environment.ground()?.intersect(ray)
    }
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::picking::HitTarget;

    fn cube(owner: Option<ObjectId>, position: Vec3) -> SceneNode {
        let mut leaf = SceneNode::new("cube").with_mesh(Mesh::new(
            Arc::new(Geometry::cuboid(Vec3::ONE)),
            Material::default(),
        ));
        leaf.pick = owner;
        SceneNode::new("object")
            .with_transform(Transform::from_position(position))
            .with_child(leaf)
    }

    #[test]
    fn test_intersections_are_sorted_by_distance() {
        let mut tree = RenderTree::new();
        tree.environment_mut().set_ground("sand", 10, 100.0);

        let near = ObjectId::new();
        let far = ObjectId::new();
        tree.add_object(far, cube(Some(far), Vec3::new(0.0, 0.5, -5.0)));
        tree.add_object(near, cube(Some(near), Vec3::new(0.0, 0.5, 0.0)));

        let ray = Ray::new(Vec3::new(0.1, 0.7, 10.0), Vec3::NEG_Z);
        let hits = tree.intersect(&ray);
        assert_eq!(hits.len(), 2);
        assert!(matches!(hits[0].target, HitTarget::Mesh { object, .. } if object == near));
        assert!(matches!(hits[1].target, HitTarget::Mesh { object, .. } if object == far));
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_ground_is_part_of_full_intersection() {
        let mut tree = RenderTree::new();
        tree.environment_mut().set_ground("sand", 10, 100.0);
        let id = ObjectId::new();
        tree.add_object(id, cube(None, Vec3::new(0.0, 0.5, 0.0)));

        let ray = Ray::new(Vec3::new(0.1, 10.0, 0.2), Vec3::NEG_Y);
        let hits = tree.intersect(&ray);
        assert_eq!(hits.len(), 2);
        assert!(matches!(hits[0].target, HitTarget::Mesh { pick: None, .. }));
        assert_eq!(hits[1].target, HitTarget::Ground);
        assert_eq!(hits[1].point, Vec3::new(0.1, 0.0, 0.2));
    }

    #[test]
    fn test_set_material_returns_previous() {
        let mut tree = RenderTree::new();
        let id = ObjectId::new();
        let root = cube(Some(id), Vec3::ZERO);
        let leaf = root.children[0].id;
        tree.add_object(id, root);

        let red = Material::standard("red", [1.0, 0.0, 0.0, 1.0]);
        let previous = tree.set_material(id, leaf, red.clone()).unwrap();
        assert_eq!(previous, Material::default());
        assert_eq!(tree.material(id, leaf), Some(&red));

        // Group nodes have no material
        let group = tree.get_object(id).unwrap().root.id;
        assert!(tree.set_material(id, group, Material::default()).is_none());
    }

    #[test]
    fn test_set_position_keeps_rotation_and_scale() {
        let mut tree = RenderTree::new();
        let id = ObjectId::new();
        let rotation = glam::Quat::from_rotation_y(0.5);
        tree.add_object(
            id,
            cube(Some(id), Vec3::ZERO)
                .with_transform(Transform::new(Vec3::ONE, rotation, Vec3::splat(3.0))),
        );

        assert!(tree.set_object_position(id, Vec3::new(3.0, 0.0, -2.0)));
        let t = tree.object_transform(id).unwrap();
        assert_eq!(t.position, Vec3::new(3.0, 0.0, -2.0));
        assert_eq!(t.rotation, rotation);
        assert_eq!(t.scale, Vec3::splat(3.0));

        assert!(!tree.set_object_position(ObjectId::new(), Vec3::ZERO));
    }

    #[test]
    fn test_remove_object() {
        let mut tree = RenderTree::new();
        let id = ObjectId::new();
        tree.add_object(id, cube(Some(id), Vec3::ZERO));
        tree.mark_clean();

        assert!(tree.remove_object(id).is_some());
        assert!(tree.is_dirty());
        assert!(tree.is_empty());
        assert!(tree.remove_object(id).is_none());
    }
}
