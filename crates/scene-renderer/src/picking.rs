//! Ray picking against the render tree

use glam::{Mat4, Vec3};

use crate::scene::{NodeId, ObjectId, SceneNode};

/// World-space ray; the direction is always normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// What a ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A mesh leaf of an object. `pick` is the owning object when the leaf is
    /// tagged selectable.
    Mesh {
        object: ObjectId,
        node: NodeId,
        pick: Option<ObjectId>,
    },
    Ground,
}

/// A single ray hit, ordered by distance from the ray origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub point: Vec3,
    pub target: HitTarget,
}

/// Collects the closest hit on every mesh leaf of `root`.
pub(crate) fn intersect_subtree(
    ray: &Ray,
    object: ObjectId,
    root: &SceneNode,
    hits: &mut Vec<Intersection>,
) {
    root.visit(Mat4::IDENTITY, &mut |node, world| {
        let Some(mesh) = &node.mesh else {
            return;
        };
        let geometry = &mesh.geometry;

        // Early rejection against the world-space bounds
        let bounds = geometry.bounds.transform(&world);
        if ray_aabb_intersection(ray, bounds.min, bounds.max).is_none() {
            return;
        }

        let mut closest: Option<f32> = None;
        for chunk in geometry.indices.chunks(3) {
            if chunk.len() != 3 {
                continue;
            }
            let [Some(a), Some(b), Some(c)] =
                [chunk[0], chunk[1], chunk[2]].map(|i| geometry.vertices.get(i as usize))
            else {
                continue;
            };

            let v0 = world.transform_point3(Vec3::from(*a));
            let v1 = world.transform_point3(Vec3::from(*b));
            let v2 = world.transform_point3(Vec3::from(*c));

            if let Some(t) = ray_triangle_intersection(ray, v0, v1, v2)
                && closest.is_none_or(|current| t < current)
            {
                closest = Some(t);
            }
        }

        if let Some(t) = closest {
            hits.push(Intersection {
                distance: t,
                point: ray.at(t),
                target: HitTarget::Mesh {
                    object,
                    node: node.id,
                    pick: node.pick,
                },
            });
        }
    });
}

/// Ray-AABB (Axis-Aligned Bounding Box) intersection test
/// Returns the distance to intersection if hit, None otherwise
pub fn ray_aabb_intersection(ray: &Ray, bbox_min: Vec3, bbox_max: Vec3) -> Option<f32> {
    let inv_dir = ray.direction.recip();

    let t1 = (bbox_min - ray.origin) * inv_dir;
    let t2 = (bbox_max - ray.origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Ray-triangle intersection using Möller–Trumbore algorithm
/// Returns the distance to intersection if hit, None otherwise
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-6;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    if a.abs() < EPSILON {
        return None; // Ray is parallel to triangle
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON { Some(t) } else { None }
}

/// Calculate ray-plane intersection.
///
/// Returns the distance along the ray, or None if the ray is parallel to the
/// plane or the plane is behind the origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(normal);

    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (plane_point - ray.origin).dot(normal) / denom;

    if t > 0.0 { Some(t) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::NEG_Z);
        let t = ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert_relative_eq!(t, 5.0);

        let miss = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(ray_triangle_intersection(&miss, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_aabb_hit_from_outside_and_inside() {
        let outside = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray_aabb_intersection(&outside, Vec3::splat(-1.0), Vec3::ONE).unwrap();
        assert_relative_eq!(t, 9.0);

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_aabb_intersection(&inside, Vec3::splat(-1.0), Vec3::ONE).unwrap();
        assert_relative_eq!(t, 1.0);

        let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray_aabb_intersection(&away, Vec3::splat(-1.0), Vec3::ONE).is_none());
    }

    #[test]
    fn test_plane_parallel_ray() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Y).is_none());
    }
}
