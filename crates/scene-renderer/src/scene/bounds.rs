//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Computes the bounds of a point set (empty sets give a zero box).
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let mut min = Vec3::from(*first);
        let mut max = min;
        for p in &points[1..] {
            let p = Vec3::from(*p);
            min = min.min(p);
            max = max.max(p);
        }

        Self { min, max }
    }

    /// Transforms the box, returning the world-space AABB of its 8 corners.
    pub fn transform(&self, matrix: &Mat4) -> BoundingBox {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut world_min = matrix.transform_point3(corners[0]);
        let mut world_max = world_min;
        for corner in &corners[1..] {
            let p = matrix.transform_point3(*corner);
            world_min = world_min.min(p);
            world_max = world_max.max(p);
        }

        BoundingBox {
            min: world_min,
            max: world_max,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let b = BoundingBox::from_points(&[[1.0, -2.0, 0.0], [-1.0, 3.0, 0.5]]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
        assert_eq!(BoundingBox::from_points(&[]), BoundingBox::default());
    }

    #[test]
    fn test_transform_translates_corners() {
        let b = BoundingBox::new(Vec3::splat(-1.0), Vec3::ONE);
        let moved = b.transform(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
        assert_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
    }
}
