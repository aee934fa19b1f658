//! Ground and sky resources.
//!
//! Environment textures are reference counted in a [`TextureRegistry`] so
//! that replacing the ground or the sky releases whatever the previous one
//! held.

use std::collections::HashMap;

use glam::Vec3;

use crate::picking::{self, Intersection, HitTarget, Ray};

/// Reference to a texture held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(String);

/// Reference counted set of live environment textures.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    live: HashMap<String, usize>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a texture, loading it on first use.
    pub fn acquire(&mut self, key: &str) -> TextureHandle {
        let count = self.live.entry(key.to_string()).or_insert(0);
        if *count == 0 {
            tracing::debug!("Loading texture {}", key);
        }
        *count += 1;
        TextureHandle(key.to_string())
    }

    /// Releases a texture, freeing it when the last handle goes away.
    pub fn release(&mut self, handle: TextureHandle) {
        if let Some(count) = self.live.get_mut(&handle.0) {
            *count -= 1;
            if *count == 0 {
                self.live.remove(&handle.0);
                tracing::debug!("Released texture {}", handle.0);
            }
        }
    }

    /// Number of distinct textures currently alive.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, key: &str) -> bool {
        self.live.contains_key(key)
    }
}

/// Textured ground plane lying in XZ.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundPlane {
    pub texture: TextureHandle,
    /// Texture tiling across the plane.
    pub repeats: u32,
    /// Edge length of the square plane.
    pub size: f32,
    /// Y coordinate of the plane.
    pub height: f32,
}

impl GroundPlane {
    /// Intersects a ray with the bounded plane.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let origin = Vec3::new(0.0, self.height, 0.0);
        let t = picking::ray_plane_intersection(ray, origin, Vec3::Y)?;
        let point = ray.at(t);
        let half = self.size / 2.0;
        if point.x.abs() <= half && point.z.abs() <= half {
            Some(Intersection {
                distance: t,
                point,
                target: HitTarget::Ground,
            })
        } else {
            None
        }
    }
}

/// Equirectangular sky image.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyBackground {
    pub texture: TextureHandle,
}

/// Environment rendering resources owned by the render tree.
#[derive(Debug, Default)]
pub struct EnvironmentResources {
    ground: Option<GroundPlane>,
    sky: Option<SkyBackground>,
    textures: TextureRegistry,
}

impl EnvironmentResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ground(&self) -> Option<&GroundPlane> {
        self.ground.as_ref()
    }

    pub fn sky(&self) -> Option<&SkyBackground> {
        self.sky.as_ref()
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    /// Creates or re-textures the ground, releasing the previous texture.
    pub fn set_ground(&mut self, texture: &str, repeats: u32, size: f32) {
        let handle = self.textures.acquire(texture);
        let previous = self.ground.replace(GroundPlane {
            texture: handle,
            repeats,
            size,
            height: 0.0,
        });
        if let Some(previous) = previous {
            self.textures.release(previous.texture);
        }
    }

    /// Replaces the sky image, releasing the previous one.
    pub fn set_sky(&mut self, image: &str) {
        let handle = self.textures.acquire(image);
        if let Some(previous) = self.sky.replace(SkyBackground { texture: handle }) {
            self.textures.release(previous.texture);
        }
    }
}
