//! Render-side scene representation
//!
//! The renderer reads a [`RenderTree`] every frame. This crate owns the tree
//! structure, materials, environment resources and ray picking; GPU work and
//! camera math live outside and talk to it through these types.

pub mod environment;
pub mod material;
pub mod picking;
pub mod scene;

pub use environment::{
    EnvironmentResources, GroundPlane, SkyBackground, TextureHandle, TextureRegistry,
};
pub use material::Material;
pub use picking::{HitTarget, Intersection, Ray};
pub use scene::*;
