//! Scene Editor Core Data Structures
//!
//! This crate contains the persisted side of the scene editor:
//! - Transform: position / rotation / scale of a placed object
//! - codec: textual encoding of transforms used by scene documents
//! - SceneDocument: serializable environment parameters and node records

pub mod codec;
pub mod document;
pub mod transform;

pub use codec::*;
pub use document::*;
pub use transform::*;
