//! File format handling
//!
//! - [`glb`] - Binary GLB container framing
//! - [`gltf`] - glTF 2.0 JSON document types

pub mod glb;
pub mod gltf;

pub use glb::{GLB_MAGIC, Glb, is_glb, parse_glb, write_glb};
