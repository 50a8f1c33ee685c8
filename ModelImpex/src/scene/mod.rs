//! Scene graph: nodes, skins, meshes and materials, and their glTF mapping.

pub mod export;
pub mod graph;
pub mod humanoid;
pub mod import;
pub mod material;
pub mod node;

pub use graph::{MeshData, SceneGraph, Traverse};
pub use humanoid::{HumanoidBone, VRM0_EXTENSION, VRM1_EXTENSION, read_humanoid_bones};
pub use material::{AlphaMode, Material};
pub use node::{Node, NodeId, Skin};
