//! glTF 2.0 JSON document model.
//!
//! Plain serde types mirroring the glTF schema; the scene importer and
//! exporter translate between these and [`crate::scene::SceneGraph`].

mod materials;
mod types;

pub use types::{
    GltfAccessor, GltfAccessorSparse, GltfAsset, GltfBuffer, GltfBufferView, GltfDocument,
    GltfMesh, GltfNode, GltfPrimitive, GltfScene, GltfSkin, GltfSparseIndices, GltfSparseValues,
    GltfTargetNames, MODE_TRIANGLES,
};

pub use materials::{GltfMaterial, GltfPbrMetallicRoughness};
