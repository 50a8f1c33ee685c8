//! # ModelImpex
//!
//! A pure-Rust glTF 2.0 / GLB interchange layer for hosts that keep their
//! own mesh representation.
//!
//! ## Components
//!
//! - **GLB codec** - read and write the binary container
//! - **Accessors** - typed, bounds-checked reads and sparse-aware writes
//! - **Scene graph** - arena of nodes, skins, meshes and materials, with
//!   VRM humanoid roles on import
//! - **Mesh conversion** - host face meshes to GPU-style submesh meshes and
//!   back, including skin weights and morph targets
//! - **Coordinates** - Z-up host space to Y-up glTF space
//!
//! ## Quick Start
//!
//! ### Round-tripping a file
//!
//! ```no_run
//! use std::path::Path;
//!
//! let scene = modelimpex::import_path(Path::new("avatar.glb"))?;
//! println!("{} meshes", scene.meshes.len());
//!
//! modelimpex::export_glb_file(&scene, Path::new("copy.glb"))?;
//! # Ok::<(), modelimpex::Error>(())
//! ```
//!
//! ### Exporting a host mesh
//!
//! ```
//! use modelimpex::prelude::*;
//!
//! let mut mesh = FaceMesh::new(
//!     "tri",
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     vec![[0.0, 0.0, 1.0]; 3],
//! )?;
//! mesh.add_triangle(0, [0, 1, 2], None, None)?;
//!
//! let mut scene = SceneGraph::new();
//! let index = scene.add_mesh(mesh);
//! scene.add_node(Node::new("tri").with_mesh(index));
//!
//! let glb = modelimpex::export_glb(&scene)?;
//! assert!(modelimpex::formats::is_glb(&glb));
//! # Ok::<(), modelimpex::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `modelimpex` command-line binary

pub mod accessor;
pub mod converter;
pub mod coordinate;
pub mod error;
pub mod formats;
pub mod mesh;
pub mod options;
pub mod progress;
pub mod scene;

// Re-exports for convenience
pub use converter::{
    convert_facemesh_to_submesh, convert_submesh_to_host_mesh, export_glb, export_glb_file, export_gltf_files,
    import_bytes, import_path,
};
pub use error::{Error, ErrorKind, Result};
pub use options::{ExportOptions, ImportOptions};
pub use progress::{ImpexPhase, ImpexProgress, ImpexProgressCallback};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::coordinate::AxisConversion;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::mesh::{
        BoneWeight, FaceMesh, HostMesh, MorphTarget, Submesh, SubmeshMesh, VertexBuffer,
        convert_facemesh_to_submesh, convert_submesh_to_host_mesh,
    };
    pub use crate::options::{ExportOptions, ImportOptions};
    pub use crate::progress::{ImpexPhase, ImpexProgress};
    pub use crate::scene::{HumanoidBone, Material, MeshData, Node, NodeId, SceneGraph, Skin};

    pub use crate::converter;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
