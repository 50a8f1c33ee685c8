//! Mesh representations and the conversions between them.
//!
//! - [`FaceMesh`] - host-side topology: shared positions, deduplicated
//!   face-vertices, per-vertex bone influences
//! - [`SubmeshMesh`] - glTF-side topology: one vertex buffer, one index list,
//!   material ranges
//! - [`convert_facemesh_to_submesh`] / [`convert_submesh_to_host_mesh`]

pub mod bone_weight;
pub mod face_mesh;
pub mod submesh_mesh;
pub mod to_host;
pub mod to_submesh;

pub use bone_weight::{BoneWeight, MAX_INFLUENCES};
pub use face_mesh::{FaceMesh, FaceVertex, Triangle};
pub use submesh_mesh::{Submesh, SubmeshMesh, VertexBuffer};
pub use to_host::{HostMesh, convert_submesh_to_host_mesh, convert_submesh_to_host_mesh_with_axis};
pub use to_submesh::{convert_facemesh_to_submesh, convert_facemesh_to_submesh_with_axis};

/// Named per-vertex position offsets (a shape key / blend shape).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTarget {
    pub name: String,
    pub deltas: Vec<[f32; 3]>,
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::FaceMesh;

    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
        ([0.0, 1.0, 0.0], [[1.0, 1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]),
        ([-1.0, 0.0, 0.0], [[-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0]]),
        ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
    ];

    /// Cube with 4 positions per face (24 total), smooth per-face normals
    /// and a full UV square on every face. Face `f` uses `materials[f]`.
    pub fn split_cube(materials: &[usize]) -> FaceMesh {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        for (normal, corners) in FACES {
            positions.extend_from_slice(&corners);
            normals.extend_from_slice(&[normal; 4]);
        }
        let mut mesh = FaceMesh::new("split_cube", positions, normals).unwrap();
        for (face, &material) in materials.iter().enumerate() {
            let base = face * 4;
            mesh.add_triangle(
                material,
                [base, base + 1, base + 2],
                Some([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]),
                None,
            )
            .unwrap();
            mesh.add_triangle(
                material,
                [base, base + 2, base + 3],
                Some([[0.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
                None,
            )
            .unwrap();
        }
        mesh
    }

    /// Cube with 8 shared corner positions and flat-shaded faces, no UVs.
    pub fn flat_cube() -> FaceMesh {
        let corner = |i: usize| {
            let axis = |bit: usize| -> f32 { if i & bit == 0 { -1.0 } else { 1.0 } };
            [axis(1), axis(2), axis(4)]
        };
        let positions: Vec<[f32; 3]> = (0..8).map(corner).collect();
        let normals = positions.clone();
        let mut mesh = FaceMesh::new("flat_cube", positions, normals).unwrap();

        let quads: [([f32; 3], [usize; 4]); 6] = [
            ([0.0, 0.0, -1.0], [0, 2, 3, 1]),
            ([0.0, 0.0, 1.0], [4, 5, 7, 6]),
            ([0.0, -1.0, 0.0], [0, 1, 5, 4]),
            ([0.0, 1.0, 0.0], [2, 6, 7, 3]),
            ([-1.0, 0.0, 0.0], [0, 4, 6, 2]),
            ([1.0, 0.0, 0.0], [1, 3, 7, 5]),
        ];
        for (normal, [a, b, c, d]) in quads {
            mesh.add_triangle(0, [a, b, c], None, Some(normal)).unwrap();
            mesh.add_triangle(0, [a, c, d], None, Some(normal)).unwrap();
        }
        mesh
    }
}
