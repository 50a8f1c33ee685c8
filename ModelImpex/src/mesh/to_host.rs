//! SubmeshMesh (glTF space) to host-ready triangle arrays.

use crate::coordinate::{AxisConversion, flip_uv};
use crate::error::{Error, Result};

use super::MorphTarget;
use super::submesh_mesh::SubmeshMesh;

/// Mesh arrays in host space, ready for a host to build its own mesh from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangles as vertex index triples.
    pub indices: Vec<[u32; 3]>,
    /// Material of each triangle.
    pub face_materials: Vec<Option<usize>>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<[f32; 4]>>,
    pub morph_targets: Vec<MorphTarget>,
}

/// Convert a GPU-style mesh to host space using the standard axis remap.
///
/// # Errors
/// Returns [`Error::InvalidSubmeshLayout`] if the index count is not a
/// multiple of 3 or a triangle lies outside every submesh.
pub fn convert_submesh_to_host_mesh(src: &SubmeshMesh) -> Result<HostMesh> {
    convert_submesh_to_host_mesh_with_axis(src, AxisConversion::Standard)
}

/// Convert a GPU-style mesh to host space with an explicit axis remap.
///
/// # Errors
/// See [`convert_submesh_to_host_mesh`].
pub fn convert_submesh_to_host_mesh_with_axis(src: &SubmeshMesh, axis: AxisConversion) -> Result<HostMesh> {
    if src.indices.len() % 3 != 0 {
        return Err(Error::InvalidSubmeshLayout(format!(
            "{} indices do not form whole triangles",
            src.indices.len()
        )));
    }

    let mut indices = Vec::with_capacity(src.indices.len() / 3);
    let mut face_materials = Vec::with_capacity(src.indices.len() / 3);
    for (face, triangle) in src.indices.chunks_exact(3).enumerate() {
        let submesh = src.submesh_at(face * 3).ok_or_else(|| {
            Error::InvalidSubmeshLayout(format!("triangle {face} is outside every submesh"))
        })?;
        indices.push([triangle[0], triangle[1], triangle[2]]);
        face_materials.push(submesh.material);
    }

    let vertices = &src.vertices;
    Ok(HostMesh {
        name: src.name.clone(),
        positions: vertices.positions.iter().map(|&p| axis.to_zup(p)).collect(),
        normals: vertices.normals.iter().map(|&n| axis.to_zup(n)).collect(),
        uvs: vertices.uvs.iter().map(|&uv| flip_uv(uv)).collect(),
        indices,
        face_materials,
        joints: vertices.joints.clone(),
        weights: vertices.weights.clone(),
        morph_targets: src
            .morph_targets
            .iter()
            .map(|t| MorphTarget {
                name: t.name.clone(),
                deltas: t.deltas.iter().map(|&d| axis.to_zup(d)).collect(),
            })
            .collect(),
    })
}
