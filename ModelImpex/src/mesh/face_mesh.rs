//! Host-style mesh: shared positions plus per-corner face-vertex attributes.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::MorphTarget;
use super::bone_weight::BoneWeight;

/// One distinct triangle corner: a position plus the attributes that may
/// differ between faces sharing that position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertex {
    pub material_index: usize,
    pub position_index: usize,
    /// Effective normal: the face's flat normal, or the shared vertex normal
    /// for smooth faces.
    pub normal: [f32; 3],
    pub uv: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FaceVertexKey {
    material_index: usize,
    position_index: usize,
    normal: [u32; 3],
    uv: Option<[u32; 2]>,
}

impl From<&FaceVertex> for FaceVertexKey {
    fn from(fv: &FaceVertex) -> Self {
        Self {
            material_index: fv.material_index,
            position_index: fv.position_index,
            normal: fv.normal.map(f32::to_bits),
            uv: fv.uv.map(|uv| uv.map(f32::to_bits)),
        }
    }
}

/// A triangle over three face-vertex indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub material_index: usize,
    pub corners: [usize; 3],
    /// Set for non-smooth faces.
    pub flat_normal: Option<[f32; 3]>,
}

/// Mesh in host space (Z-up, bottom-left UV origin) as a modelling host
/// stores it.
#[derive(Debug, Clone, Default)]
pub struct FaceMesh {
    pub name: String,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    face_vertices: Vec<FaceVertex>,
    face_vertex_map: HashMap<FaceVertexKey, usize>,
    triangles: Vec<Triangle>,
    vertex_groups: Vec<String>,
    bone_weights: Vec<BoneWeight>,
    morph_targets: Vec<MorphTarget>,
}

impl FaceMesh {
    /// Create a mesh from shared positions and smooth vertex normals.
    ///
    /// # Errors
    /// Returns [`Error::AttributeCountMismatch`] if the lengths differ.
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>) -> Result<Self> {
        if normals.len() != positions.len() {
            return Err(Error::AttributeCountMismatch {
                attribute: "NORMAL",
                expected: positions.len(),
                found: normals.len(),
            });
        }
        let bone_weights = vec![BoneWeight::default(); positions.len()];
        Ok(Self {
            name: name.into(),
            positions,
            normals,
            bone_weights,
            ..Default::default()
        })
    }

    /// Declare the vertex group names; group indices refer to this list.
    pub fn set_vertex_groups(&mut self, names: Vec<String>) {
        self.vertex_groups = names;
    }

    /// Add a weight of `group` on the vertex at `position_index`.
    ///
    /// # Errors
    /// Returns an error for an invalid vertex or group, or a 5th influence.
    pub fn add_vertex_weight(&mut self, position_index: usize, group: usize, weight: f32) -> Result<()> {
        if group >= self.vertex_groups.len() {
            return Err(Error::InvalidReference {
                kind: "vertex group",
                index: group,
            });
        }
        self.bone_weights
            .get_mut(position_index)
            .ok_or(Error::InvalidReference {
                kind: "vertex",
                index: position_index,
            })?
            .push(group, weight)
    }

    /// Add a triangle and return its index.
    ///
    /// `uvs` are per corner; `flat_normal` marks a non-smooth face. Corners
    /// sharing material, position, effective normal and UV are merged into a
    /// single face-vertex.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for an out-of-range position.
    pub fn add_triangle(
        &mut self,
        material_index: usize,
        positions: [usize; 3],
        uvs: Option<[[f32; 2]; 3]>,
        flat_normal: Option<[f32; 3]>,
    ) -> Result<usize> {
        if let Some(&bad) = positions.iter().find(|&&p| p >= self.positions.len()) {
            return Err(Error::InvalidReference {
                kind: "vertex",
                index: bad,
            });
        }

        let mut corners = [0usize; 3];
        for (corner, &position_index) in positions.iter().enumerate() {
            let face_vertex = FaceVertex {
                material_index,
                position_index,
                normal: flat_normal.unwrap_or(self.normals[position_index]),
                uv: uvs.map(|uvs| uvs[corner]),
            };
            corners[corner] = self.intern(face_vertex);
        }

        self.triangles.push(Triangle {
            material_index,
            corners,
            flat_normal,
        });
        Ok(self.triangles.len() - 1)
    }

    /// Add a shape key as per-position offsets.
    ///
    /// # Errors
    /// Returns [`Error::MorphTargetLengthMismatch`] if `deltas` is not
    /// aligned with the positions.
    pub fn add_morph_target(&mut self, name: impl Into<String>, deltas: Vec<[f32; 3]>) -> Result<()> {
        let name = name.into();
        if deltas.len() != self.positions.len() {
            return Err(Error::MorphTargetLengthMismatch {
                name,
                expected: self.positions.len(),
                found: deltas.len(),
            });
        }
        self.morph_targets.push(MorphTarget { name, deltas });
        Ok(())
    }

    /// Whether every position is used by exactly one face-vertex.
    ///
    /// Such a mesh has already been split along every seam and can keep its
    /// vertex order on conversion.
    #[must_use]
    pub fn is_face_split(&self) -> bool {
        if self.face_vertices.len() != self.positions.len() {
            return false;
        }
        let mut used = vec![false; self.positions.len()];
        for fv in &self.face_vertices {
            if std::mem::replace(&mut used[fv.position_index], true) {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    #[must_use]
    pub fn face_vertices(&self) -> &[FaceVertex] {
        &self.face_vertices
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[must_use]
    pub fn vertex_groups(&self) -> &[String] {
        &self.vertex_groups
    }

    #[must_use]
    pub fn bone_weights(&self) -> &[BoneWeight] {
        &self.bone_weights
    }

    #[must_use]
    pub fn morph_targets(&self) -> &[MorphTarget] {
        &self.morph_targets
    }

    fn intern(&mut self, face_vertex: FaceVertex) -> usize {
        let key = FaceVertexKey::from(&face_vertex);
        if let Some(&index) = self.face_vertex_map.get(&key) {
            return index;
        }
        let index = self.face_vertices.len();
        self.face_vertices.push(face_vertex);
        self.face_vertex_map.insert(key, index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quad(name: &str) -> FaceMesh {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = vec![[0.0, 0.0, 1.0]; 4];
        FaceMesh::new(name, positions, normals).unwrap()
    }

    #[test]
    fn test_shared_corners_are_merged() {
        let mut mesh = quad("quad");
        let uvs = |a: [f32; 2], b: [f32; 2], c: [f32; 2]| Some([a, b, c]);
        mesh.add_triangle(0, [0, 1, 2], uvs([0.0, 0.0], [1.0, 0.0], [1.0, 1.0]), None).unwrap();
        mesh.add_triangle(0, [0, 2, 3], uvs([0.0, 0.0], [1.0, 1.0], [0.0, 1.0]), None).unwrap();

        assert_eq!(mesh.face_vertices().len(), 4);
        assert_eq!(mesh.triangles()[1].corners, [0, 2, 3]);
        assert!(mesh.is_face_split());
    }

    #[test]
    fn test_uv_seam_breaks_face_split() {
        let mut mesh = quad("seam");
        mesh.add_triangle(0, [0, 1, 2], Some([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]), None).unwrap();
        mesh.add_triangle(0, [0, 2, 3], Some([[0.5, 0.5], [1.0, 1.0], [0.0, 1.0]]), None).unwrap();

        assert_eq!(mesh.face_vertices().len(), 5);
        assert!(!mesh.is_face_split());
    }

    #[test]
    fn test_equal_counts_with_duplicate_position_is_not_split() {
        // 4 face-vertices for 4 positions, but position 0 is used twice and
        // position 3 never
        let mut mesh = quad("odd");
        mesh.add_triangle(0, [0, 1, 2], Some([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]), None).unwrap();
        mesh.add_triangle(0, [0, 1, 2], Some([[0.5, 0.5], [1.0, 0.0], [1.0, 1.0]]), None).unwrap();

        assert_eq!(mesh.face_vertices().len(), 4);
        assert!(!mesh.is_face_split());
    }

    #[test]
    fn test_flat_normal_is_effective_normal() {
        let mut mesh = quad("flat");
        mesh.add_triangle(0, [0, 1, 2], None, Some([0.0, 0.0, -1.0])).unwrap();
        assert!(mesh.face_vertices().iter().all(|fv| fv.normal == [0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_invalid_references() {
        let mut mesh = quad("bad");
        assert!(matches!(
            mesh.add_triangle(0, [0, 1, 9], None, None),
            Err(Error::InvalidReference { index: 9, .. })
        ));
        assert!(mesh.add_vertex_weight(0, 0, 1.0).is_err());
        assert!(matches!(
            mesh.add_morph_target("Smile", vec![[0.0; 3]; 3]),
            Err(Error::MorphTargetLengthMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_rejected_triangle_leaves_mesh_unchanged() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mut mesh = FaceMesh::new("tri", positions, vec![[0.0, 0.0, 1.0]; 3]).unwrap();

        assert!(mesh.add_triangle(0, [0, 1, 9], Some([[0.5, 0.5]; 3]), None).is_err());
        assert_eq!(mesh.face_vertices().len(), 0);
        assert_eq!(mesh.triangles().len(), 0);

        mesh.add_triangle(0, [0, 1, 2], None, None).unwrap();
        assert_eq!(mesh.face_vertices().len(), 3);
        assert!(mesh.is_face_split());
    }
}
