//! GPU-style mesh: one vertex buffer, one index list, material ranges.

use crate::error::{Error, Result};

use super::MorphTarget;

/// Planar vertex attributes, all of the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<[f32; 4]>>,
}

impl VertexBuffer {
    /// A zero-filled buffer of `len` vertices.
    #[must_use]
    pub fn with_len(len: usize, skinned: bool) -> Self {
        Self {
            positions: vec![[0.0; 3]; len],
            normals: vec![[0.0; 3]; len],
            uvs: vec![[0.0; 2]; len],
            joints: skinned.then(|| vec![[0; 4]; len]),
            weights: skinned.then(|| vec![[0.0; 4]; len]),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    /// Append every vertex of `other`; skinning attributes are zero-filled
    /// on whichever side lacks them.
    pub fn append(&mut self, other: &Self) {
        let (before, added) = (self.len(), other.len());
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);

        if self.joints.is_some() || other.joints.is_some() {
            let joints = self.joints.get_or_insert_with(|| vec![[0; 4]; before]);
            match &other.joints {
                Some(j) => joints.extend_from_slice(j),
                None => joints.resize(before + added, [0; 4]),
            }
        }
        if self.weights.is_some() || other.weights.is_some() {
            let weights = self.weights.get_or_insert_with(|| vec![[0.0; 4]; before]);
            match &other.weights {
                Some(w) => weights.extend_from_slice(w),
                None => weights.resize(before + added, [0.0; 4]),
            }
        }
    }

    /// Check that every attribute has `len()` entries.
    ///
    /// # Errors
    /// Returns [`Error::AttributeCountMismatch`] naming the first bad attribute.
    pub fn validate(&self) -> Result<()> {
        let expected = self.len();
        let check = |attribute: &'static str, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(Error::AttributeCountMismatch {
                    attribute,
                    expected,
                    found,
                })
            }
        };
        check("NORMAL", self.normals.len())?;
        check("TEXCOORD_0", self.uvs.len())?;
        if let Some(joints) = &self.joints {
            check("JOINTS_0", joints.len())?;
        }
        if let Some(weights) = &self.weights {
            check("WEIGHTS_0", weights.len())?;
        }
        Ok(())
    }
}

/// A contiguous range of the index list drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    /// First index in [`SubmeshMesh::indices`].
    pub offset: usize,
    /// Number of indices (not vertices) in the range.
    pub vertex_count: usize,
    pub material: Option<usize>,
}

/// Mesh in glTF space (Y-up, top-left UV origin).
///
/// The submesh ranges partition `indices` in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmeshMesh {
    pub name: String,
    pub vertices: VertexBuffer,
    pub indices: Vec<u32>,
    pub submeshes: Vec<Submesh>,
    pub morph_targets: Vec<MorphTarget>,
}

impl SubmeshMesh {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Index range of submesh `i`.
    #[must_use]
    pub fn submesh_indices(&self, i: usize) -> Option<&[u32]> {
        let submesh = self.submeshes.get(i)?;
        self.indices.get(submesh.offset..submesh.offset + submesh.vertex_count)
    }

    /// Submesh containing index position `index_position`.
    #[must_use]
    pub fn submesh_at(&self, index_position: usize) -> Option<&Submesh> {
        self.submeshes
            .iter()
            .find(|s| s.offset <= index_position && index_position < s.offset + s.vertex_count)
    }

    /// Check the structural invariants: attribute lengths, submesh partition,
    /// index range and morph target alignment.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        self.vertices.validate()?;

        let mut expected_offset = 0;
        for (i, submesh) in self.submeshes.iter().enumerate() {
            if submesh.offset != expected_offset {
                return Err(Error::InvalidSubmeshLayout(format!(
                    "submesh {i} starts at {}, expected {expected_offset}",
                    submesh.offset
                )));
            }
            expected_offset += submesh.vertex_count;
        }
        if expected_offset != self.indices.len() {
            return Err(Error::InvalidSubmeshLayout(format!(
                "submeshes cover {expected_offset} indices, mesh has {}",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::InvalidReference {
                kind: "vertex",
                index: index as usize,
            });
        }

        for target in &self.morph_targets {
            if target.deltas.len() != vertex_count {
                return Err(Error::MorphTargetLengthMismatch {
                    name: target.name.clone(),
                    expected: vertex_count,
                    found: target.deltas.len(),
                });
            }
        }
        Ok(())
    }

    /// Copy submesh `i` into a standalone mesh holding only the vertices it
    /// references, renumbered in first-use order.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for an unknown submesh.
    pub fn extract_submesh(&self, i: usize) -> Result<Self> {
        let source = self
            .submesh_indices(i)
            .ok_or(Error::InvalidReference { kind: "submesh", index: i })?;
        let material = self.submeshes[i].material;

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut order: Vec<usize> = Vec::new();
        let mut indices = Vec::with_capacity(source.len());
        for &index in source {
            let slot = remap.get_mut(index as usize).ok_or(Error::InvalidReference {
                kind: "vertex",
                index: index as usize,
            })?;
            if *slot == u32::MAX {
                *slot = order.len() as u32;
                order.push(index as usize);
            }
            indices.push(*slot);
        }

        let src = &self.vertices;
        let vertices = VertexBuffer {
            positions: order.iter().map(|&v| src.positions[v]).collect(),
            normals: order.iter().map(|&v| src.normals[v]).collect(),
            uvs: order.iter().map(|&v| src.uvs[v]).collect(),
            joints: src.joints.as_ref().map(|j| order.iter().map(|&v| j[v]).collect()),
            weights: src.weights.as_ref().map(|w| order.iter().map(|&v| w[v]).collect()),
        };
        let morph_targets = self
            .morph_targets
            .iter()
            .map(|t| MorphTarget {
                name: t.name.clone(),
                deltas: order.iter().map(|&v| t.deltas[v]).collect(),
            })
            .collect();

        Ok(Self {
            name: format!("{}.{i}", self.name),
            vertices,
            submeshes: vec![Submesh {
                offset: 0,
                vertex_count: indices.len(),
                material,
            }],
            indices,
            morph_targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_triangles() -> SubmeshMesh {
        let mut vertices = VertexBuffer::with_len(4, false);
        vertices.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        SubmeshMesh {
            name: "quad".into(),
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            submeshes: vec![
                Submesh { offset: 0, vertex_count: 3, material: Some(0) },
                Submesh { offset: 3, vertex_count: 3, material: Some(1) },
            ],
            morph_targets: vec![MorphTarget {
                name: "Lift".into(),
                deltas: vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 2.0]],
            }],
        }
    }

    #[test]
    fn test_validate_partition() {
        let mut mesh = two_triangles();
        mesh.validate().unwrap();

        mesh.submeshes[1].offset = 4;
        assert!(matches!(mesh.validate(), Err(Error::InvalidSubmeshLayout(_))));

        let mut mesh = two_triangles();
        mesh.indices[5] = 4;
        assert!(matches!(
            mesh.validate(),
            Err(Error::InvalidReference { index: 4, .. })
        ));
    }

    #[test]
    fn test_submesh_lookup() {
        let mesh = two_triangles();
        assert_eq!(mesh.submesh_indices(1), Some(&[0, 2, 3][..]));
        assert_eq!(mesh.submesh_at(4).map(|s| s.material), Some(Some(1)));
        assert_eq!(mesh.submesh_at(6), None);
    }

    #[test]
    fn test_extract_submesh_renumbers_vertices() {
        let mesh = two_triangles();
        let second = mesh.extract_submesh(1).unwrap();

        assert_eq!(second.indices, vec![0, 1, 2]);
        assert_eq!(
            second.vertices.positions,
            vec![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
        );
        assert_eq!(second.morph_targets[0].deltas[2], [0.0, 0.0, 2.0]);
        assert_eq!(second.submeshes[0].material, Some(1));
        second.validate().unwrap();
    }

    #[test]
    fn test_append_fills_missing_skinning() {
        let mut a = VertexBuffer::with_len(2, false);
        let b = VertexBuffer::with_len(3, true);
        a.append(&b);
        assert_eq!(a.len(), 5);
        assert_eq!(a.joints.as_ref().map(Vec::len), Some(5));
        a.validate().unwrap();
    }
}
