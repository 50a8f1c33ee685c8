//! FaceMesh (host space) to SubmeshMesh (glTF space) conversion.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};

use crate::coordinate::{AxisConversion, flip_uv};
use crate::error::{Error, Result};

use super::MorphTarget;
use super::face_mesh::FaceMesh;
use super::submesh_mesh::{Submesh, SubmeshMesh, VertexBuffer};

/// Convert a host mesh to a GPU-style mesh using the standard axis remap.
///
/// `bone_names` is the joint list of the skin the mesh is bound to; when it
/// is non-empty, vertex groups with matching names become `JOINTS_0` and
/// `WEIGHTS_0`.
///
/// # Errors
/// Returns [`Error::ZeroWeightVertex`] if a skinned vertex has no influence
/// on any of `bone_names`.
pub fn convert_facemesh_to_submesh(src: &FaceMesh, bone_names: &[String]) -> Result<SubmeshMesh> {
    convert_facemesh_to_submesh_with_axis(src, bone_names, AxisConversion::Standard)
}

/// Convert a host mesh to a GPU-style mesh with an explicit axis remap.
///
/// # Errors
/// See [`convert_facemesh_to_submesh`].
pub fn convert_facemesh_to_submesh_with_axis(
    src: &FaceMesh,
    bone_names: &[String],
    axis: AxisConversion,
) -> Result<SubmeshMesh> {
    let face_split = src.is_face_split();
    let skinned = !bone_names.is_empty();

    // Output vertex -> source position
    let (mut vertices, mut source_positions) = if face_split {
        let count = src.positions().len();
        (VertexBuffer::with_len(count, false), (0..count).collect::<Vec<_>>())
    } else {
        let capacity = src.triangles().len() * 3;
        (VertexBuffer::default(), Vec::with_capacity(capacity))
    };

    let mut buckets: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for triangle in src.triangles() {
        let bucket = buckets.entry(triangle.material_index).or_default();
        for &corner in &triangle.corners {
            let fv = &src.face_vertices()[corner];
            let position = axis.to_yup(src.positions()[fv.position_index]);
            let normal = axis.to_yup(triangle.flat_normal.unwrap_or(fv.normal));
            let uv = fv.uv.map_or([0.0, 0.0], flip_uv);

            let out = if face_split {
                let i = fv.position_index;
                vertices.positions[i] = position;
                vertices.normals[i] = normal;
                vertices.uvs[i] = uv;
                i
            } else {
                vertices.positions.push(position);
                vertices.normals.push(normal);
                vertices.uvs.push(uv);
                source_positions.push(fv.position_index);
                vertices.positions.len() - 1
            };
            bucket.push(out as u32);
        }
    }

    let mut indices = Vec::with_capacity(src.triangles().len() * 3);
    let mut submeshes = Vec::with_capacity(buckets.len());
    for (material, bucket) in buckets {
        submeshes.push(Submesh {
            offset: indices.len(),
            vertex_count: bucket.len(),
            material: Some(material),
        });
        indices.extend(bucket);
    }

    let morph_targets = src
        .morph_targets()
        .iter()
        .map(|target| MorphTarget {
            name: target.name.clone(),
            deltas: source_positions
                .iter()
                .map(|&p| axis.to_yup(target.deltas[p]))
                .collect(),
        })
        .collect();

    if skinned {
        let (joints, weights) = pack_skinning(src, bone_names, &source_positions)?;
        vertices.joints = Some(joints);
        vertices.weights = Some(weights);
    }

    tracing::debug!(
        "converted '{}': {} vertices ({}), {} submeshes",
        src.name,
        vertices.len(),
        if face_split { "face split" } else { "per corner" },
        submeshes.len()
    );

    Ok(SubmeshMesh {
        name: src.name.clone(),
        vertices,
        indices,
        submeshes,
        morph_targets,
    })
}

type PackedSkinning = (Vec<[u16; 4]>, Vec<[f32; 4]>);

fn pack_skinning(src: &FaceMesh, bone_names: &[String], source_positions: &[usize]) -> Result<PackedSkinning> {
    let joint_of_name: HashMap<&str, u16> = bone_names
        .iter()
        .enumerate()
        .map(|(joint, name)| (name.as_str(), joint as u16))
        .collect();
    let group_to_joint: HashMap<usize, u16> = src
        .vertex_groups()
        .iter()
        .enumerate()
        .filter_map(|(group, name)| joint_of_name.get(name.as_str()).map(|&joint| (group, joint)))
        .collect();

    let mut joints = Vec::with_capacity(source_positions.len());
    let mut weights = Vec::with_capacity(source_positions.len());
    for &position in source_positions {
        let (j, w) = src.bone_weights()[position]
            .to_joints_and_weights(&group_to_joint)
            .ok_or(Error::ZeroWeightVertex { vertex: position })?;
        joints.push(j);
        weights.push(w);
    }
    Ok((joints, weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::{flat_cube, split_cube};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_cube_keeps_vertex_order() {
        let cube = split_cube(&[0; 6]);
        let mesh = convert_facemesh_to_submesh(&cube, &[]).unwrap();

        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(
            mesh.submeshes,
            vec![Submesh { offset: 0, vertex_count: 36, material: Some(0) }]
        );
        for (i, &p) in cube.positions().iter().enumerate() {
            assert_eq!(mesh.vertices.positions[i], crate::coordinate::zup_to_yup(p));
        }
        mesh.validate().unwrap();
    }

    #[test]
    fn test_two_materials_split_into_sorted_submeshes() {
        let cube = split_cube(&[1, 1, 1, 0, 0, 0]);
        let mesh = convert_facemesh_to_submesh(&cube, &[]).unwrap();

        assert_eq!(
            mesh.submeshes,
            vec![
                Submesh { offset: 0, vertex_count: 18, material: Some(0) },
                Submesh { offset: 18, vertex_count: 18, material: Some(1) },
            ]
        );
        assert_eq!(mesh.vertices.len(), 24);
    }

    #[test]
    fn test_shared_positions_get_vertex_per_corner() {
        let cube = flat_cube();
        assert!(!cube.is_face_split());
        let mesh = convert_facemesh_to_submesh(&cube, &[]).unwrap();

        assert_eq!(mesh.vertices.len(), 36);
        assert_eq!(mesh.indices, (0..36).collect::<Vec<u32>>());
        // Flat normals survive per corner
        assert_eq!(mesh.vertices.normals[0], crate::coordinate::zup_to_yup([0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_uv_flipped_and_missing_uv_is_zero() {
        let cube = split_cube(&[0; 6]);
        let mesh = convert_facemesh_to_submesh(&cube, &[]).unwrap();
        // split_cube gives position 0 the UV (0, 0)
        assert_eq!(mesh.vertices.uvs[0], [0.0, 1.0]);

        let flat = convert_facemesh_to_submesh(&flat_cube(), &[]).unwrap();
        assert!(flat.vertices.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
    }

    #[test]
    fn test_morph_targets_follow_vertices() {
        let mut cube = flat_cube();
        let mut deltas = vec![[0.0; 3]; 8];
        deltas[6] = [0.0, 0.0, 1.0];
        cube.add_morph_target("Up", deltas).unwrap();
        let mesh = convert_facemesh_to_submesh(&cube, &[]).unwrap();

        let target = &mesh.morph_targets[0];
        assert_eq!(target.deltas.len(), mesh.vertices.len());
        for (vertex, delta) in target.deltas.iter().enumerate() {
            let source = &cube.face_vertices()[cube.triangles()[vertex / 3].corners[vertex % 3]];
            let expected = if source.position_index == 6 { [0.0, 1.0, 0.0] } else { [0.0, 0.0, 0.0] };
            assert_eq!(*delta, expected);
        }
        mesh.validate().unwrap();
    }

    #[test]
    fn test_bone_weights_are_normalized() {
        let mut cube = flat_cube();
        cube.set_vertex_groups(vec!["Hips".into(), "Cloth".into(), "Spine".into()]);
        for v in 0..8 {
            cube.add_vertex_weight(v, 0, 0.3).unwrap();
            cube.add_vertex_weight(v, 1, 0.5).unwrap(); // not a bone, dropped
            cube.add_vertex_weight(v, 2, 0.1).unwrap();
        }
        let bones = vec!["Spine".to_string(), "Hips".to_string()];
        let mesh = convert_facemesh_to_submesh(&cube, &bones).unwrap();

        let joints = mesh.vertices.joints.as_ref().unwrap();
        let weights = mesh.vertices.weights.as_ref().unwrap();
        assert_eq!(joints.len(), 36);
        assert_eq!(joints[0], [1, 0, 0, 0]);
        for w in weights {
            assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            assert!((w[0] - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_vertex_without_bone_influence_is_an_error() {
        let mut cube = flat_cube();
        cube.set_vertex_groups(vec!["Hips".into()]);
        for v in 0..7 {
            cube.add_vertex_weight(v, 0, 1.0).unwrap();
        }
        let result = convert_facemesh_to_submesh(&cube, &["Hips".to_string()]);
        assert!(matches!(result, Err(Error::ZeroWeightVertex { vertex: 7 })));
    }
}
