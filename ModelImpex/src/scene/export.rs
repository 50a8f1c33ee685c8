//! [`SceneGraph`] to glTF document plus binary buffer.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::accessor::{BufferManager, min_max_vec3};
use crate::error::{Error, Result};
use crate::formats::gltf::{
    GltfAsset, GltfBuffer, GltfDocument, GltfMesh, GltfNode, GltfPrimitive, GltfScene, GltfSkin,
    GltfTargetNames,
};
use crate::mesh::{SubmeshMesh, convert_facemesh_to_submesh_with_axis};
use crate::options::ExportOptions;
use crate::progress::{ImpexPhase, ImpexProgress, ImpexProgressCallback, no_progress};

use super::graph::{MeshData, SceneGraph};
use super::humanoid::{VRM0_EXTENSION, write_humanoid_bones};
use super::node::{NodeId, Skin};

impl SceneGraph {
    /// Build a glTF document and the contents of its single binary buffer.
    ///
    /// Only nodes reachable from the roots are written, in pre-order. Mesh
    /// and material indices are kept; skins are renumbered to those used by
    /// written nodes. The buffer entry references the GLB `BIN` chunk (no
    /// URI) and is omitted when nothing was written.
    ///
    /// # Errors
    /// Returns an error if a mesh fails to convert or validate, or a skin
    /// references a node that is not written.
    pub fn to_gltf(&self, options: &ExportOptions) -> Result<(GltfDocument, Vec<u8>)> {
        self.to_gltf_with_progress(options, &no_progress)
    }

    /// [`SceneGraph::to_gltf`] with a progress callback.
    ///
    /// # Errors
    /// See [`SceneGraph::to_gltf`].
    pub fn to_gltf_with_progress(
        &self,
        options: &ExportOptions,
        progress: ImpexProgressCallback,
    ) -> Result<(GltfDocument, Vec<u8>)> {
        let order: Vec<NodeId> = self.traverse_roots().collect();
        let mut node_index: Vec<Option<usize>> = vec![None; self.nodes().len()];
        for (i, id) in order.iter().enumerate() {
            node_index[id.0] = Some(i);
        }

        let mut skin_index: Vec<Option<usize>> = vec![None; self.skins.len()];
        let mut used_skins = Vec::new();
        for &id in &order {
            let Some(skin) = self.nodes()[id.0].skin else {
                continue;
            };
            if skin_index.get(skin).is_some_and(Option::is_none) {
                skin_index[skin] = Some(used_skins.len());
                used_skins.push(skin);
            }
        }

        let mut buffers = BufferManager::new();
        let mut meshes = Vec::with_capacity(self.meshes.len());
        let total = self.meshes.len();
        for (index, mesh) in self.meshes.iter().enumerate() {
            progress(&ImpexProgress::with_item(ImpexPhase::WritingMeshes, index + 1, total, mesh.name()));
            let submesh = self.submesh_for_export(index, mesh, options)?;
            meshes.push(write_mesh(&mut buffers, &submesh, options)?);
        }

        progress(&ImpexProgress::new(ImpexPhase::WritingScene, 0, 1));
        let mut skins = Vec::with_capacity(used_skins.len());
        for &skin in &used_skins {
            skins.push(self.write_skin(&mut buffers, &self.skins[skin], &node_index)?);
        }

        let nodes = order
            .iter()
            .map(|&id| {
                let node = &self.nodes()[id.0];
                GltfNode {
                    name: Some(node.name.clone()),
                    mesh: node.mesh,
                    skin: node.skin.and_then(|s| skin_index.get(s).copied().flatten()),
                    children: node.children().iter().filter_map(|c| node_index[c.0]).collect(),
                    matrix: None,
                    translation: (!node.has_default_translation()).then_some(node.translation),
                    rotation: (!node.has_default_rotation()).then_some(node.rotation),
                    scale: (!node.has_default_scale()).then_some(node.scale),
                }
            })
            .collect::<Vec<_>>();

        let scene = GltfScene {
            name: None,
            nodes: self.roots().iter().filter_map(|r| node_index[r.0]).collect(),
        };

        let humanoid: Vec<_> = order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.nodes()[id.0].humanoid_bone.map(|bone| (i, bone)))
            .collect();
        let extensions = write_humanoid_bones(&humanoid);
        let extensions_used = if extensions.is_some() {
            vec![VRM0_EXTENSION.to_string()]
        } else {
            Vec::new()
        };

        let (blob, buffer_views, accessors) = buffers.into_parts();
        let buffers = if blob.is_empty() {
            Vec::new()
        } else {
            vec![GltfBuffer {
                byte_length: blob.len(),
                uri: None,
            }]
        };

        let document = GltfDocument {
            asset: GltfAsset {
                version: "2.0".to_string(),
                generator: options.generator.clone(),
            },
            scene: Some(0),
            scenes: vec![scene],
            nodes,
            meshes,
            skins,
            materials: self.materials.iter().map(super::material::Material::to_gltf).collect(),
            accessors,
            buffer_views,
            buffers,
            extensions_used,
            extensions,
        };

        tracing::debug!(
            "exported {} nodes, {} meshes, {} skins, {} accessors, {} buffer bytes",
            document.nodes.len(),
            document.meshes.len(),
            document.skins.len(),
            document.accessors.len(),
            blob.len()
        );
        progress(&ImpexProgress::new(ImpexPhase::WritingScene, 1, 1));
        Ok((document, blob))
    }

    /// Joint names of the skin bound to the first written node that
    /// instantiates `mesh`.
    fn bone_names_for(&self, mesh: usize) -> Vec<String> {
        let Some(skin) = self
            .mesh_owner(mesh)
            .and_then(|owner| self.nodes()[owner.0].skin)
            .and_then(|skin| self.skins.get(skin))
        else {
            return Vec::new();
        };
        skin.joints
            .iter()
            .filter_map(|&joint| self.node(joint).ok())
            .map(|node| node.name.clone())
            .collect()
    }

    fn submesh_for_export<'m>(
        &self,
        index: usize,
        mesh: &'m MeshData,
        options: &ExportOptions,
    ) -> Result<Cow<'m, SubmeshMesh>> {
        match mesh {
            MeshData::Submesh(mesh) => {
                mesh.validate()?;
                Ok(Cow::Borrowed(mesh))
            }
            MeshData::Face(face) => {
                let bone_names = self.bone_names_for(index);
                Ok(Cow::Owned(convert_facemesh_to_submesh_with_axis(
                    face,
                    &bone_names,
                    options.axis,
                )?))
            }
        }
    }

    fn write_skin(&self, buffers: &mut BufferManager, skin: &Skin, node_index: &[Option<usize>]) -> Result<GltfSkin> {
        let joints = skin
            .joints
            .iter()
            .map(|joint| {
                node_index
                    .get(joint.0)
                    .copied()
                    .flatten()
                    .ok_or(Error::InvalidReference {
                        kind: "joint",
                        index: joint.0,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let matrices: Vec<[f32; 16]> = match &skin.inverse_bind_matrices {
            Some(matrices) => {
                if matrices.len() != joints.len() {
                    return Err(Error::AttributeCountMismatch {
                        attribute: "inverseBindMatrices",
                        expected: joints.len(),
                        found: matrices.len(),
                    });
                }
                matrices.clone()
            }
            None => skin
                .joints
                .iter()
                .map(|&joint| self.world_matrix(joint).inverse().to_cols_array())
                .collect(),
        };
        let inverse_bind_matrices = if matrices.is_empty() {
            None
        } else {
            Some(buffers.push_typed(&format!("{}.inverseBindMatrices", skin.name), &matrices, None, false)?)
        };

        Ok(GltfSkin {
            name: Some(skin.name.clone()),
            inverse_bind_matrices,
            joints,
            skeleton: skin.skeleton.and_then(|s| node_index.get(s.0).copied().flatten()),
        })
    }
}

fn write_mesh(buffers: &mut BufferManager, mesh: &SubmeshMesh, options: &ExportOptions) -> Result<GltfMesh> {
    let name = &mesh.name;
    let vertices = &mesh.vertices;

    let mut attributes = IndexMap::new();
    attributes.insert(
        "POSITION".to_string(),
        buffers.push_typed(&format!("{name}.POSITION"), &vertices.positions, Some(min_max_vec3), false)?,
    );
    attributes.insert(
        "NORMAL".to_string(),
        buffers.push_typed(&format!("{name}.NORMAL"), &vertices.normals, None, false)?,
    );
    attributes.insert(
        "TEXCOORD_0".to_string(),
        buffers.push_typed(&format!("{name}.TEXCOORD_0"), &vertices.uvs, None, false)?,
    );
    if let (Some(joints), Some(weights)) = (&vertices.joints, &vertices.weights) {
        attributes.insert(
            "JOINTS_0".to_string(),
            buffers.push_typed(&format!("{name}.JOINTS_0"), joints, None, false)?,
        );
        attributes.insert(
            "WEIGHTS_0".to_string(),
            buffers.push_typed(&format!("{name}.WEIGHTS_0"), weights, None, false)?,
        );
    }

    let mut targets = Vec::with_capacity(mesh.morph_targets.len());
    for target in &mesh.morph_targets {
        let accessor = buffers.push_typed(
            &format!("{name}.{}.POSITION", target.name),
            &target.deltas,
            Some(min_max_vec3),
            options.sparse_morph_targets,
        )?;
        targets.push(IndexMap::from([("POSITION".to_string(), accessor)]));
    }

    let small_indices = vertices.len() <= usize::from(u16::MAX);
    let mut primitives = Vec::with_capacity(mesh.submeshes.len());
    for (i, submesh) in mesh.submeshes.iter().enumerate() {
        let Some(indices) = mesh.submesh_indices(i).filter(|indices| !indices.is_empty()) else {
            tracing::warn!("'{name}': skipping empty submesh {i}");
            continue;
        };
        let accessor_name = format!("{name}.indices.{i}");
        let indices = if small_indices {
            let narrow: Vec<u16> = indices.iter().map(|&v| v as u16).collect();
            buffers.push_typed(&accessor_name, &narrow, None, false)?
        } else {
            buffers.push_typed(&accessor_name, indices, None, false)?
        };
        primitives.push(GltfPrimitive {
            attributes: attributes.clone(),
            indices: Some(indices),
            material: submesh.material,
            mode: None,
            targets: targets.clone(),
            extras: None,
        });
    }

    let target_names: Vec<String> = mesh.morph_targets.iter().map(|t| t.name.clone()).collect();
    Ok(GltfMesh {
        name: Some(name.clone()),
        primitives,
        weights: (!target_names.is_empty()).then(|| vec![0.0; target_names.len()]),
        extras: (!target_names.is_empty()).then_some(GltfTargetNames { target_names }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::BufferReader;
    use crate::mesh::test_meshes::split_cube;
    use crate::options::ImportOptions;
    use crate::scene::HumanoidBone;
    use crate::scene::material::Material;
    use crate::scene::node::Node;
    use pretty_assertions::assert_eq;

    fn cube_scene() -> SceneGraph {
        let mut graph = SceneGraph::new();
        let mut cube = split_cube(&[0, 0, 0, 1, 1, 1]);
        let mut deltas = vec![[0.0; 3]; 24];
        deltas[5] = [0.0, 0.0, 0.25];
        cube.add_morph_target("bulge", deltas).unwrap();
        let mesh = graph.add_mesh(cube);
        graph.add_material(Material::new("red").with_base_color([1.0, 0.0, 0.0, 1.0]));
        graph.add_material(Material::new("blue").with_base_color([0.0, 0.0, 1.0, 1.0]));

        let root = graph.add_node(Node::new("root"));
        let body = graph.add_node(Node::new("body").with_mesh(mesh).with_translation([0.0, 1.0, 0.0]));
        graph.add_child(root, body).unwrap();
        graph
    }

    #[test]
    fn test_mesh_layout() {
        let (document, blob) = cube_scene().to_gltf(&ExportOptions::new()).unwrap();

        assert_eq!(document.buffers[0].byte_length, blob.len());
        assert_eq!(blob.len() % 4, 0);
        let mesh = &document.meshes[0];
        assert_eq!(mesh.primitives.len(), 2);
        assert_eq!(mesh.primitives[0].attributes, mesh.primitives[1].attributes);
        assert_ne!(mesh.primitives[0].indices, mesh.primitives[1].indices);
        assert_eq!(mesh.primitives[1].material, Some(1));
        assert_eq!(mesh.extras.as_ref().unwrap().target_names, vec!["bulge".to_string()]);
        assert_eq!(mesh.weights, Some(vec![0.0]));

        let morph = &document.accessors[mesh.primitives[0].targets[0]["POSITION"]];
        assert!(morph.sparse.is_some());
        assert_eq!(morph.buffer_view, None);

        let position = &document.accessors[mesh.primitives[0].attributes["POSITION"]];
        assert_eq!(position.min, Some(vec![-1.0, -1.0, -1.0]));
        assert_eq!(position.max, Some(vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_dense_morphs_option() {
        let options = ExportOptions::new().with_sparse_morph_targets(false);
        let (document, _) = cube_scene().to_gltf(&options).unwrap();
        let mesh = &document.meshes[0];
        let morph = &document.accessors[mesh.primitives[0].targets[0]["POSITION"]];
        assert!(morph.sparse.is_none());
        assert!(morph.buffer_view.is_some());
    }

    #[test]
    fn test_detached_nodes_are_skipped() {
        let mut graph = cube_scene();
        let stray = graph.add_node(Node::new("stray"));
        graph.detach(stray);

        let (document, _) = graph.to_gltf(&ExportOptions::new()).unwrap();
        let names: Vec<_> = document.nodes.iter().map(|n| n.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["root", "body"]);
        assert_eq!(document.nodes[0].children, vec![1]);
        assert_eq!(document.scenes[0].nodes, vec![0]);
        assert_eq!(document.nodes[1].translation, Some([0.0, 1.0, 0.0]));
        assert_eq!(document.nodes[1].rotation, None);
    }

    #[test]
    fn test_computed_inverse_bind_matrices() {
        let mut graph = SceneGraph::new();
        let bone = graph.add_node(Node::new("bone").with_translation([0.0, 2.0, 0.0]));
        graph.add_skin(Skin::new("rig", vec![bone])).unwrap();
        graph.node_mut(bone).unwrap().skin = Some(0);

        let (document, blob) = graph.to_gltf(&ExportOptions::new()).unwrap();
        let reader = BufferReader::new(&document, vec![Cow::Borrowed(blob.as_slice())]);
        let accessor = document.skins[0].inverse_bind_matrices.unwrap();
        let matrices = reader.read_typed::<[f32; 16]>(accessor).unwrap();
        assert_eq!(matrices[0][13], -2.0);
    }

    #[test]
    fn test_skin_with_unwritten_joint_fails() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_node(Node::new("owner"));
        let bone = graph.add_node(Node::new("bone"));
        graph.add_skin(Skin::new("rig", vec![bone])).unwrap();
        graph.node_mut(owner).unwrap().skin = Some(0);
        graph.detach(bone);

        assert!(matches!(
            graph.to_gltf(&ExportOptions::new()),
            Err(Error::InvalidReference { kind: "joint", index: 1 })
        ));
    }

    #[test]
    fn test_export_import_round_trip() {
        let graph = cube_scene();
        let (document, blob) = graph.to_gltf(&ExportOptions::new()).unwrap();
        let reader = BufferReader::new(&document, vec![Cow::Borrowed(blob.as_slice())]);
        let imported = SceneGraph::from_gltf(&reader, &ImportOptions::new()).unwrap();

        let mesh = imported.meshes[0].as_submesh().unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.morph_targets[0].name, "bulge");
        assert_eq!(
            mesh.morph_targets[0].deltas[5],
            crate::coordinate::zup_to_yup([0.0, 0.0, 0.25])
        );
        assert_eq!(imported.materials, graph.materials);
        assert_eq!(imported.node(NodeId(1)).unwrap().mesh, Some(0));
    }

    #[test]
    fn test_humanoid_roles_survive_round_trip() {
        let mut graph = cube_scene();
        let stray = graph.add_node(Node::new("stray"));
        graph.node_mut(stray).unwrap().humanoid_bone = Some(HumanoidBone::Head);
        graph.detach(stray);
        let hips = graph.add_node(Node::new("hips"));
        graph.node_mut(hips).unwrap().humanoid_bone = Some(HumanoidBone::Hips);
        graph.add_child(graph.roots()[0], hips).unwrap();

        let (document, blob) = graph.to_gltf(&ExportOptions::new()).unwrap();
        assert_eq!(document.extensions_used, vec!["VRM".to_string()]);

        let reader = BufferReader::new(&document, vec![Cow::Borrowed(blob.as_slice())]);
        let imported = SceneGraph::from_gltf(&reader, &ImportOptions::new()).unwrap();
        let roles: Vec<_> = imported
            .traverse_roots()
            .filter_map(|id| imported.node(id).unwrap().humanoid_bone)
            .collect();
        assert_eq!(roles, vec![HumanoidBone::Hips]);
        assert_eq!(imported.node(NodeId(2)).unwrap().name, "hips");

        let (plain, _) = cube_scene().to_gltf(&ExportOptions::new()).unwrap();
        assert!(plain.extensions.is_none());
        assert!(plain.extensions_used.is_empty());
    }
}
