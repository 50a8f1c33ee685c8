//! glTF document to [`SceneGraph`].

use indexmap::IndexMap;

use crate::accessor::BufferReader;
use crate::error::{Error, Result};
use crate::formats::gltf::{GltfMesh, GltfNode, GltfPrimitive, GltfSkin, MODE_TRIANGLES};
use crate::mesh::{MorphTarget, Submesh, SubmeshMesh, VertexBuffer};
use crate::options::ImportOptions;
use crate::progress::{ImpexPhase, ImpexProgress, ImpexProgressCallback, no_progress};

use super::graph::{MeshData, SceneGraph};
use super::humanoid::read_humanoid_bones;
use super::material::Material;
use super::node::{Node, NodeId, Skin};

impl SceneGraph {
    /// Build a scene from a parsed document and its resolved buffers.
    ///
    /// Node `i` of the document becomes [`NodeId`]`(i)`; mesh, skin and
    /// material indices are kept as well.
    ///
    /// # Errors
    /// Returns a format error for malformed nodes or primitives and an
    /// invariant error if the hierarchy is not a forest.
    pub fn from_gltf(reader: &BufferReader<'_>, options: &ImportOptions) -> Result<Self> {
        Self::from_gltf_with_progress(reader, options, &no_progress)
    }

    /// [`SceneGraph::from_gltf`] with a progress callback.
    ///
    /// # Errors
    /// See [`SceneGraph::from_gltf`].
    pub fn from_gltf_with_progress(
        reader: &BufferReader<'_>,
        options: &ImportOptions,
        progress: ImpexProgressCallback,
    ) -> Result<Self> {
        let document = reader.document();
        let mut graph = SceneGraph::new();

        for (index, material) in document.materials.iter().enumerate() {
            graph.add_material(Material::from_gltf(index, material));
        }

        let total = document.meshes.len();
        for (index, mesh) in document.meshes.iter().enumerate() {
            let name = mesh.name.clone().unwrap_or_else(|| format!("mesh_{index}"));
            progress(&ImpexProgress::with_item(ImpexPhase::ReadingMeshes, index + 1, total, &name));
            let mesh = read_mesh(reader, index, name, mesh)?;
            tracing::debug!(
                "mesh '{}': {} vertices, {} submeshes, {} morph targets",
                mesh.name,
                mesh.vertices.len(),
                mesh.submeshes.len(),
                mesh.morph_targets.len()
            );
            graph.add_mesh(MeshData::Submesh(mesh));
        }

        progress(&ImpexProgress::new(ImpexPhase::BuildingScene, 0, 1));
        for (index, node) in document.nodes.iter().enumerate() {
            let node = read_node(index, node, document.meshes.len(), document.skins.len())?;
            graph.add_node(node);
        }
        link_children(&mut graph, &document.nodes)?;

        for (index, skin) in document.skins.iter().enumerate() {
            let skin = read_skin(reader, index, skin, document.nodes.len())?;
            graph.add_skin(skin)?;
        }

        for (node, bone) in read_humanoid_bones(document.extensions.as_ref())? {
            graph.node_mut(NodeId(node))?.humanoid_bone = Some(bone);
        }

        if options.rename_humanoid_bones {
            let renamed = graph.rename_humanoid_bones();
            tracing::debug!("renamed {renamed} humanoid bones");
        }
        if options.prune_empty_leaves {
            graph.remove_empty_leaf_nodes();
        }

        tracing::debug!(
            "imported {} nodes ({} roots), {} meshes, {} skins, {} materials",
            graph.nodes().len(),
            graph.roots().len(),
            graph.meshes.len(),
            graph.skins.len(),
            graph.materials.len()
        );
        progress(&ImpexProgress::new(ImpexPhase::BuildingScene, 1, 1));
        Ok(graph)
    }
}

fn read_node(index: usize, node: &GltfNode, mesh_count: usize, skin_count: usize) -> Result<Node> {
    let mut out = Node::new(node.name.clone().unwrap_or_else(|| format!("node_{index}")));

    if let Some(matrix) = &node.matrix {
        if node.translation.is_some() || node.rotation.is_some() || node.scale.is_some() {
            return Err(Error::NodeMatrixWithTrs { node: index });
        }
        out.set_matrix(matrix);
    } else {
        if let Some(translation) = node.translation {
            out.translation = translation;
        }
        if let Some(rotation) = node.rotation {
            out.rotation = rotation;
        }
        if let Some(scale) = node.scale {
            out.scale = scale;
        }
    }

    if let Some(mesh) = node.mesh {
        if mesh >= mesh_count {
            return Err(Error::InvalidReference { kind: "mesh", index: mesh });
        }
        out.mesh = Some(mesh);
    }
    if let Some(skin) = node.skin {
        if skin >= skin_count {
            return Err(Error::InvalidReference { kind: "skin", index: skin });
        }
        out.skin = Some(skin);
    }
    Ok(out)
}

/// Attach every declared child to its parent.
fn link_children(graph: &mut SceneGraph, nodes: &[GltfNode]) -> Result<()> {
    let mut has_parent = vec![false; nodes.len()];
    for (parent, node) in nodes.iter().enumerate() {
        for &child in &node.children {
            let seen = has_parent
                .get_mut(child)
                .ok_or(Error::InvalidReference { kind: "node", index: child })?;
            if *seen {
                return Err(Error::MultipleParents { node: child });
            }
            *seen = true;
            graph.add_child(NodeId(parent), NodeId(child))?;
        }
    }
    Ok(())
}

fn read_skin(reader: &BufferReader<'_>, index: usize, skin: &GltfSkin, node_count: usize) -> Result<Skin> {
    let node_id = |node: usize| {
        if node < node_count {
            Ok(NodeId(node))
        } else {
            Err(Error::InvalidReference { kind: "node", index: node })
        }
    };

    let joints = skin.joints.iter().map(|&j| node_id(j)).collect::<Result<Vec<_>>>()?;
    let skeleton = skin.skeleton.map(node_id).transpose()?;

    let inverse_bind_matrices = match skin.inverse_bind_matrices {
        Some(accessor) => {
            let matrices = reader.read_typed::<[f32; 16]>(accessor)?.into_owned();
            if matrices.len() != joints.len() {
                return Err(Error::AttributeCountMismatch {
                    attribute: "inverseBindMatrices",
                    expected: joints.len(),
                    found: matrices.len(),
                });
            }
            Some(matrices)
        }
        None => None,
    };

    Ok(Skin {
        name: skin.name.clone().unwrap_or_else(|| format!("skin_{index}")),
        skeleton,
        joints,
        inverse_bind_matrices,
    })
}

/// A run of vertices read for one attribute set.
struct VertexBlock<'d> {
    attributes: &'d IndexMap<String, usize>,
    targets: &'d [IndexMap<String, usize>],
    base: usize,
    len: usize,
}

fn read_mesh(reader: &BufferReader<'_>, index: usize, name: String, mesh: &GltfMesh) -> Result<SubmeshMesh> {
    let target_names = mesh
        .extras
        .as_ref()
        .or_else(|| mesh.primitives.iter().find_map(|p| p.extras.as_ref()))
        .map(|extras| extras.target_names.clone())
        .unwrap_or_default();

    let mut out = SubmeshMesh::new(name);
    let mut blocks: Vec<VertexBlock<'_>> = Vec::new();

    for (p, primitive) in mesh.primitives.iter().enumerate() {
        let mode = primitive.mode.unwrap_or(MODE_TRIANGLES);
        if mode != MODE_TRIANGLES {
            return Err(Error::UnsupportedPrimitiveMode { mesh: index, mode });
        }

        let shared = blocks
            .iter()
            .find(|b| *b.attributes == primitive.attributes && b.targets == primitive.targets.as_slice());
        let (base, len) = match shared {
            Some(block) => (block.base, block.len),
            None => {
                let base = out.vertices.len();
                let vertices = read_vertices(reader, index, p, primitive)?;
                let len = vertices.len();
                let deltas = read_target_deltas(reader, primitive, len)?;
                out.vertices.append(&vertices);
                append_targets(&mut out.morph_targets, &target_names, base, len, deltas);
                blocks.push(VertexBlock {
                    attributes: &primitive.attributes,
                    targets: &primitive.targets,
                    base,
                    len,
                });
                (base, len)
            }
        };

        let indices = match primitive.indices {
            Some(accessor) => reader.read_indices(accessor)?,
            None => (0..len as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= len) {
            return Err(Error::InvalidReference {
                kind: "vertex",
                index: bad as usize,
            });
        }

        out.submeshes.push(Submesh {
            offset: out.indices.len(),
            vertex_count: indices.len(),
            material: primitive.material,
        });
        out.indices.extend(indices.iter().map(|&i| i + base as u32));
    }

    if blocks.len() > 1 {
        tracing::debug!("'{}': merged {} vertex blocks", out.name, blocks.len());
    }
    out.validate()?;
    Ok(out)
}

fn read_vertices(
    reader: &BufferReader<'_>,
    mesh: usize,
    primitive_index: usize,
    primitive: &GltfPrimitive,
) -> Result<VertexBuffer> {
    let attributes = &primitive.attributes;
    let position = attributes.get("POSITION").ok_or(Error::MissingPositions {
        mesh,
        primitive: primitive_index,
    })?;
    let positions = reader.read_typed::<[f32; 3]>(*position)?.into_owned();
    let len = positions.len();

    let normals = match attributes.get("NORMAL") {
        Some(&accessor) => reader.read_typed::<[f32; 3]>(accessor)?.into_owned(),
        None => vec![[0.0; 3]; len],
    };
    let uvs = match attributes.get("TEXCOORD_0") {
        Some(&accessor) => reader.read_typed::<[f32; 2]>(accessor)?.into_owned(),
        None => vec![[0.0; 2]; len],
    };
    if attributes.contains_key("TEXCOORD_1") {
        tracing::warn!("mesh {mesh} primitive {primitive_index}: ignoring TEXCOORD_1");
    }

    let (joints, weights) = match (attributes.get("JOINTS_0"), attributes.get("WEIGHTS_0")) {
        (Some(&joints), Some(&weights)) => (Some(reader.read_joints(joints)?), Some(reader.read_weights(weights)?)),
        (None, None) => (None, None),
        _ => {
            tracing::warn!("mesh {mesh} primitive {primitive_index}: JOINTS_0 without WEIGHTS_0 (or vice versa), ignoring skinning");
            (None, None)
        }
    };

    let vertices = VertexBuffer {
        positions,
        normals,
        uvs,
        joints,
        weights,
    };
    vertices.validate()?;
    Ok(vertices)
}

/// POSITION deltas of every morph target of a primitive; targets without
/// POSITION contribute zeros.
fn read_target_deltas(reader: &BufferReader<'_>, primitive: &GltfPrimitive, len: usize) -> Result<Vec<Vec<[f32; 3]>>> {
    primitive
        .targets
        .iter()
        .enumerate()
        .map(|(t, target)| {
            let Some(&accessor) = target.get("POSITION") else {
                return Ok(vec![[0.0; 3]; len]);
            };
            let deltas = reader.read_typed::<[f32; 3]>(accessor)?.into_owned();
            if deltas.len() != len {
                return Err(Error::MorphTargetLengthMismatch {
                    name: format!("target_{t}"),
                    expected: len,
                    found: deltas.len(),
                });
            }
            Ok(deltas)
        })
        .collect()
}

/// Extend the mesh-wide morph targets by one vertex block of `added`
/// vertices starting at `base`, zero-filling targets the block lacks.
fn append_targets(
    targets: &mut Vec<MorphTarget>,
    names: &[String],
    base: usize,
    added: usize,
    block: Vec<Vec<[f32; 3]>>,
) {
    while targets.len() < block.len() {
        let i = targets.len();
        targets.push(MorphTarget {
            name: names.get(i).cloned().unwrap_or_else(|| format!("target_{i}")),
            deltas: vec![[0.0; 3]; base],
        });
    }
    let mut block = block.into_iter();
    for target in targets.iter_mut() {
        match block.next() {
            Some(deltas) => target.deltas.extend(deltas),
            None => target.deltas.resize(base + added, [0.0; 3]),
        }
    }
}
