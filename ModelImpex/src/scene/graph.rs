//! Arena-backed scene graph.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use glam::Mat4;

use crate::error::{Error, Result};
use crate::mesh::{FaceMesh, SubmeshMesh};

use super::material::Material;
use super::node::{Node, NodeId, Skin};

/// Mesh payload of a scene: host-style before export, GPU-style after import.
#[derive(Debug, Clone)]
pub enum MeshData {
    Face(FaceMesh),
    Submesh(SubmeshMesh),
}

impl MeshData {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Face(mesh) => &mesh.name,
            Self::Submesh(mesh) => &mesh.name,
        }
    }

    #[must_use]
    pub fn as_submesh(&self) -> Option<&SubmeshMesh> {
        match self {
            Self::Submesh(mesh) => Some(mesh),
            Self::Face(_) => None,
        }
    }
}

impl From<FaceMesh> for MeshData {
    fn from(mesh: FaceMesh) -> Self {
        Self::Face(mesh)
    }
}

impl From<SubmeshMesh> for MeshData {
    fn from(mesh: SubmeshMesh) -> Self {
        Self::Submesh(mesh)
    }
}

/// Nodes, meshes, skins and materials of one scene.
///
/// Nodes live in an arena and are never removed; detaching a node makes it
/// unreachable from [`SceneGraph::roots`], which excludes it from traversal
/// and export.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    pub meshes: Vec<MeshData>,
    pub skins: Vec<Skin>,
    pub materials: Vec<Material>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node as a new root and return its id.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    /// Add a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: impl Into<MeshData>) -> usize {
        self.meshes.push(mesh.into());
        self.meshes.len() - 1
    }

    /// Add a skin and return its index.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] if a joint is not a node of this
    /// graph.
    pub fn add_skin(&mut self, skin: Skin) -> Result<usize> {
        for &joint in skin.joints.iter().chain(skin.skeleton.iter()) {
            self.node(joint)?;
        }
        self.skins.push(skin);
        Ok(self.skins.len() - 1)
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Node by id.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for an unknown id.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::InvalidReference {
            kind: "node",
            index: id.0,
        })
    }

    /// Mutable node by id.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for an unknown id.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::InvalidReference {
            kind: "node",
            index: id.0,
        })
    }

    /// Every node in the arena, including detached ones.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Top-level nodes, in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Attach `child` under `parent`, detaching it from its current parent.
    ///
    /// # Errors
    /// Returns [`Error::CyclicHierarchy`] without changing anything if
    /// `child` is already part of the hierarchy `parent` belongs to (this
    /// includes `parent == child`).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;

        let root = self.root_of(parent);
        if self.traverse(root).any(|n| n == child) {
            return Err(Error::CyclicHierarchy {
                parent: parent.0,
                child: child.0,
            });
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Remove a node from its parent's children (or from the roots).
    ///
    /// The node keeps its own subtree but is no longer reachable.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        match node.parent.take() {
            Some(parent) => self.nodes[parent.0].children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
    }

    /// Topmost ancestor of `id`.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current.0).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    /// Depth-first pre-order walk of the subtree at `start`.
    #[must_use]
    pub fn traverse(&self, start: NodeId) -> Traverse<'_> {
        let stack = if start.0 < self.nodes.len() { vec![start] } else { Vec::new() };
        Traverse { graph: self, stack }
    }

    /// Pre-order walk over every root's subtree, roots in order.
    pub fn traverse_roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().flat_map(|&root| self.traverse(root))
    }

    /// Whether `id` is a joint of any skin.
    #[must_use]
    pub fn is_joint(&self, id: NodeId) -> bool {
        self.skins.iter().any(|skin| skin.joints.contains(&id))
    }

    /// First reachable node that instantiates `mesh`.
    #[must_use]
    pub fn mesh_owner(&self, mesh: usize) -> Option<NodeId> {
        self.traverse_roots().find(|&n| self.nodes[n.0].mesh == Some(mesh))
    }

    /// World transform of `id`: the product of local transforms from its root.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            matrix = node.local_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Repeatedly detach leaf nodes that carry nothing: no mesh, no humanoid
    /// role, no children, and not a skin joint. Returns how many were removed.
    pub fn remove_empty_leaf_nodes(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let empty: Vec<NodeId> = self
                .traverse_roots()
                .filter(|&id| {
                    let node = &self.nodes[id.0];
                    node.children.is_empty()
                        && node.mesh.is_none()
                        && node.humanoid_bone.is_none()
                        && !self.is_joint(id)
                })
                .collect();
            if empty.is_empty() {
                break;
            }
            for &id in &empty {
                tracing::trace!("removing empty leaf '{}'", self.nodes[id.0].name);
                self.detach(id);
            }
            removed += empty.len();
        }
        if removed > 0 {
            tracing::debug!("removed {removed} empty leaf nodes");
        }
        removed
    }

    /// Rename every reachable node with a humanoid role to the role's name.
    /// Returns how many nodes were renamed.
    pub fn rename_humanoid_bones(&mut self) -> usize {
        let targets: Vec<NodeId> = self
            .traverse_roots()
            .filter(|&id| self.nodes[id.0].humanoid_bone.is_some())
            .collect();
        let mut renamed = 0;
        for id in targets {
            let node = &mut self.nodes[id.0];
            let Some(bone) = node.humanoid_bone else {
                continue;
            };
            if node.name != bone.as_str() {
                node.name = bone.as_str().to_string();
                renamed += 1;
            }
        }
        renamed
    }
}

/// Iterator returned by [`SceneGraph::traverse`].
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.graph.nodes.get(id.0) {
            self.stack.extend(node.children.iter().rev());
        }
        Some(id)
    }
}
