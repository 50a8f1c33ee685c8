//! Scene nodes and skins.

use std::fmt;

use glam::{Mat4, Quat, Vec3};

use crate::coordinate::AxisConversion;

use super::humanoid::HumanoidBone;

/// Index of a node in a [`super::SceneGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transform node. Parent/child links are managed by the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub translation: [f32; 3],
    /// Rotation quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub humanoid_bone: Option<HumanoidBone>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// A node with an identity transform.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
            mesh: None,
            skin: None,
            humanoid_bone: None,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_skin(mut self, skin: usize) -> Self {
        self.skin = Some(skin);
        self
    }

    #[must_use]
    pub fn with_humanoid_bone(mut self, bone: HumanoidBone) -> Self {
        self.humanoid_bone = Some(bone);
        self
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform as a column-major matrix.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from(self.translation),
        )
    }

    /// Set translation, rotation and scale from a column-major matrix.
    pub fn set_matrix(&mut self, matrix: &[f32; 16]) {
        let (scale, rotation, translation) = Mat4::from_cols_array(matrix).to_scale_rotation_translation();
        self.translation = translation.to_array();
        self.rotation = rotation.to_array();
        self.scale = scale.to_array();
    }

    /// Translation and rotation in host space.
    ///
    /// Scale stays per-axis as stored; the host applies it in its own frame.
    #[must_use]
    pub fn host_transform(&self, axis: AxisConversion) -> ([f32; 3], [f32; 4]) {
        (axis.to_zup(self.translation), axis.quat_to_zup(self.rotation))
    }

    /// Set translation and rotation from host space values.
    pub fn set_host_transform(&mut self, axis: AxisConversion, translation: [f32; 3], rotation: [f32; 4]) {
        self.translation = axis.to_yup(translation);
        self.rotation = axis.quat_to_yup(rotation);
    }

    pub(crate) fn has_default_translation(&self) -> bool {
        self.translation == [0.0; 3]
    }

    pub(crate) fn has_default_rotation(&self) -> bool {
        self.rotation == [0.0, 0.0, 0.0, 1.0]
    }

    pub(crate) fn has_default_scale(&self) -> bool {
        self.scale == [1.0; 3]
    }
}

/// Joint list of a skinned mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    pub name: String,
    /// Common root of the joints, if the source declared one.
    pub skeleton: Option<NodeId>,
    /// Joints in `JOINTS_0` index order.
    pub joints: Vec<NodeId>,
    /// One column-major matrix per joint; computed from the joints' world
    /// transforms on export when absent.
    pub inverse_bind_matrices: Option<Vec<[f32; 16]>>,
}

impl Skin {
    #[must_use]
    pub fn new(name: impl Into<String>, joints: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            joints,
            ..Default::default()
        }
    }
}
