//! Axis conversion between the host's Z-up space and glTF's Y-up space.
//!
//! Every remap here is a proper rotation (determinant +1), so triangle
//! winding survives conversion unchanged.

/// Convert a host (Z-up) vector to glTF (Y-up): `(x, y, z) -> (x, z, -y)`.
///
/// This is the exact inverse of [`yup_to_zup`], so import followed by
/// export returns the original coordinates. Callers that want the
/// half-turn remap `(-x, z, y)` in both directions use
/// [`AxisConversion::Turned`] (see [`turn_axes`]).
#[must_use]
pub const fn zup_to_yup(v: [f32; 3]) -> [f32; 3] {
    [v[0], v[2], -v[1]]
}

/// Convert a glTF (Y-up) vector to host (Z-up): `(x, y, z) -> (x, -z, y)`.
#[must_use]
pub const fn yup_to_zup(v: [f32; 3]) -> [f32; 3] {
    [v[0], -v[2], v[1]]
}

/// Half-turn remap `(x, y, z) -> (-x, z, y)`; its own inverse.
#[must_use]
pub const fn turn_axes(v: [f32; 3]) -> [f32; 3] {
    [-v[0], v[2], v[1]]
}

/// Convert a host rotation `[x, y, z, w]` to glTF space.
#[must_use]
pub const fn zup_to_yup_quat(q: [f32; 4]) -> [f32; 4] {
    let [x, y, z] = zup_to_yup([q[0], q[1], q[2]]);
    [x, y, z, q[3]]
}

/// Convert a glTF rotation `[x, y, z, w]` to host space.
#[must_use]
pub const fn yup_to_zup_quat(q: [f32; 4]) -> [f32; 4] {
    let [x, y, z] = yup_to_zup([q[0], q[1], q[2]]);
    [x, y, z, q[3]]
}

/// Which remap to apply at the host boundary.
///
/// `Turned` additionally faces a +Z-forward glTF model towards -Y in the
/// host, which is what VRM 1.0 and plain glTF avatars expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisConversion {
    /// [`zup_to_yup`] / [`yup_to_zup`].
    #[default]
    Standard,
    /// [`turn_axes`] in both directions.
    Turned,
    /// Host space already is glTF space.
    Identity,
}

impl AxisConversion {
    /// Host vector to glTF space.
    #[must_use]
    pub const fn to_yup(self, v: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Standard => zup_to_yup(v),
            Self::Turned => turn_axes(v),
            Self::Identity => v,
        }
    }

    /// glTF vector to host space.
    #[must_use]
    pub const fn to_zup(self, v: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Standard => yup_to_zup(v),
            Self::Turned => turn_axes(v),
            Self::Identity => v,
        }
    }

    /// Host rotation to glTF space.
    #[must_use]
    pub const fn quat_to_yup(self, q: [f32; 4]) -> [f32; 4] {
        let [x, y, z] = self.to_yup([q[0], q[1], q[2]]);
        [x, y, z, q[3]]
    }

    /// glTF rotation to host space.
    #[must_use]
    pub const fn quat_to_zup(self, q: [f32; 4]) -> [f32; 4] {
        let [x, y, z] = self.to_zup([q[0], q[1], q[2]]);
        [x, y, z, q[3]]
    }
}

/// Flip a texture coordinate between host (bottom-left) and glTF (top-left)
/// origin. The flip is its own inverse.
#[must_use]
pub const fn flip_uv(uv: [f32; 2]) -> [f32; 2] {
    [uv[0], 1.0 - uv[1]]
}
