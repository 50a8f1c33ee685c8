//! Accessor component and element layouts.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::fmt;

use crate::error::{Error, Result};
use crate::formats::gltf::GltfAccessor;

/// Scalar component type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// The glTF `componentType` code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::I8 => 5120,
            Self::U8 => 5121,
            Self::I16 => 5122,
            Self::U16 => 5123,
            Self::U32 => 5125,
            Self::F32 => 5126,
        }
    }

    /// Look up a glTF `componentType` code.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(Self::I8),
            5121 => Some(Self::U8),
            5122 => Some(Self::I16),
            5123 => Some(Self::U16),
            5125 => Some(Self::U32),
            5126 => Some(Self::F32),
            _ => None,
        }
    }

    /// Size of one component in bytes.
    #[must_use]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::I8 => "BYTE",
            Self::U8 => "UNSIGNED_BYTE",
            Self::I16 => "SHORT",
            Self::U16 => "UNSIGNED_SHORT",
            Self::U32 => "UNSIGNED_INT",
            Self::F32 => "FLOAT",
        }
    }
}

/// Element shape of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    /// Number of components per element.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// The glTF `type` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Parse a glTF `type` string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }
}

/// Component type × element type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorLayout {
    pub component: ComponentType,
    pub element: AccessorType,
}

impl AccessorLayout {
    #[must_use]
    pub const fn new(component: ComponentType, element: AccessorType) -> Self {
        Self { component, element }
    }

    /// Resolve the layout declared by a glTF accessor.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedAccessorLayout`] for unknown codes or types.
    pub fn from_accessor(accessor: &GltfAccessor) -> Result<Self> {
        let unsupported = || Error::UnsupportedAccessorLayout {
            component_type: accessor.component_type,
            accessor_type: accessor.accessor_type.clone(),
        };
        let component = ComponentType::from_code(accessor.component_type).ok_or_else(unsupported)?;
        let element = AccessorType::parse(&accessor.accessor_type).ok_or_else(unsupported)?;
        Ok(Self { component, element })
    }

    /// Size of one element in bytes.
    #[must_use]
    pub const fn element_size(self) -> usize {
        self.component.byte_size() * self.element.arity()
    }

    /// Tightly packed size of `count` elements.
    #[must_use]
    pub const fn byte_length(self, count: usize) -> usize {
        self.element_size() * count
    }
}

impl fmt::Display for AccessorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element.as_str(), self.component.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_codes_round_trip() {
        for component in [
            ComponentType::I8,
            ComponentType::U8,
            ComponentType::I16,
            ComponentType::U16,
            ComponentType::U32,
            ComponentType::F32,
        ] {
            assert_eq!(ComponentType::from_code(component.code()), Some(component));
        }
        // 5124 (signed int) is not a valid glTF component type
        assert_eq!(ComponentType::from_code(5124), None);
    }

    #[test]
    fn test_element_sizes() {
        let position = AccessorLayout::new(ComponentType::F32, AccessorType::Vec3);
        assert_eq!(position.element_size(), 12);
        assert_eq!(position.byte_length(8), 96);

        let joints = AccessorLayout::new(ComponentType::U16, AccessorType::Vec4);
        assert_eq!(joints.element_size(), 8);

        let matrix = AccessorLayout::new(ComponentType::F32, AccessorType::Mat4);
        assert_eq!(matrix.element_size(), 64);
        assert_eq!(AccessorType::Mat2.arity(), 4);
    }

    #[test]
    fn test_unsupported_layout() {
        let accessor = GltfAccessor {
            component_type: 5126,
            count: 1,
            accessor_type: "VEC5".into(),
            ..Default::default()
        };
        assert!(matches!(
            AccessorLayout::from_accessor(&accessor),
            Err(Error::UnsupportedAccessorLayout { component_type: 5126, .. })
        ));
    }

    #[test]
    fn test_display() {
        let layout = AccessorLayout::new(ComponentType::U16, AccessorType::Vec4);
        assert_eq!(layout.to_string(), "VEC4/UNSIGNED_SHORT");
    }
}
