//! Rust value types that map to an accessor layout.

use bytemuck::Pod;

use super::layout::{AccessorLayout, AccessorType, ComponentType};

#[cfg(target_endian = "big")]
compile_error!("accessor views reinterpret little-endian glTF buffers in place");

/// A plain value type that can be stored in or read from an accessor.
///
/// The implementing type decides the accessor layout, so callers never pass
/// `componentType`/`type` by hand: `[f32; 3]` is always VEC3/FLOAT.
pub trait Element: Pod {
    /// The accessor layout of this type.
    const LAYOUT: AccessorLayout;

    /// Whether every component is zero. Sparse encoding skips these.
    fn is_zero(&self) -> bool;
}

macro_rules! scalar_element {
    ($ty:ty, $component:ident) => {
        impl Element for $ty {
            const LAYOUT: AccessorLayout =
                AccessorLayout::new(ComponentType::$component, AccessorType::Scalar);

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }
        }
    };
}

macro_rules! array_element {
    ($ty:ty, $n:literal, $component:ident, $element:ident) => {
        impl Element for [$ty; $n] {
            const LAYOUT: AccessorLayout =
                AccessorLayout::new(ComponentType::$component, AccessorType::$element);

            fn is_zero(&self) -> bool {
                self.iter().all(|c| *c == <$ty>::default())
            }
        }
    };
}

scalar_element!(i8, I8);
scalar_element!(u8, U8);
scalar_element!(i16, I16);
scalar_element!(u16, U16);
scalar_element!(u32, U32);
scalar_element!(f32, F32);

array_element!(f32, 2, F32, Vec2);
array_element!(f32, 3, F32, Vec3);
array_element!(f32, 4, F32, Vec4);
array_element!(f32, 9, F32, Mat3);
array_element!(f32, 16, F32, Mat4);
array_element!(u8, 4, U8, Vec4);
array_element!(u16, 4, U16, Vec4);
array_element!(i16, 2, I16, Vec2);
array_element!(i16, 3, I16, Vec3);
array_element!(u16, 2, U16, Vec2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_inferred_from_type() {
        assert_eq!(
            <[f32; 3]>::LAYOUT,
            AccessorLayout::new(ComponentType::F32, AccessorType::Vec3)
        );
        assert_eq!(
            <[u16; 4]>::LAYOUT,
            AccessorLayout::new(ComponentType::U16, AccessorType::Vec4)
        );
        assert_eq!(u32::LAYOUT.element_size(), 4);
        assert_eq!(<[f32; 16]>::LAYOUT.element, AccessorType::Mat4);
    }

    #[test]
    fn test_negative_zero_counts_as_zero() {
        assert!([0.0f32, -0.0, 0.0].is_zero());
        assert!(![0.0f32, 1e-9, 0.0].is_zero());
        assert!(0u32.is_zero());
    }

    #[test]
    fn test_layout_size_matches_rust_size() {
        assert_eq!(<[f32; 16]>::LAYOUT.element_size(), size_of::<[f32; 16]>());
        assert_eq!(<[u8; 4]>::LAYOUT.element_size(), size_of::<[u8; 4]>());
        assert_eq!(<[i16; 3]>::LAYOUT.element_size(), size_of::<[i16; 3]>());
    }
}
