//! Append-only binary blob with bufferViews and accessors, used for export.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::error::{Error, Result};
use crate::formats::gltf::{
    GltfAccessor, GltfAccessorSparse, GltfBufferView, GltfSparseIndices, GltfSparseValues,
};

use super::element::Element;
use super::layout::ComponentType;

/// Computes the `(min, max)` bounds written to an accessor.
pub type MinMaxFn<T> = fn(&[T]) -> (Vec<f32>, Vec<f32>);

/// Accumulates one binary buffer and the views and accessors into it.
///
/// One manager belongs to one export; buffer 0 of the resulting document is
/// [`BufferManager::blob`].
#[derive(Debug, Default)]
pub struct BufferManager {
    blob: Vec<u8>,
    views: Vec<GltfBufferView>,
    accessors: Vec<GltfAccessor>,
}

impl BufferManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes as a new named bufferView and return its index.
    ///
    /// Each view starts on a 4-byte boundary.
    pub fn add_view(&mut self, name: &str, bytes: &[u8]) -> usize {
        self.align(4);
        let byte_offset = self.blob.len();
        self.blob.extend_from_slice(bytes);

        let index = self.views.len();
        self.views.push(GltfBufferView {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len(),
            name: Some(name.to_string()),
            ..Default::default()
        });
        tracing::trace!("bufferView {index} '{name}': {} bytes at {byte_offset}", bytes.len());
        index
    }

    /// Store `values` as an accessor and return its index.
    ///
    /// With `allow_sparse`, the values are written as a sparse accessor over
    /// an implicit zero base whenever that is strictly smaller than the dense
    /// encoding. The dense view is then never written.
    ///
    /// # Errors
    /// Returns [`Error::EmptyAccessor`] for an empty `values` slice.
    pub fn push_typed<T: Element>(
        &mut self,
        name: &str,
        values: &[T],
        min_max: Option<MinMaxFn<T>>,
        allow_sparse: bool,
    ) -> Result<usize> {
        if values.is_empty() {
            return Err(Error::EmptyAccessor {
                name: name.to_string(),
            });
        }

        let (min, max) = match min_max {
            Some(f) => {
                let (min, max) = f(values);
                (Some(min), Some(max))
            }
            None => (None, None),
        };

        let mut accessor = GltfAccessor {
            name: Some(name.to_string()),
            component_type: T::LAYOUT.component.code(),
            count: values.len(),
            accessor_type: T::LAYOUT.element.as_str().to_string(),
            min,
            max,
            ..Default::default()
        };

        if allow_sparse {
            accessor.sparse = self.try_push_sparse(name, values);
        }
        if accessor.sparse.is_none() {
            accessor.buffer_view = Some(self.add_view(name, bytemuck::cast_slice(values)));
        }

        let index = self.accessors.len();
        self.accessors.push(accessor);
        Ok(index)
    }

    /// Write the sparse encoding of `values` if it beats the dense size.
    fn try_push_sparse<T: Element>(&mut self, name: &str, values: &[T]) -> Option<GltfAccessorSparse> {
        let mut indices: Vec<u32> = Vec::new();
        let mut sparse_values: Vec<T> = Vec::new();
        for (i, value) in values.iter().enumerate() {
            if !value.is_zero() {
                indices.push(i as u32);
                sparse_values.push(*value);
            }
        }
        if indices.is_empty() {
            // glTF requires at least one sparse entry
            indices.push(0);
            sparse_values.push(T::zeroed());
        }

        let dense_bytes = size_of_val(values);
        let sparse_bytes = size_of_val(indices.as_slice()) + size_of_val(sparse_values.as_slice());
        if sparse_bytes >= dense_bytes {
            tracing::trace!("'{name}': dense ({dense_bytes} bytes) beats sparse ({sparse_bytes} bytes)");
            return None;
        }

        tracing::debug!(
            "'{name}': sparse with {} of {} entries ({sparse_bytes} bytes instead of {dense_bytes})",
            indices.len(),
            values.len()
        );
        let indices_view = self.add_view(&format!("{name}.sparse.indices"), bytemuck::cast_slice(&indices));
        let values_view = self.add_view(&format!("{name}.sparse.values"), bytemuck::cast_slice(&sparse_values));

        Some(GltfAccessorSparse {
            count: indices.len(),
            indices: GltfSparseIndices {
                buffer_view: indices_view,
                byte_offset: None,
                component_type: ComponentType::U32.code(),
            },
            values: GltfSparseValues {
                buffer_view: values_view,
                byte_offset: None,
            },
        })
    }

    /// The blob written so far.
    #[must_use]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    #[must_use]
    pub fn views(&self) -> &[GltfBufferView] {
        &self.views
    }

    #[must_use]
    pub fn accessors(&self) -> &[GltfAccessor] {
        &self.accessors
    }

    /// Pad the blob to a multiple of 4 and hand out its parts.
    #[must_use]
    pub fn into_parts(mut self) -> (Vec<u8>, Vec<GltfBufferView>, Vec<GltfAccessor>) {
        self.align(4);
        (self.blob, self.views, self.accessors)
    }

    fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.blob.len() % alignment)) % alignment;
        self.blob.resize(self.blob.len() + padding, 0);
    }
}

/// Component-wise bounds of a set of 3-vectors, for POSITION accessors.
#[must_use]
pub fn min_max_vec3(values: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for v in values {
        for (axis, &value) in v.iter().enumerate() {
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }
    (min.to_vec(), max.to_vec())
}
