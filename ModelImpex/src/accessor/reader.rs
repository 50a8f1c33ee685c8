//! Typed, bounds-checked views over glTF buffers, used for import.

use std::borrow::Cow;
use std::path::Path;

use base64::Engine;

use crate::error::{Error, Result};
use crate::formats::gltf::{GltfAccessor, GltfBufferView, GltfDocument};

use super::element::Element;
use super::layout::{AccessorLayout, AccessorType, ComponentType};

/// Resolves the buffers of a document and reads accessors out of them.
pub struct BufferReader<'a> {
    document: &'a GltfDocument,
    buffers: Vec<Cow<'a, [u8]>>,
}

impl<'a> BufferReader<'a> {
    /// Create a reader over already resolved buffers, one per document buffer.
    #[must_use]
    pub fn new(document: &'a GltfDocument, buffers: Vec<Cow<'a, [u8]>>) -> Self {
        Self { document, buffers }
    }

    /// Resolve every buffer of `document`.
    ///
    /// A buffer without URI refers to the GLB `bin` chunk. `data:` URIs are
    /// decoded in place; relative file URIs are read from `base_dir`.
    ///
    /// # Errors
    /// Returns a resource error if a buffer cannot be located or read.
    pub fn resolve(
        document: &'a GltfDocument,
        bin: Option<&'a [u8]>,
        base_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (index, buffer) in document.buffers.iter().enumerate() {
            let data = match buffer.uri.as_deref() {
                None => Cow::Borrowed(bin.ok_or(Error::MissingBinaryChunk { index })?),
                Some(uri) if uri.starts_with("data:") => Cow::Owned(decode_data_uri(index, uri)?),
                Some(uri) => {
                    let Some(dir) = base_dir else {
                        return Err(Error::UnsupportedBufferUri {
                            index,
                            uri: uri.to_string(),
                        });
                    };
                    let bytes = std::fs::read(dir.join(uri)).map_err(|source| {
                        Error::ExternalBufferUnreadable {
                            uri: uri.to_string(),
                            source,
                        }
                    })?;
                    Cow::Owned(bytes)
                }
            };
            if data.len() < buffer.byte_length {
                return Err(Error::BufferViewOutOfBounds {
                    view: index,
                    end: buffer.byte_length,
                    available: data.len(),
                });
            }
            buffers.push(data);
        }
        Ok(Self::new(document, buffers))
    }

    /// The document this reader was created for.
    #[must_use]
    pub fn document(&self) -> &'a GltfDocument {
        self.document
    }

    /// Bytes of a bufferView.
    ///
    /// # Errors
    /// Returns an error if the index is invalid or the view exceeds its buffer.
    pub fn view_bytes(&self, view_index: usize) -> Result<&[u8]> {
        let view = self.view(view_index)?;
        let buffer = self.buffers.get(view.buffer).ok_or(Error::InvalidReference {
            kind: "buffer",
            index: view.buffer,
        })?;
        let end = view.byte_offset.saturating_add(view.byte_length);
        buffer
            .get(view.byte_offset..end)
            .ok_or(Error::BufferViewOutOfBounds {
                view: view_index,
                end,
                available: buffer.len(),
            })
    }

    /// Accessor definition by index.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for an out-of-range index.
    pub fn accessor(&self, index: usize) -> Result<&'a GltfAccessor> {
        self.document.accessors.get(index).ok_or(Error::InvalidReference {
            kind: "accessor",
            index,
        })
    }

    /// Layout declared by an accessor.
    ///
    /// # Errors
    /// Returns an error for an invalid index or unsupported layout.
    pub fn layout(&self, index: usize) -> Result<AccessorLayout> {
        AccessorLayout::from_accessor(self.accessor(index)?)
    }

    /// Read an accessor as a slice of `T`.
    ///
    /// Tightly packed, aligned data is borrowed; strided, unaligned or sparse
    /// data is copied. Sparse entries are applied over the dense base, which
    /// is all zeros when the accessor has no bufferView.
    ///
    /// # Errors
    /// Returns [`Error::AccessorTypeMismatch`] if `T` does not match the
    /// declared layout, and a bounds error if the data does not fit.
    pub fn read_typed<T: Element>(&self, index: usize) -> Result<Cow<'_, [T]>> {
        let accessor = self.accessor(index)?;
        let layout = AccessorLayout::from_accessor(accessor)?;
        if layout != T::LAYOUT {
            return Err(Error::AccessorTypeMismatch {
                accessor: index,
                expected: T::LAYOUT.to_string(),
                found: layout.to_string(),
            });
        }

        let mut values: Cow<'_, [T]> = match accessor.buffer_view {
            Some(view_index) => {
                let view = self.view(view_index)?;
                let bytes = self.view_bytes(view_index)?;
                let offset = accessor.byte_offset.unwrap_or(0);
                read_elements(index, bytes, offset, view.byte_stride, accessor.count)?
            }
            None => Cow::Owned(zeroed_elements(index, accessor.count)?),
        };

        if let Some(sparse) = &accessor.sparse {
            let indices = self.read_sparse_indices(index, accessor)?;
            let bytes = self.view_bytes(sparse.values.buffer_view)?;
            let offset = sparse.values.byte_offset.unwrap_or(0);
            let replacements = read_elements::<T>(index, bytes, offset, None, sparse.count)?;

            let dense = values.to_mut();
            for (&target, value) in indices.iter().zip(replacements.iter()) {
                let slot = dense.get_mut(target as usize).ok_or(Error::InvalidReference {
                    kind: "sparse index",
                    index: target as usize,
                })?;
                *slot = *value;
            }
        }

        Ok(values)
    }

    /// Read an index accessor of any unsigned scalar type, widened to `u32`.
    ///
    /// # Errors
    /// Returns an error if the accessor is not an unsigned scalar.
    pub fn read_indices(&self, index: usize) -> Result<Vec<u32>> {
        let layout = self.layout(index)?;
        match (layout.component, layout.element) {
            (ComponentType::U8, AccessorType::Scalar) => {
                Ok(self.read_typed::<u8>(index)?.iter().map(|&i| u32::from(i)).collect())
            }
            (ComponentType::U16, AccessorType::Scalar) => {
                Ok(self.read_typed::<u16>(index)?.iter().map(|&i| u32::from(i)).collect())
            }
            _ => Ok(self.read_typed::<u32>(index)?.into_owned()),
        }
    }

    /// Read a JOINTS_n accessor (u8 or u16 components).
    ///
    /// # Errors
    /// Returns an error if the accessor is not an unsigned 4-vector.
    pub fn read_joints(&self, index: usize) -> Result<Vec<[u16; 4]>> {
        let layout = self.layout(index)?;
        if layout.component == ComponentType::U8 {
            return Ok(self
                .read_typed::<[u8; 4]>(index)?
                .iter()
                .map(|j| j.map(u16::from))
                .collect());
        }
        Ok(self.read_typed::<[u16; 4]>(index)?.into_owned())
    }

    /// Read a WEIGHTS_n accessor (float, or normalized u8/u16 components).
    ///
    /// # Errors
    /// Returns an error if the accessor is not a 4-vector of a weight type.
    pub fn read_weights(&self, index: usize) -> Result<Vec<[f32; 4]>> {
        let layout = self.layout(index)?;
        match layout.component {
            ComponentType::U8 => Ok(self
                .read_typed::<[u8; 4]>(index)?
                .iter()
                .map(|w| w.map(|c| f32::from(c) / 255.0))
                .collect()),
            ComponentType::U16 => Ok(self
                .read_typed::<[u16; 4]>(index)?
                .iter()
                .map(|w| w.map(|c| f32::from(c) / 65535.0))
                .collect()),
            _ => Ok(self.read_typed::<[f32; 4]>(index)?.into_owned()),
        }
    }

    fn view(&self, index: usize) -> Result<&'a GltfBufferView> {
        self.document.buffer_views.get(index).ok_or(Error::InvalidReference {
            kind: "bufferView",
            index,
        })
    }

    fn read_sparse_indices(&self, index: usize, accessor: &GltfAccessor) -> Result<Vec<u32>> {
        let Some(sparse) = &accessor.sparse else {
            return Ok(Vec::new());
        };
        let bytes = self.view_bytes(sparse.indices.buffer_view)?;
        let offset = sparse.indices.byte_offset.unwrap_or(0);
        let count = sparse.count;
        match ComponentType::from_code(sparse.indices.component_type) {
            Some(ComponentType::U8) => Ok(read_elements::<u8>(index, bytes, offset, None, count)?
                .iter()
                .map(|&i| u32::from(i))
                .collect()),
            Some(ComponentType::U16) => Ok(read_elements::<u16>(index, bytes, offset, None, count)?
                .iter()
                .map(|&i| u32::from(i))
                .collect()),
            Some(ComponentType::U32) => {
                Ok(read_elements::<u32>(index, bytes, offset, None, count)?.into_owned())
            }
            _ => Err(Error::UnsupportedAccessorLayout {
                component_type: sparse.indices.component_type,
                accessor_type: "SCALAR".to_string(),
            }),
        }
    }
}

/// Reinterpret `count` elements starting at `offset` with an optional stride.
fn read_elements<T: Element>(
    accessor: usize,
    bytes: &[u8],
    offset: usize,
    stride: Option<usize>,
    count: usize,
) -> Result<Cow<'_, [T]>> {
    let size = size_of::<T>();
    let stride = stride.unwrap_or(size).max(size);
    let span = match count.checked_sub(1) {
        None => Some(0),
        Some(last) => last.checked_mul(stride).and_then(|b| b.checked_add(size)),
    };
    let end = span.and_then(|s| offset.checked_add(s)).unwrap_or(usize::MAX);
    let data = bytes.get(offset..end).ok_or(Error::AccessorOutOfBounds {
        accessor,
        end,
        available: bytes.len(),
    })?;

    if stride == size {
        if let Ok(slice) = bytemuck::try_cast_slice::<u8, T>(data) {
            return Ok(Cow::Borrowed(slice));
        }
    }
    Ok(Cow::Owned(
        (0..count)
            .map(|i| bytemuck::pod_read_unaligned(&data[i * stride..i * stride + size]))
            .collect(),
    ))
}

/// Allocate `count` zeroed elements for an accessor without a bufferView.
fn zeroed_elements<T: Element>(accessor: usize, count: usize) -> Result<Vec<T>> {
    let too_large = Error::AccessorTooLarge { accessor, count };
    if count.checked_mul(size_of::<T>()).is_none() {
        return Err(too_large);
    }
    let mut values = Vec::new();
    values.try_reserve_exact(count).map_err(|_| too_large)?;
    values.resize(count, T::zeroed());
    Ok(values)
}

/// Decode a `data:[mime];base64,` URI.
fn decode_data_uri(index: usize, uri: &str) -> Result<Vec<u8>> {
    let Some((_, payload)) = uri.split_once(";base64,") else {
        return Err(Error::UnsupportedBufferUri {
            index,
            uri: uri.chars().take(48).collect(),
        });
    };
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}
