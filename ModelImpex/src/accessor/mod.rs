//! Typed accessors over glTF buffers.
//!
//! - [`BufferManager`] builds the binary blob on export, choosing sparse
//!   storage when it is smaller.
//! - [`BufferReader`] reads accessors back as slices of [`Element`] types.

pub mod buffer_manager;
pub mod element;
pub mod layout;
pub mod reader;

pub use buffer_manager::{BufferManager, MinMaxFn, min_max_vec3};
pub use element::Element;
pub use layout::{AccessorLayout, AccessorType, ComponentType};
pub use reader::BufferReader;
