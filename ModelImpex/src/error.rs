//! Error types for `ModelImpex`

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed container, JSON, or accessor data.
    Format,
    /// A structural invariant would be broken.
    Invariant,
    /// An external buffer could not be resolved.
    Resource,
    /// Operating system I/O failure.
    Io,
}

/// The error type for `ModelImpex` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== GLB Container Errors ====================
    /// The file does not start with the `glTF` magic.
    #[error("invalid GLB magic: expected glTF, found {0:?}")]
    InvalidGlbMagic([u8; 4]),

    /// The GLB header declares a container version other than 2.
    #[error("unsupported GLB version: {version} (supported: 2)")]
    UnsupportedGlbVersion {
        /// The version found in the header.
        version: u32,
    },

    /// A chunk appeared where another one (or the end of data) was expected.
    #[error("unexpected GLB chunk {found:?} at offset {offset}: expected {expected}")]
    UnexpectedGlbChunk {
        /// Byte offset of the chunk header.
        offset: usize,
        /// What the container layout required at this position.
        expected: &'static str,
        /// The chunk type tag that was found.
        found: [u8; 4],
    },

    /// The input ends before a header or chunk body is complete.
    #[error("truncated GLB at offset {offset}: {needed} more bytes required")]
    GlbTruncated {
        /// Offset at which more data was required.
        offset: usize,
        /// Number of missing bytes.
        needed: usize,
    },

    /// The header's total length disagrees with the data.
    #[error("GLB length mismatch: header declares {declared} bytes, data has {actual}")]
    GlbLengthMismatch {
        /// Length from the header.
        declared: usize,
        /// Actual data length.
        actual: usize,
    },

    /// A chunk or the whole container exceeds the 32-bit length field.
    #[error("GLB too large: {length} bytes does not fit in a 32-bit length")]
    GlbTooLarge {
        /// The offending length.
        length: usize,
    },

    // ==================== Accessor Errors ====================
    /// A componentType/type combination outside the supported set.
    #[error("unsupported accessor layout: componentType {component_type}, type {accessor_type}")]
    UnsupportedAccessorLayout {
        /// Numeric glTF component type code.
        component_type: u32,
        /// glTF element type string.
        accessor_type: String,
    },

    /// An accessor was read as a Rust type with a different layout.
    #[error("accessor {accessor} is {found}, expected {expected}")]
    AccessorTypeMismatch {
        /// Accessor index.
        accessor: usize,
        /// Layout of the requested Rust type.
        expected: String,
        /// Layout declared in the document.
        found: String,
    },

    /// An accessor's byte span does not fit inside its bufferView.
    #[error("accessor {accessor} out of bounds: needs {end} bytes, view has {available}")]
    AccessorOutOfBounds {
        /// Accessor index.
        accessor: usize,
        /// Last byte (exclusive) the accessor would touch.
        end: usize,
        /// Length of the bufferView.
        available: usize,
    },

    /// An accessor declares more elements than can be allocated.
    #[error("accessor {accessor} declares {count} elements, too many to allocate")]
    AccessorTooLarge {
        /// Accessor index.
        accessor: usize,
        /// Declared element count.
        count: usize,
    },

    /// A bufferView's byte range does not fit inside its buffer.
    #[error("bufferView {view} out of bounds: needs {end} bytes, buffer has {available}")]
    BufferViewOutOfBounds {
        /// BufferView index.
        view: usize,
        /// Last byte (exclusive) the view would touch.
        end: usize,
        /// Length of the buffer.
        available: usize,
    },

    /// An accessor would have zero elements.
    #[error("accessor '{name}' would be empty")]
    EmptyAccessor {
        /// Name the accessor was pushed under.
        name: String,
    },

    // ==================== glTF Document Errors ====================
    /// A node carries both a `matrix` and translation/rotation/scale.
    #[error("node {node} has both a matrix and TRS properties")]
    NodeMatrixWithTrs {
        /// glTF node index.
        node: usize,
    },

    /// A node is listed as a child of more than one parent.
    #[error("node {node} has more than one parent")]
    MultipleParents {
        /// glTF node index.
        node: usize,
    },

    /// A mesh primitive lacks the mandatory POSITION attribute.
    #[error("mesh {mesh} primitive {primitive} has no POSITION attribute")]
    MissingPositions {
        /// glTF mesh index.
        mesh: usize,
        /// Primitive index within the mesh.
        primitive: usize,
    },

    /// A primitive uses a topology other than triangles.
    #[error("mesh {mesh} uses primitive mode {mode}, only triangles are supported")]
    UnsupportedPrimitiveMode {
        /// glTF mesh index.
        mesh: usize,
        /// The primitive mode code.
        mode: u32,
    },

    /// A humanoid extension names a bone this library does not know.
    #[error("unknown humanoid bone: {name}")]
    UnknownHumanoidBone {
        /// Bone name from the extension.
        name: String,
    },

    // ==================== Invariant Violations ====================
    /// Attaching the child would create a cycle.
    #[error("cannot attach node {child} under node {parent}: node is already in that hierarchy")]
    CyclicHierarchy {
        /// Prospective parent.
        parent: usize,
        /// Prospective child.
        child: usize,
    },

    /// A 5th non-zero influence was pushed into a bone weight.
    #[error("more than 4 bone influences (rejected group {group})")]
    TooManyInfluences {
        /// Vertex group index of the rejected influence.
        group: usize,
    },

    /// A bone influence is negative, NaN or infinite.
    #[error("invalid bone weight {weight} for group {group}")]
    InvalidWeight {
        /// Vertex group index of the rejected influence.
        group: usize,
        /// The rejected weight.
        weight: f32,
    },

    /// A vertex has no influence on any joint of the skin.
    #[error("vertex {vertex} has zero total bone influence")]
    ZeroWeightVertex {
        /// Position index in the source mesh.
        vertex: usize,
    },

    /// A morph target is not aligned with its vertex array.
    #[error("morph target '{name}' has {found} entries, expected {expected}")]
    MorphTargetLengthMismatch {
        /// Target name.
        name: String,
        /// Vertex count of the mesh.
        expected: usize,
        /// Length of the target.
        found: usize,
    },

    /// A vertex attribute array does not match the vertex count.
    #[error("attribute {attribute} has {found} elements, expected {expected}")]
    AttributeCountMismatch {
        /// Attribute name.
        attribute: &'static str,
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        found: usize,
    },

    /// An index points outside of the array it refers to.
    #[error("invalid {kind} reference: {index}")]
    InvalidReference {
        /// What kind of object was referenced.
        kind: &'static str,
        /// The offending index.
        index: usize,
    },

    /// Submesh ranges do not partition the index list.
    #[error("invalid submesh layout: {0}")]
    InvalidSubmeshLayout(String),

    // ==================== Resource Errors ====================
    /// A buffer file referenced by URI could not be read.
    #[error("external buffer '{uri}' could not be read: {source}")]
    ExternalBufferUnreadable {
        /// URI as written in the document.
        uri: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A buffer URI that cannot be resolved in this context.
    #[error("buffer {index} has unsupported URI: {uri}")]
    UnsupportedBufferUri {
        /// Buffer index.
        index: usize,
        /// URI (truncated for data URIs).
        uri: String,
    },

    /// A buffer without URI outside of a GLB container.
    #[error("buffer {index} has no URI and no GLB binary chunk is present")]
    MissingBinaryChunk {
        /// Buffer index.
        index: usize,
    },

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed base64 payload in a data URI.
    #[error("base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidGlbMagic(_)
            | Self::UnsupportedGlbVersion { .. }
            | Self::UnexpectedGlbChunk { .. }
            | Self::GlbTruncated { .. }
            | Self::GlbLengthMismatch { .. }
            | Self::GlbTooLarge { .. }
            | Self::UnsupportedAccessorLayout { .. }
            | Self::AccessorTypeMismatch { .. }
            | Self::AccessorOutOfBounds { .. }
            | Self::AccessorTooLarge { .. }
            | Self::BufferViewOutOfBounds { .. }
            | Self::NodeMatrixWithTrs { .. }
            | Self::MultipleParents { .. }
            | Self::MissingPositions { .. }
            | Self::UnsupportedPrimitiveMode { .. }
            | Self::UnknownHumanoidBone { .. }
            | Self::JsonError(_)
            | Self::Base64Error(_) => ErrorKind::Format,
            Self::EmptyAccessor { .. }
            | Self::CyclicHierarchy { .. }
            | Self::TooManyInfluences { .. }
            | Self::InvalidWeight { .. }
            | Self::ZeroWeightVertex { .. }
            | Self::MorphTargetLengthMismatch { .. }
            | Self::AttributeCountMismatch { .. }
            | Self::InvalidReference { .. }
            | Self::InvalidSubmeshLayout(_) => ErrorKind::Invariant,
            Self::ExternalBufferUnreadable { .. }
            | Self::UnsupportedBufferUri { .. }
            | Self::MissingBinaryChunk { .. } => ErrorKind::Resource,
        }
    }
}

/// Result type alias for `ModelImpex` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::InvalidGlbMagic(*b"PK\x03\x04").kind(), ErrorKind::Format);
        assert_eq!(
            Error::CyclicHierarchy { parent: 1, child: 0 }.kind(),
            ErrorKind::Invariant
        );
        assert_eq!(
            Error::UnsupportedBufferUri {
                index: 0,
                uri: "http://example.com/a.bin".into()
            }
            .kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn test_truncated_message_mentions_offset() {
        let err = Error::GlbTruncated { offset: 20, needed: 4 };
        assert_eq!(err.to_string(), "truncated GLB at offset 20: 4 more bytes required");
    }
}
