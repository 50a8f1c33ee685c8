//! Import and export options
//!
//! Builder-style configuration for [`crate::converter`] entry points.

use crate::coordinate::AxisConversion;

/// Generator string written to `asset.generator` by default.
pub const DEFAULT_GENERATOR: &str = concat!("modelimpex ", env!("CARGO_PKG_VERSION"));

/// Post-processing applied to a freshly imported scene.
///
/// # Example
///
/// ```
/// use modelimpex::ImportOptions;
///
/// let options = ImportOptions::new()
///     .with_rename_humanoid_bones(true)
///     .with_prune_empty_leaves(true);
/// assert!(options.prune_empty_leaves);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Rename nodes with a humanoid role to the role's VRM name
    pub rename_humanoid_bones: bool,

    /// Detach leaf nodes that carry no mesh, joint or humanoid role
    pub prune_empty_leaves: bool,
}

impl ImportOptions {
    /// Create new options with all post-processing disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rename_humanoid_bones(mut self, rename: bool) -> Self {
        self.rename_humanoid_bones = rename;
        self
    }

    #[must_use]
    pub fn with_prune_empty_leaves(mut self, prune: bool) -> Self {
        self.prune_empty_leaves = prune;
        self
    }
}

/// How a scene is written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Host-to-glTF axis mapping used when converting face meshes
    pub axis: AxisConversion,

    /// Store morph target deltas sparsely when that is smaller
    /// Default: true
    pub sparse_morph_targets: bool,

    /// Value of `asset.generator`
    pub generator: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            axis: AxisConversion::default(),
            sparse_morph_targets: true,
            generator: Some(DEFAULT_GENERATOR.to_string()),
        }
    }
}

impl ExportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_axis(mut self, axis: AxisConversion) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_sparse_morph_targets(mut self, sparse: bool) -> Self {
        self.sparse_morph_targets = sparse;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_defaults() {
        let options = ExportOptions::new();
        assert!(options.sparse_morph_targets);
        assert_eq!(options.axis, AxisConversion::Standard);
        assert!(options.generator.unwrap().starts_with("modelimpex "));
    }

    #[test]
    fn test_builders() {
        let options = ExportOptions::new()
            .with_axis(AxisConversion::Identity)
            .with_sparse_morph_targets(false)
            .with_generator(None);
        assert_eq!(options.axis, AxisConversion::Identity);
        assert!(!options.sparse_morph_targets);
        assert_eq!(options.generator, None);

        let import = ImportOptions::new().with_rename_humanoid_bones(true);
        assert!(import.rename_humanoid_bones);
        assert!(!import.prune_empty_leaves);
    }
}
