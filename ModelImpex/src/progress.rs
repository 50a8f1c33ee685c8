//! Progress reporting for import and export.
//!
//! Import reports `ReadingFile`, `ResolvingBuffers`, one `ReadingMeshes`
//! update per mesh and `BuildingScene`. Export reports one `WritingMeshes`
//! update per mesh, `WritingScene` and `WritingOutput`. Both end with
//! `Complete` when driven through [`crate::converter`].

use std::fmt;

/// Borrowed progress sink.
pub type ImpexProgressCallback<'a> = &'a (dyn Fn(&ImpexProgress) + Sync + Send);

/// One progress update.
#[derive(Debug, Clone)]
pub struct ImpexProgress {
    pub phase: ImpexPhase,
    /// 1-based position within the phase
    pub current: usize,
    pub total: usize,
    /// Mesh name or output path
    pub current_item: Option<String>,
}

impl ImpexProgress {
    #[must_use]
    pub fn new(phase: ImpexPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: None,
        }
    }

    #[must_use]
    pub fn with_item(phase: ImpexPhase, current: usize, total: usize, item: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: Some(item.into()),
        }
    }

    /// Fraction of the phase done, in `0.0..=1.0`. A phase with no items
    /// counts as done.
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

impl fmt::Display for ImpexProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}/{}]", self.phase.as_str(), self.current, self.total)?;
        if let Some(item) = &self.current_item {
            write!(f, " {item}")?;
        }
        Ok(())
    }
}

/// Phase of an import or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpexPhase {
    // === Import ===
    /// Reading the GLB container or `.gltf` JSON
    ReadingFile,
    /// Resolving buffers
    ResolvingBuffers,
    /// Reading meshes out of accessors
    ReadingMeshes,
    /// Rebuilding nodes, skins and humanoid roles
    BuildingScene,

    // === Export ===
    /// Converting and writing meshes
    WritingMeshes,
    /// Writing nodes, skins and materials
    WritingScene,
    /// Writing the GLB container or `.gltf` + `.bin`
    WritingOutput,

    // === Common ===
    /// Operation complete
    Complete,
}

impl ImpexPhase {
    /// Whether this phase only occurs while importing.
    #[must_use]
    pub const fn is_import(self) -> bool {
        matches!(
            self,
            Self::ReadingFile | Self::ResolvingBuffers | Self::ReadingMeshes | Self::BuildingScene
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingFile => "Reading file",
            Self::ResolvingBuffers => "Resolving buffers",
            Self::ReadingMeshes => "Reading meshes",
            Self::BuildingScene => "Building scene",
            Self::WritingMeshes => "Writing meshes",
            Self::WritingScene => "Writing scene",
            Self::WritingOutput => "Writing output",
            Self::Complete => "Complete",
        }
    }
}

/// Callback that ignores every update.
pub(crate) fn no_progress(_: &ImpexProgress) {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percentage() {
        assert_eq!(ImpexProgress::new(ImpexPhase::ReadingMeshes, 1, 4).percentage(), 0.25);
        assert_eq!(ImpexProgress::new(ImpexPhase::Complete, 0, 0).percentage(), 1.0);
    }

    #[test]
    fn test_display() {
        let progress = ImpexProgress::with_item(ImpexPhase::WritingMeshes, 2, 3, "Body");
        assert_eq!(progress.to_string(), "Writing meshes [2/3] Body");
        assert_eq!(ImpexProgress::new(ImpexPhase::BuildingScene, 0, 1).to_string(), "Building scene [0/1]");
    }

    #[test]
    fn test_phase_direction() {
        assert!(ImpexPhase::ReadingMeshes.is_import());
        assert!(!ImpexPhase::WritingOutput.is_import());
        assert!(!ImpexPhase::Complete.is_import());
    }
}
