//! Four-slot bone influence accumulator.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Maximum number of bone influences per vertex (glTF `JOINTS_0`/`WEIGHTS_0`).
pub const MAX_INFLUENCES: usize = 4;

/// Up to four `(vertex group, weight)` influences of one vertex.
///
/// A slot is free while its weight is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneWeight {
    pub groups: [usize; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl BoneWeight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an influence in the first free slot.
    ///
    /// Zero weights are ignored.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWeight`] for a negative or non-finite weight
    /// and [`Error::TooManyInfluences`] if all four slots are taken.
    pub fn push(&mut self, group: usize, weight: f32) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight { group, weight });
        }
        if weight == 0.0 {
            return Ok(());
        }
        let slot = self
            .weights
            .iter()
            .position(|&w| w == 0.0)
            .ok_or(Error::TooManyInfluences { group })?;
        self.groups[slot] = group;
        self.weights[slot] = weight;
        Ok(())
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all stored weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Remap vertex groups to joint indices and normalize.
    ///
    /// Influences whose group has no joint in `group_to_joint` are dropped,
    /// and the remaining weights are divided by their own sum. Free slots get
    /// joint 0 with weight 0. Returns `None` if nothing remains.
    #[must_use]
    pub fn to_joints_and_weights(
        &self,
        group_to_joint: &HashMap<usize, u16>,
    ) -> Option<([u16; MAX_INFLUENCES], [f32; MAX_INFLUENCES])> {
        let mut joints = [0u16; MAX_INFLUENCES];
        let mut weights = [0.0f32; MAX_INFLUENCES];
        let mut out = 0;
        for (group, weight) in self.groups.iter().zip(self.weights) {
            if weight == 0.0 {
                continue;
            }
            if let Some(&joint) = group_to_joint.get(group) {
                joints[out] = joint;
                weights[out] = weight;
                out += 1;
            }
        }

        let total: f32 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        for w in &mut weights[..out] {
            *w /= total;
        }
        Some((joints, weights))
    }
}
