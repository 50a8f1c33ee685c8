//! Minimal material description carried through import and export.

use crate::formats::gltf::{GltfMaterial, GltfPbrMetallicRoughness};

/// How alpha is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask(f32),
    Blend,
}

/// Factor-only PBR material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
}

impl Material {
    /// An opaque white material with glTF's default factors.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color: [1.0; 4],
            metallic: 1.0,
            roughness: 1.0,
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
        }
    }

    #[must_use]
    pub fn with_base_color(mut self, base_color: [f32; 4]) -> Self {
        self.base_color = base_color;
        self
    }

    /// Build from a glTF material, applying glTF defaults for absent fields.
    #[must_use]
    pub fn from_gltf(index: usize, material: &GltfMaterial) -> Self {
        let pbr = material.pbr_metallic_roughness.clone().unwrap_or_default();
        let alpha_mode = match material.alpha_mode.as_deref() {
            Some("MASK") => AlphaMode::Mask(material.alpha_cutoff.unwrap_or(0.5)),
            Some("BLEND") => AlphaMode::Blend,
            _ => AlphaMode::Opaque,
        };
        Self {
            name: material.name.clone().unwrap_or_else(|| format!("material_{index}")),
            base_color: pbr.base_color_factor.unwrap_or([1.0; 4]),
            metallic: pbr.metallic_factor.unwrap_or(1.0),
            roughness: pbr.roughness_factor.unwrap_or(1.0),
            alpha_mode,
            double_sided: material.double_sided.unwrap_or(false),
        }
    }

    /// Convert to a glTF material, omitting fields that hold their default.
    #[must_use]
    pub fn to_gltf(&self) -> GltfMaterial {
        let (alpha_mode, alpha_cutoff) = match self.alpha_mode {
            AlphaMode::Opaque => (None, None),
            AlphaMode::Mask(cutoff) => (Some("MASK".to_string()), Some(cutoff)),
            AlphaMode::Blend => (Some("BLEND".to_string()), None),
        };
        GltfMaterial {
            name: Some(self.name.clone()),
            pbr_metallic_roughness: Some(GltfPbrMetallicRoughness {
                base_color_factor: Some(self.base_color),
                metallic_factor: (self.metallic != 1.0).then_some(self.metallic),
                roughness_factor: (self.roughness != 1.0).then_some(self.roughness),
            }),
            emissive_factor: None,
            alpha_mode,
            alpha_cutoff,
            double_sided: self.double_sided.then_some(true),
        }
    }
}
