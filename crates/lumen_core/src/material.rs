//! Surface material for the Cook-Torrance reflectance model.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::SceneError;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// A rough dielectric surface.
///
/// Immutable once the scene is built; primitives share it through an `Arc`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material name, for diagnostics
    pub name: String,

    /// Lambertian albedo (RGB, 0-1)
    pub diffuse_color: Color,

    /// Tint of the microfacet specular lobe
    pub specular_color: Color,

    /// Beckmann roughness (alpha); 0 is a perfect mirror lobe
    pub roughness: f32,

    /// Index of refraction of the surface, relative to vacuum
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_color: Color::new(0.5, 0.5, 0.5), // Grey default
            specular_color: Color::ONE,
            roughness: 0.3,
            ior: 1.5,
        }
    }
}

impl Material {
    /// Create a new material with just a name and diffuse color.
    pub fn new(name: impl Into<String>, diffuse_color: Color) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
            ..Default::default()
        }
    }

    /// Builder method to set the specular tint.
    pub fn with_specular(mut self, specular_color: Color) -> Self {
        self.specular_color = specular_color;
        self
    }

    /// Builder method to set roughness.
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Builder method to set the index of refraction.
    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    /// Reject parameters the reflectance model cannot evaluate.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason: &str| SceneError::InvalidMaterial {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !(self.roughness >= 0.0 && self.roughness.is_finite()) {
            return Err(invalid("roughness must be non-negative and finite"));
        }
        if !(self.ior > 0.0 && self.ior.is_finite()) {
            return Err(invalid("index of refraction must be positive and finite"));
        }
        if !self.diffuse_color.is_finite() || !self.specular_color.is_finite() {
            return Err(invalid("colors must be finite"));
        }
        Ok(())
    }
}
