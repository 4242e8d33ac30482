//! Scene types consumed by the renderer.
//!
//! A `Scene` is assembled by a loader before rendering and is read-only
//! afterwards; it can be shared by reference across render threads.

use std::sync::Arc;

use lumen_math::{Aabb, Vec3};
use thiserror::Error;

use crate::{Camera, Color, Geometry, Light, Material};

/// Errors raised while assembling a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Degenerate {kind}: {reason}")]
    DegenerateGeometry { kind: &'static str, reason: String },

    #[error("Invalid material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },
}

/// A shape paired with the material it is shaded with.
///
/// Materials are shared between primitives and never mutated.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub geometry: Geometry,
    pub material: Arc<Material>,
}

impl Primitive {
    /// Create a primitive, validating its geometry and material.
    pub fn new(geometry: impl Into<Geometry>, material: Arc<Material>) -> Result<Self, SceneError> {
        let geometry = geometry.into().validated()?;
        material.validate()?;
        Ok(Self { geometry, material })
    }

    pub fn bounding_box(&self) -> Aabb {
        self.geometry.bounding_box()
    }

    pub fn centroid(&self) -> Vec3 {
        self.geometry.centroid()
    }
}

/// The complete scene: primitives, lights, camera and sky.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    camera: Camera,
    sky_color: Color,
}

impl Scene {
    /// Create an empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            primitives: Vec::new(),
            lights: Vec::new(),
            camera,
            sky_color: Color::ZERO,
        }
    }

    /// Set the radiance returned by rays that escape the scene.
    pub fn with_sky_color(mut self, sky_color: Color) -> Self {
        self.sky_color = sky_color;
        self
    }

    /// Add a primitive, returning its index.
    ///
    /// Degenerate shapes and invalid materials are reported and left out of
    /// the scene; the caller decides whether that is fatal.
    pub fn add_primitive(
        &mut self,
        geometry: impl Into<Geometry>,
        material: Arc<Material>,
    ) -> Result<usize, SceneError> {
        let primitive = Primitive::new(geometry, material).map_err(|err| {
            log::warn!("Skipping primitive {}: {}", self.primitives.len(), err);
            err
        })?;
        self.primitives.push(primitive);
        Ok(self.primitives.len() - 1)
    }

    /// Add a point light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn sky_color(&self) -> Color {
        self.sky_color
    }

    /// Get the number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Check if the scene has no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Union of all primitive bounds (`Aabb::EMPTY` for an empty scene).
    pub fn bounds(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box()))
    }
}
