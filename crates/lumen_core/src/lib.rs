//! Lumen Core - Scene description for the lumen ray tracer.
//!
//! This crate provides the read-only data the renderer consumes:
//!
//! - **Geometry**: `Sphere`, `Plane`, `Triangle`, `Ellipsoid`
//! - **Shading inputs**: `Material`, `Light`
//! - **Scene**: `Primitive`, `Scene`, `Camera`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lumen_core::{Camera, Color, Light, Material, Scene, Sphere};
//! use lumen_math::Vec3;
//!
//! let mut scene = Scene::new(Camera::default()).with_sky_color(Color::new(0.5, 0.7, 1.0));
//! let red = Arc::new(Material::new("red", Color::new(0.8, 0.1, 0.1)));
//! scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0), red).unwrap();
//! scene.add_light(Light::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE));
//! assert_eq!(scene.len(), 1);
//! ```

pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;

// Re-export commonly used types
pub use camera::{Camera, Viewport};
pub use geometry::{Ellipsoid, Geometry, Plane, Sphere, Triangle};
pub use light::Light;
pub use material::{Color, Material};
pub use scene::{Primitive, Scene, SceneError};
