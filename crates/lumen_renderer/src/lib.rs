//! Lumen Renderer - geometric core of the lumen ray tracer.
//!
//! - Closed-form intersection for spheres, planes, triangles and ellipsoids
//! - A kd-tree spatial index with ordered traversal
//! - A Cook-Torrance BRDF with Beckmann distribution and Smith masking
//! - A recursive integrator with shadow rays and one mirror bounce per hit
//! - A bucketed, multithreaded render loop
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lumen_core::{Camera, Color, Light, Material, Scene, Sphere};
//! use lumen_math::{Ray, Vec3};
//! use lumen_renderer::{build_index, trace};
//!
//! let mut scene = Scene::new(Camera::default());
//! let grey = Arc::new(Material::new("grey", Color::splat(0.5)));
//! scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0), grey).unwrap();
//! scene.add_light(Light::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE));
//!
//! let tree = build_index(&scene);
//! let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
//! assert_eq!(trace(&scene, Some(&tree), ray), trace(&scene, None, ray));
//! ```

pub mod brdf;
mod bucket;
mod ellipsoid;
pub mod integrator;
mod intersection;
pub mod kdtree;
mod plane;
mod renderer;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
pub use integrator::{radiance, trace, trace_with_config, ACNE_BIAS, MAX_DEPTH};
pub use intersection::{intersect_primitive, Hittable, Intersect, Intersection, SurfaceHit};
pub use kdtree::{build_index, IndexedScene, KdNode, KdTree};
pub use renderer::{color_to_rgba, linear_to_gamma, render, render_pixel, ImageBuffer, RenderConfig, RenderError};
