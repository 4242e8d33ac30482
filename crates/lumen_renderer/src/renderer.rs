//! Image rendering on top of the integrator.
//!
//! Implements the per-pixel render loop:
//! - One primary ray per pixel center, traced with `integrator::radiance`
//! - Bucketed, data-parallel dispatch on a rayon pool
//! - Gamma 2 encoding for 8-bit output

use std::time::Instant;

use lumen_core::{Color, Scene, Viewport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
use crate::integrator::{radiance, ACNE_BIAS, MAX_DEPTH};
use crate::intersection::Hittable;
use crate::kdtree::{IndexedScene, KdTree};

/// Errors that prevent a render from starting.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Bucket size must be at least 1 pixel")]
    InvalidBucketSize,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Deepest traced bounce (primary rays are depth 0)
    pub max_depth: u32,
    /// Offset for shadow and reflected ray origins
    pub acne_bias: f32,
    /// Query through a kd-tree instead of scanning every primitive
    pub use_index: bool,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Worker threads; `None` uses the available parallelism
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            acne_bias: ACNE_BIAS,
            use_index: true,
            bucket_size: DEFAULT_BUCKET_SIZE,
            threads: None,
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let encode = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Trace the primary ray through pixel (x, y).
///
/// A non-finite result is replaced by black so one bad pixel cannot spoil
/// the image.
pub fn render_pixel(
    viewport: &Viewport,
    world: &dyn Hittable,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
) -> Color {
    let ray = viewport.primary_ray(x, y);
    let color = radiance(world, scene, ray, config);

    if color.is_finite() {
        color
    } else {
        log::debug!("Non-finite radiance {} at pixel ({}, {}), writing black", color, x, y);
        Color::ZERO
    }
}

/// Linear color image in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Copy the pixels of a rendered bucket into place.
    pub fn write_bucket(&mut self, bucket: &Bucket, pixels: &[Color]) {
        for ((x, y), color) in bucket.pixels().zip(pixels) {
            self.set(x, y, *color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|color| color_to_rgba(*color)).collect()
    }
}

/// Render `scene` through its camera at `width` x `height`.
///
/// With `config.use_index` the supplied tree is used, or one is built for
/// this render when `index` is `None`. Without it every query scans all
/// primitives. The image does not depend on the thread count.
pub fn render(
    scene: &Scene,
    index: Option<&KdTree>,
    width: u32,
    height: u32,
    config: &RenderConfig,
) -> Result<ImageBuffer, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }
    if config.bucket_size == 0 {
        return Err(RenderError::InvalidBucketSize);
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let owned_tree;
    let index = match index {
        _ if !config.use_index => None,
        Some(tree) => Some(tree),
        None => {
            owned_tree = KdTree::build(scene);
            Some(&owned_tree)
        }
    };

    let indexed = index.map(|tree| IndexedScene::new(scene, tree));
    let world: &dyn Hittable = match &indexed {
        Some(indexed) => indexed,
        None => scene,
    };

    let viewport = scene.camera().viewport(width, height);
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{}: {} primitives, {} lights, {} buckets on {} threads ({})",
        width,
        height,
        scene.len(),
        scene.lights().len(),
        buckets.len(),
        pool.current_num_threads(),
        if indexed.is_some() { "kd-tree" } else { "brute force" }
    );
    let start = Instant::now();

    let results: Vec<(Bucket, Vec<Color>)> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| (*bucket, render_bucket(bucket, &viewport, world, scene, config)))
            .collect()
    });

    let mut image = ImageBuffer::new(width, height);
    for (bucket, pixels) in &results {
        image.write_bucket(bucket, pixels);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Camera, Light, Material, Plane, Sphere};
    use lumen_math::Vec3;
    use std::sync::Arc;

    fn test_scene() -> Scene {
        let camera = Camera::new().with_position(Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y);
        let mut scene = Scene::new(camera).with_sky_color(Color::new(0.5, 0.7, 1.0));

        let red = Arc::new(Material::new("red", Color::new(0.8, 0.1, 0.1)));
        let grey = Arc::new(Material::new("grey", Color::splat(0.5)).with_roughness(0.6));
        scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.5, 0.0), 0.5), red.clone()).unwrap();
        scene.add_primitive(Sphere::new(Vec3::new(1.2, 0.4, -0.5), 0.4), red).unwrap();
        scene.add_primitive(Plane::through(Vec3::ZERO, Vec3::Y), grey).unwrap();
        scene.add_light(Light::new(Vec3::new(3.0, 5.0, 3.0), Color::splat(8.0)));
        scene
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(4.0, -1.0, 0.25)), [255, 0, 127, 255]);
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: RenderConfig = serde_json::from_str(r#"{ "max_depth": 2, "threads": 3 }"#).unwrap();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.acne_bias, ACNE_BIAS);
        assert!(config.use_index);
        assert_eq!(config.bucket_size, DEFAULT_BUCKET_SIZE);

        let config: RenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_invalid_resolution() {
        let scene = test_scene();
        let result = render(&scene, None, 0, 10, &RenderConfig::default());
        assert!(matches!(result, Err(RenderError::InvalidResolution { width: 0, height: 10 })));
    }

    #[test]
    fn test_invalid_bucket_size() {
        let scene = test_scene();
        let config = RenderConfig {
            bucket_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(render(&scene, None, 4, 4, &config), Err(RenderError::InvalidBucketSize)));
    }

    #[test]
    fn test_render_center_hits_sphere() {
        let scene = test_scene();
        let image = render(&scene, None, 32, 24, &RenderConfig::default()).unwrap();

        assert_eq!(image.pixels.len(), 32 * 24);
        // Center pixel sees the red sphere, top row sees sky
        let center = image.get(16, 12);
        assert!(center.x > center.z);
        assert_eq!(image.get(16, 0), scene.sky_color());
        assert!(image.pixels.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_render_independent_of_index_and_threads() {
        let scene = test_scene();
        let tree = KdTree::build(&scene);

        let brute = RenderConfig {
            use_index: false,
            threads: Some(1),
            bucket_size: 7,
            ..RenderConfig::default()
        };
        let indexed = RenderConfig {
            threads: Some(4),
            bucket_size: 16,
            ..RenderConfig::default()
        };

        let a = render(&scene, None, 24, 16, &brute).unwrap();
        let b = render(&scene, Some(&tree), 24, 16, &indexed).unwrap();
        let c = render(&scene, None, 24, 16, &indexed).unwrap();

        for ((pa, pb), pc) in a.pixels.iter().zip(&b.pixels).zip(&c.pixels) {
            assert!((*pa - *pb).length() < 1e-3);
            assert_eq!(pb, pc);
        }
    }

    #[test]
    fn test_non_finite_pixel_is_black() {
        let mut scene = test_scene();
        scene.add_light(Light::new(Vec3::new(0.0, 5.0, 5.0), Color::splat(f32::NAN)));

        let viewport = scene.camera().viewport(8, 8);
        let color = render_pixel(&viewport, &scene, &scene, 4, 4, &RenderConfig::default());
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_to_rgba_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Color::ONE);
        assert_eq!(image.to_rgba(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
