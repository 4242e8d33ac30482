//! Image tiling for the parallel render loop.
//!
//! Buckets are the unit of work handed to rayon. Every pixel is traced
//! independently, so the tiling only affects scheduling, never the image.

use lumen_core::{Color, Scene, Viewport};

use crate::intersection::Hittable;
use crate::renderer::{render_pixel, RenderConfig};

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Image coordinates covered by the bucket, row-major.
    pub fn pixels(self) -> impl Iterator<Item = (u32, u32)> {
        let Bucket { x, y, width, height } = self;
        (y..y + height).flat_map(move |py| (x..x + width).map(move |px| (px, py)))
    }
}

/// Cover a `width` x `height` image with row-major tiles of at most
/// `bucket_size` pixels per edge. Tiles on the right and bottom edges are
/// cropped to the image.
///
/// `bucket_size` must be non-zero.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    debug_assert!(bucket_size > 0);
    let step = bucket_size as usize;

    (0..height)
        .step_by(step)
        .flat_map(|y| {
            (0..width).step_by(step).map(move |x| Bucket {
                x,
                y,
                width: bucket_size.min(width - x),
                height: bucket_size.min(height - y),
            })
        })
        .collect()
}

/// Trace every pixel of `bucket`, in the order of [`Bucket::pixels`].
pub fn render_bucket(
    bucket: &Bucket,
    viewport: &Viewport,
    world: &dyn Hittable,
    scene: &Scene,
    config: &RenderConfig,
) -> Vec<Color> {
    bucket
        .pixels()
        .map(|(x, y)| render_pixel(viewport, world, scene, x, y, config))
        .collect()
}
