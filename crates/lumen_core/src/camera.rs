//! Pinhole camera for primary ray generation.

use lumen_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};

/// Camera placement. One ray per pixel, through the pixel center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
}

/// Camera basis resolved for one image size.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view, in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Resolve the camera basis for a `width` x `height` image.
    pub fn viewport(&self, width: u32, height: u32) -> Viewport {
        // Calculate viewport dimensions (focus plane at distance 1)
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (width as f32 / height as f32);

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).try_normalize().unwrap_or_else(|| {
            log::warn!("Camera look_from equals look_at, looking down -Z");
            Vec3::Z
        });
        let u = self.vup.cross(w).try_normalize().unwrap_or_else(|| {
            log::warn!("Camera vup {} is parallel to the view direction, picking another up", self.vup);
            w.any_orthonormal_vector()
        });
        let v = w.cross(u);

        // Image x grows along u, image y grows down
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / width as f32;
        let pixel_delta_v = viewport_v / height as f32;

        let viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;

        Viewport {
            center: self.look_from,
            pixel00_loc: viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v),
            pixel_delta_u,
            pixel_delta_v,
        }
    }

    /// Generate the primary ray through the center of pixel (x, y).
    pub fn primary_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        self.viewport(width, height).primary_ray(x, y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Generate the primary ray through the center of pixel (x, y).
    pub fn primary_ray(&self, x: u32, y: u32) -> Ray {
        let pixel_center =
            self.pixel00_loc + (x as f32) * self.pixel_delta_u + (y as f32) * self.pixel_delta_v;
        Ray::new(self.center, pixel_center - self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);

        // Odd resolution: the middle pixel looks straight down -Z
        let ray = camera.primary_ray(50, 50, 101, 101);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(ray.origin, Vec3::ZERO);
        assert_eq!(ray.depth, 0);
    }

    #[test]
    fn test_image_axes() {
        let camera = Camera::new().with_fov(90.0);
        let viewport = camera.viewport(100, 100);

        // Top-left looks up and to the left, bottom-right down and right
        let top_left = viewport.primary_ray(0, 0);
        assert!(top_left.direction.x < 0.0 && top_left.direction.y > 0.0);

        let bottom_right = viewport.primary_ray(99, 99);
        assert!(bottom_right.direction.x > 0.0 && bottom_right.direction.y < 0.0);
    }

    #[test]
    fn test_rays_are_normalized() {
        let camera = Camera::new().with_position(
            Vec3::new(3.0, 2.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
        );
        let ray = camera.primary_ray(7, 3, 40, 30);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vup_parallel_to_view_direction() {
        // Looking straight down with a Y up vector
        let camera = Camera::new().with_position(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        let viewport = camera.viewport(9, 9);

        let center = viewport.primary_ray(4, 4);
        assert!((center.direction - Vec3::NEG_Y).length() < 1e-5);

        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8)] {
            let ray = viewport.primary_ray(x, y);
            assert!(ray.direction.is_finite());
            assert!(ray.direction.y < 0.0);
        }
    }

    #[test]
    fn test_coincident_look_from_and_look_at() {
        let camera = Camera::new().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        let ray = camera.primary_ray(2, 2, 5, 5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
    }
}
