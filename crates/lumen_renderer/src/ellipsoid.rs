//! Axis-aligned ellipsoid intersection.
//!
//! Dividing by the radii maps the ellipsoid onto the unit sphere. The map is
//! linear, so t is the same in both frames.

use crate::intersection::{Intersect, SurfaceHit};
use crate::sphere::nearest_root;
use lumen_core::Ellipsoid;
use lumen_math::Ray;

impl Intersect for Ellipsoid {
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        let inv_radii = self.radii.recip();
        let direction = ray.direction * inv_radii;
        let oc = (self.center - ray.origin) * inv_radii;

        let t = nearest_root(direction, oc, 1.0, ray.interval())?;

        // Gradient of |(p - c) / r|^2
        let local = ray.at(t) - self.center;
        let outward_normal = (local * inv_radii * inv_radii).normalize();

        Some(SurfaceHit { t, outward_normal })
    }
}
