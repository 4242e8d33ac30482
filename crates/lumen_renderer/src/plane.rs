//! Infinite plane intersection.

use crate::intersection::{Intersect, SurfaceHit};
use lumen_core::Plane;
use lumen_math::Ray;

impl Intersect for Plane {
    /// Solves `dot(N, O + tD) + d = 0` for t.
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        let denominator = self.normal.dot(ray.direction);

        // Ray is parallel to the plane
        if denominator == 0.0 {
            return None;
        }

        let t = -(self.normal.dot(ray.origin) + self.dist) / denominator;
        if !t.is_finite() || !ray.interval().contains(t) {
            return None;
        }

        Some(SurfaceHit {
            t,
            outward_normal: self.normal,
        })
    }
}
