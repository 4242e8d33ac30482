//! Triangle intersection.
//!
//! Intersects the supporting plane, then keeps the hit point only if it lies
//! strictly on the inner side of all three edges.

use crate::intersection::{Intersect, SurfaceHit};
use lumen_core::Triangle;
use lumen_math::Ray;

impl Intersect for Triangle {
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        let normal = self.face_normal();
        let denominator = normal.dot(ray.direction);

        // Ray is parallel to triangle
        if denominator == 0.0 {
            return None;
        }

        let t = normal.dot(self.v0 - ray.origin) / denominator;
        if !t.is_finite() || !ray.interval().contains(t) {
            return None;
        }

        // Same-side test: each edge's cross product must agree with the normal.
        // Zero (a point on an edge) counts as outside.
        let p = ray.at(t);
        let edges = [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)];
        for (a, b) in edges {
            if normal.dot((b - a).cross(p - a)) <= 0.0 {
                return None;
            }
        }

        Some(SurfaceHit {
            t,
            outward_normal: normal.normalize(),
        })
    }
}
