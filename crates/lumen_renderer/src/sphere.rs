//! Sphere intersection.

use crate::intersection::{Intersect, SurfaceHit};
use lumen_core::Sphere;
use lumen_math::{Interval, Ray, Vec3};

/// Solve `|O + tD - C|^2 = r^2` for a sphere centered at `oc = C - O`.
///
/// The discriminant comes from the perpendicular distance between the line
/// and the center, and the near root from `c / q`, so neither loses the
/// radius to cancellation when the origin is far from the sphere.
///
/// Returns the smallest non-negative root inside `ray_t`.
pub(crate) fn nearest_root(direction: Vec3, oc: Vec3, radius_squared: f32, ray_t: Interval) -> Option<f32> {
    let a = direction.length_squared();
    let h = direction.dot(oc);

    let perpendicular = oc - (h / a) * direction;
    let discriminant = radius_squared - perpendicular.length_squared();
    if discriminant < 0.0 {
        return None;
    }

    let c = oc.length_squared() - radius_squared;
    let q = h + (a * discriminant).sqrt().copysign(h);
    let (near, far) = if q == 0.0 {
        // Tangent at the origin
        (0.0, 0.0)
    } else {
        let (t0, t1) = (c / q, q / a);
        (t0.min(t1), t0.max(t1))
    };

    let accept = |root: f32| root >= 0.0 && ray_t.contains(root);
    if accept(near) {
        return Some(near);
    }
    accept(far).then_some(far)
}

impl Intersect for Sphere {
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        let oc = self.center - ray.origin;
        let t = nearest_root(ray.direction, oc, self.radius * self.radius, ray.interval())?;
        let outward_normal = (ray.at(t) - self.center) / self.radius;

        Some(SurfaceHit { t, outward_normal })
    }
}
