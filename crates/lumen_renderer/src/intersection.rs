//! Ray/primitive intersection and the brute-force scene query.
//!
//! Every test shares one `Ray` and narrows its `t_max` when it accepts a hit,
//! so feeding all primitives the same ray leaves it holding the nearest one.
//! The candidates for one ray must therefore be tested sequentially.

use lumen_core::{Geometry, Material, Primitive, Scene};
use lumen_math::{Ray, Vec3};

/// Distance and outward normal of a closed-form hit, before shading data is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: f32,
    pub outward_normal: Vec3,
}

/// Closed-form intersection against one shape.
pub trait Intersect {
    /// The nearest hit within `[ray.t_min, ray.t_max]`, if any. Does not modify the ray.
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit>;
}

impl Intersect for Geometry {
    fn intersect_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        match self {
            Geometry::Sphere(s) => s.intersect_surface(ray),
            Geometry::Plane(p) => p.intersect_surface(ray),
            Geometry::Triangle(t) => t.intersect_surface(ray),
            Geometry::Ellipsoid(e) => e.intersect_surface(ray),
        }
    }
}

/// Record of a ray-primitive intersection.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub position: Vec3,
    /// Unit surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> Intersection<'a> {
    fn new(ray: &Ray, hit: SurfaceHit, material: &'a Material) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction.dot(hit.outward_normal) < 0.0;
        let normal = if front_face {
            hit.outward_normal
        } else {
            -hit.outward_normal
        };

        Self {
            t: hit.t,
            position: ray.at(hit.t),
            normal,
            front_face,
            material,
        }
    }
}

/// Test one primitive, narrowing `ray.t_max` to the hit on success.
pub fn intersect_primitive<'a>(ray: &mut Ray, primitive: &'a Primitive) -> Option<Intersection<'a>> {
    let hit = primitive.geometry.intersect_surface(ray)?;
    ray.narrow(hit.t);
    Some(Intersection::new(ray, hit, &primitive.material))
}

/// Scene-level nearest-hit query.
pub trait Hittable: Send + Sync {
    /// Find the nearest hit within the ray's range.
    ///
    /// On a hit, `ray.t_max` is left at the hit distance.
    fn hit<'a>(&'a self, ray: &mut Ray) -> Option<Intersection<'a>>;
}

/// Brute force: every primitive is tested against the same, shrinking ray.
impl Hittable for Scene {
    fn hit<'a>(&'a self, ray: &mut Ray) -> Option<Intersection<'a>> {
        let mut closest = None;

        for primitive in self.primitives() {
            if let Some(intersection) = intersect_primitive(ray, primitive) {
                closest = Some(intersection);
            }
        }

        closest
    }
}
