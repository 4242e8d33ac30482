//! Geometric descriptions of the supported primitive shapes.
//!
//! These are plain values: the closed-form ray tests live in the renderer.
//! Each shape knows its tight bounding box and a representative point
//! (used by the spatial index to order primitives along an axis).

use lumen_math::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::SceneError;

/// Squared length below which a direction or a triangle area is unusable.
const DEGENERATE_EPSILON: f32 = 1e-12;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }
}

/// An infinite plane: the points `p` with `dot(normal, p) + dist == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    pub fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// The plane through `point` with the given normal.
    pub fn through(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            dist: -normal.dot(point),
        }
    }

    /// The point of the plane closest to the world origin.
    pub fn anchor(&self) -> Vec3 {
        -self.dist * self.normal / self.normal.length_squared()
    }

    /// Unbounded on every axis, except the one an axis-aligned normal fixes.
    pub fn bounding_box(&self) -> Aabb {
        let n = self.normal;
        let fixed_axis = match (n.x != 0.0, n.y != 0.0, n.z != 0.0) {
            (true, false, false) => Some(0),
            (false, true, false) => Some(1),
            (false, false, true) => Some(2),
            _ => None,
        };

        match fixed_axis {
            Some(axis) => {
                let coordinate = -self.dist / n[axis];
                let mut min = Vec3::NEG_INFINITY;
                let mut max = Vec3::INFINITY;
                min[axis] = coordinate;
                max[axis] = coordinate;
                Aabb::new(min, max)
            }
            None => Aabb::UNIVERSE,
        }
    }
}

/// A triangle given by its three vertices, counter-clockwise facing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal, `(v1 - v0) x (v2 - v0)`.
    pub fn face_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0)
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(
            self.v0.min(self.v1).min(self.v2),
            self.v0.max(self.v1).max(self.v2),
        )
    }
}

/// An axis-aligned ellipsoid: a unit sphere scaled by `radii` and moved to `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub center: Vec3,
    pub radii: Vec3,
}

impl Ellipsoid {
    pub fn new(center: Vec3, radii: Vec3) -> Self {
        Self { center, radii }
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.center - self.radii, self.center + self.radii)
    }
}

/// The shape of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Ellipsoid(Ellipsoid),
}

impl Geometry {
    /// Short name of the shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Sphere(_) => "sphere",
            Geometry::Plane(_) => "plane",
            Geometry::Triangle(_) => "triangle",
            Geometry::Ellipsoid(_) => "ellipsoid",
        }
    }

    /// Tight bounds of the shape.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Geometry::Sphere(s) => s.bounding_box(),
            Geometry::Plane(p) => p.bounding_box(),
            Geometry::Triangle(t) => t.bounding_box(),
            Geometry::Ellipsoid(e) => e.bounding_box(),
        }
    }

    /// Representative point used to order primitives along a split axis.
    pub fn centroid(&self) -> Vec3 {
        match self {
            Geometry::Sphere(s) => s.center,
            Geometry::Plane(p) => p.anchor(),
            Geometry::Triangle(t) => t.centroid(),
            Geometry::Ellipsoid(e) => e.center,
        }
    }

    /// Check the shape can be intersected, normalizing plane equations.
    pub fn validated(self) -> Result<Geometry, SceneError> {
        let degenerate = |reason: &str| SceneError::DegenerateGeometry {
            kind: self.kind(),
            reason: reason.to_string(),
        };

        match self {
            Geometry::Sphere(s) => {
                if !s.center.is_finite() {
                    return Err(degenerate("center is not finite"));
                }
                if !(s.radius > 0.0 && s.radius.is_finite()) {
                    return Err(degenerate("radius must be positive and finite"));
                }
                Ok(self)
            }
            Geometry::Plane(p) => {
                let length_squared = p.normal.length_squared();
                if !p.normal.is_finite() || !p.dist.is_finite() {
                    return Err(degenerate("plane equation is not finite"));
                }
                if length_squared < DEGENERATE_EPSILON {
                    return Err(degenerate("normal has zero length"));
                }
                let length = length_squared.sqrt();
                Ok(Geometry::Plane(Plane::new(p.normal / length, p.dist / length)))
            }
            Geometry::Triangle(t) => {
                if !t.vertices().iter().all(|v| v.is_finite()) {
                    return Err(degenerate("vertex is not finite"));
                }
                if t.face_normal().length_squared() < DEGENERATE_EPSILON {
                    return Err(degenerate("vertices are collinear"));
                }
                Ok(self)
            }
            Geometry::Ellipsoid(e) => {
                if !e.center.is_finite() {
                    return Err(degenerate("center is not finite"));
                }
                if !(e.radii.cmpgt(Vec3::ZERO).all() && e.radii.is_finite()) {
                    return Err(degenerate("radii must be positive and finite"));
                }
                Ok(self)
            }
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(sphere: Sphere) -> Self {
        Geometry::Sphere(sphere)
    }
}

impl From<Plane> for Geometry {
    fn from(plane: Plane) -> Self {
        Geometry::Plane(plane)
    }
}

impl From<Triangle> for Geometry {
    fn from(triangle: Triangle) -> Self {
        Geometry::Triangle(triangle)
    }
}

impl From<Ellipsoid> for Geometry {
    fn from(ellipsoid: Ellipsoid) -> Self {
        Geometry::Ellipsoid(ellipsoid)
    }
}
