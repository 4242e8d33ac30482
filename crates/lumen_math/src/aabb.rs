use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for the spatial index.
///
/// Stored as its min and max corners. A box may be flat or collapse to a
/// point (a single primitive on a plane, coincident centers), and may be
/// unbounded along some axes (infinite planes).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from its corners. Corners must satisfy min <= max.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "inverted box {min:?} {max:?}");
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// True for the empty box (the identity of `surrounding`).
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.axis_interval(axis).is_empty())
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.is_empty()
            || (0..3).all(|axis| self.axis_interval(axis).contains_interval(&other.axis_interval(axis)))
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Clip a parametric range against this box (slab test).
    ///
    /// Returns the part of `ray_t` during which the ray is inside the box,
    /// or `None` when the ray misses it. Uses the ray's cached sign and
    /// inverse direction; a `0 * inf` slab (origin on a face of a slab the
    /// ray is parallel to) yields NaN, which `f32::max`/`f32::min` ignore.
    pub fn clip(&self, ray: &Ray, ray_t: Interval) -> Option<Interval> {
        let bounds = [self.min, self.max];
        let mut t = ray_t;

        for axis in 0..3 {
            let sign = ray.sign[axis];
            let near = (bounds[sign][axis] - ray.origin[axis]) * ray.inv_direction[axis];
            let far = (bounds[1 - sign][axis] - ray.origin[axis]) * ray.inv_direction[axis];

            t.min = t.min.max(near);
            t.max = t.max.min(far);
            if t.min > t.max {
                return None;
            }
        }

        Some(t)
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };
}
