use crate::{Interval, Vec3};

/// A ray with a valid parametric range and a bounce counter.
///
/// The direction is normalized on construction. `inv_direction` and `sign`
/// are cached for the slab test against bounding boxes.
///
/// `t_max` only ever shrinks: each accepted hit narrows it, which is how a
/// scan over many primitives ends up holding the nearest one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_min: f32,
    pub t_max: f32,
    /// Number of bounces that produced this ray (primary rays are 0).
    pub depth: u32,
    pub inv_direction: Vec3,
    /// Per axis: 1 if the direction component is negative, else 0.
    pub sign: [usize; 3],
}

impl Ray {
    /// Create a primary ray covering `[0, inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        let inv_direction = direction.recip();
        let sign = [
            (inv_direction.x < 0.0) as usize,
            (inv_direction.y < 0.0) as usize,
            (inv_direction.z < 0.0) as usize,
        ];
        Self {
            origin,
            direction,
            t_min: 0.0,
            t_max: f32::INFINITY,
            depth: 0,
            inv_direction,
            sign,
        }
    }

    /// Restrict the ray to `[t_min, t_max]`.
    pub fn with_interval(mut self, t_min: f32, t_max: f32) -> Self {
        self.t_min = t_min;
        self.t_max = t_max;
        self
    }

    /// Set the bounce counter.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// The current valid range `[t_min, t_max]`.
    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }

    /// Shrink `t_max` to an accepted hit distance.
    #[inline]
    pub fn narrow(&mut self, t: f32) {
        debug_assert!(t <= self.t_max, "t_max must never grow");
        self.t_max = t;
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
