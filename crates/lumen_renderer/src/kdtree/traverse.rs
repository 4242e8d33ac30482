//! Ordered stack traversal.

use lumen_core::Scene;
use lumen_math::{Interval, Ray};

use super::{KdNode, KdTree};
use crate::intersection::{intersect_primitive, Intersection};

#[cfg(test)]
thread_local! {
    /// Primitive tests run by `nearest_hit` on this thread.
    static PRIMITIVE_TESTS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

impl KdTree {
    /// Nearest hit of `ray` among the primitives of `scene`.
    ///
    /// Same result as scanning every primitive, but only nodes whose bounds
    /// the ray reaches within its current range are visited. The nearer
    /// child of each interior node is explored first; once a hit narrows
    /// `ray.t_max` below a pending node's entry distance that node is
    /// skipped. On a hit, `ray.t_max` is left at the hit distance.
    ///
    /// `scene` must be the scene the tree was built from.
    pub fn nearest_hit<'a>(&self, scene: &'a Scene, ray: &mut Ray) -> Option<Intersection<'a>> {
        let primitives = scene.primitives();
        debug_assert_eq!(primitives.len(), self.primitive_count);

        let root_t = self.root.bounds().clip(ray, ray.interval())?;

        let mut stack: Vec<(&KdNode, Interval)> = Vec::with_capacity(self.depth_limit as usize + 2);
        stack.push((&self.root, root_t));

        let mut closest = None;

        while let Some((node, node_t)) = stack.pop() {
            // A closer hit was found after this node was queued
            if node_t.min > ray.t_max {
                continue;
            }

            match node {
                KdNode::Leaf { primitives: members, .. } => {
                    for &index in members {
                        #[cfg(test)]
                        PRIMITIVE_TESTS.with(|count| count.set(count.get() + 1));

                        if let Some(hit) = intersect_primitive(ray, &primitives[index]) {
                            closest = Some(hit);
                        }
                    }
                }
                KdNode::Interior {
                    axis,
                    split,
                    left,
                    right,
                    ..
                } => {
                    // Signed distance from the origin to the split plane
                    let offset = split - ray.origin[*axis];
                    let left_first = offset > 0.0 || (offset == 0.0 && ray.direction[*axis] <= 0.0);
                    let (near, far) = if left_first {
                        (left.as_ref(), right.as_ref())
                    } else {
                        (right.as_ref(), left.as_ref())
                    };

                    // Far child goes on the stack first so the near one pops next
                    let current = ray.interval();
                    if let Some(far_t) = far.bounds().clip(ray, current) {
                        stack.push((far, far_t));
                    }
                    if let Some(near_t) = near.bounds().clip(ray, current) {
                        stack.push((near, near_t));
                    }
                }
            }
        }

        closest
    }
}
