//! Recursive median-split construction.

use std::cmp::Ordering;

use lumen_core::Scene;
use lumen_math::{Aabb, Vec3};

use super::KdNode;

/// Per-primitive data gathered once before recursing.
struct BuildContext {
    centroids: Vec<Vec3>,
    bounds: Vec<Aabb>,
    depth_limit: u32,
}

impl BuildContext {
    fn bounds_of(&self, indices: &[usize]) -> Aabb {
        indices
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &self.bounds[i]))
    }

    /// Order by centroid along `axis`, then by index.
    fn compare(&self, axis: usize, a: usize, b: usize) -> Ordering {
        self.centroids[a][axis]
            .total_cmp(&self.centroids[b][axis])
            .then(a.cmp(&b))
    }

    fn leaf(&self, indices: Vec<usize>, depth: u32) -> KdNode {
        KdNode::Leaf {
            bounds: self.bounds_of(&indices),
            primitives: indices,
            depth,
        }
    }

    /// Median split along `axis`, or the next axes in turn when every
    /// centroid sits at or above the median on it. Returns the axis used,
    /// the split value and the partition point.
    fn choose_split(&self, indices: &mut [usize], axis: usize) -> Option<(usize, f32, usize)> {
        (0..3).map(|offset| (axis + offset) % 3).find_map(|candidate| {
            indices.sort_unstable_by(|&a, &b| self.compare(candidate, a, b));
            let split = self.centroids[indices[indices.len() / 2]][candidate];

            // Sorted, so the strict-less prefix is the left child
            let mid = indices.partition_point(|&i| self.centroids[i][candidate] < split);
            (mid > 0).then_some((candidate, split, mid))
        })
    }

    fn build(&self, mut indices: Vec<usize>, axis: usize, depth: u32) -> KdNode {
        if depth >= self.depth_limit || indices.len() <= 1 {
            return self.leaf(indices, depth);
        }

        // All centroids coincide
        let Some((axis, split, mid)) = self.choose_split(&mut indices, axis) else {
            return self.leaf(indices, depth);
        };

        let right_indices = indices.split_off(mid);
        let next_axis = (axis + 1) % 3;
        let left = self.build(indices, next_axis, depth + 1);
        let right = self.build(right_indices, next_axis, depth + 1);

        KdNode::Interior {
            axis,
            split,
            depth,
            bounds: Aabb::surrounding(left.bounds(), right.bounds()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Build the tree for every primitive of `scene`, root splitting on x.
pub(super) fn build_tree(scene: &Scene, depth_limit: u32) -> KdNode {
    let primitives = scene.primitives();
    let context = BuildContext {
        centroids: primitives.iter().map(|p| p.centroid()).collect(),
        bounds: primitives.iter().map(|p| p.bounding_box()).collect(),
        depth_limit,
    };

    log::debug!(
        "Building KdTree over {} primitives, depth limit {}",
        primitives.len(),
        depth_limit
    );

    context.build((0..primitives.len()).collect(), 0, 0)
}
