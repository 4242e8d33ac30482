//! Spatial index over scene primitives.
//!
//! A binary space-partitioning tree built once from a finalized `Scene` and
//! shared read-only by every render thread. Interior nodes split on a
//! round-robin axis at the median primitive centroid; every node keeps the
//! tight bounds of the primitives beneath it, so children may overlap.
//!
//! The tree stores primitive indices, not primitives. Queries take the same
//! `Scene` the tree was built from.

mod build;
mod traverse;

use lumen_core::Scene;
use lumen_math::{Aabb, Ray};

use crate::intersection::{Hittable, Intersection};

/// A tree node. Interior nodes own exactly two children.
#[derive(Debug)]
pub enum KdNode {
    Interior {
        /// Split axis (0 = x, 1 = y, 2 = z)
        axis: usize,
        /// Primitives with a centroid below this go left
        split: f32,
        depth: u32,
        bounds: Aabb,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
    Leaf {
        /// Indices into `Scene::primitives`
        primitives: Vec<usize>,
        depth: u32,
        bounds: Aabb,
    },
}

impl KdNode {
    pub fn bounds(&self) -> &Aabb {
        match self {
            KdNode::Interior { bounds, .. } | KdNode::Leaf { bounds, .. } => bounds,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            KdNode::Interior { depth, .. } | KdNode::Leaf { depth, .. } => *depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, KdNode::Leaf { .. })
    }

    /// `(left, right)` for interior nodes.
    pub fn children(&self) -> Option<(&KdNode, &KdNode)> {
        match self {
            KdNode::Interior { left, right, .. } => Some((left, right)),
            KdNode::Leaf { .. } => None,
        }
    }
}

/// Spatial index built from a `Scene`.
#[derive(Debug)]
pub struct KdTree {
    root: KdNode,
    depth_limit: u32,
    primitive_count: usize,
}

/// Depth limit for `n` primitives: `ceil(log2(n))`, 0 for `n <= 1`.
///
/// Median splits halve a node, so at this depth leaves hold about one
/// primitive each.
pub fn default_depth_limit(n: usize) -> u32 {
    n.next_power_of_two().trailing_zeros()
}

/// Build the index for `scene` with the default depth limit.
pub fn build_index(scene: &Scene) -> KdTree {
    KdTree::build(scene)
}

impl KdTree {
    /// Build with depth limit `ceil(log2(N))`.
    pub fn build(scene: &Scene) -> Self {
        Self::with_depth_limit(scene, default_depth_limit(scene.len()))
    }

    /// Build with an explicit depth limit. A limit of 0 gives a single leaf.
    pub fn with_depth_limit(scene: &Scene, depth_limit: u32) -> Self {
        let start = std::time::Instant::now();
        let root = build::build_tree(scene, depth_limit);

        let tree = Self {
            root,
            depth_limit,
            primitive_count: scene.len(),
        };

        log::info!(
            "KdTree: {} primitives, {} nodes, {} leaves, depth {}/{} in {:.2?}",
            tree.primitive_count,
            tree.node_count(),
            tree.leaf_count(),
            tree.max_depth(),
            tree.depth_limit,
            start.elapsed()
        );

        tree
    }

    pub fn root(&self) -> &KdNode {
        &self.root
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    /// Number of primitives in the scene the tree was built from.
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    pub fn bounds(&self) -> &Aabb {
        self.root.bounds()
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &KdNode) -> usize {
            match node.children() {
                Some((left, right)) => 1 + count(left) + count(right),
                None => 1,
            }
        }
        count(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        self.visit_leaves(|_, _, _| leaves += 1);
        leaves
    }

    /// Deepest leaf depth (root = 0).
    pub fn max_depth(&self) -> u32 {
        let mut deepest = 0;
        self.visit_leaves(|_, _, depth| deepest = deepest.max(depth));
        deepest
    }

    /// Call `f(indices, bounds, depth)` for every leaf, left to right.
    pub fn visit_leaves<F>(&self, mut f: F)
    where
        F: FnMut(&[usize], &Aabb, u32),
    {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                KdNode::Leaf {
                    primitives,
                    depth,
                    bounds,
                } => f(primitives, bounds, *depth),
                KdNode::Interior { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}

/// A scene paired with its index, queried through the tree.
#[derive(Clone, Copy)]
pub struct IndexedScene<'s> {
    pub scene: &'s Scene,
    pub tree: &'s KdTree,
}

impl<'s> IndexedScene<'s> {
    pub fn new(scene: &'s Scene, tree: &'s KdTree) -> Self {
        debug_assert_eq!(
            scene.len(),
            tree.primitive_count(),
            "tree was built from a different scene"
        );
        Self { scene, tree }
    }
}

impl Hittable for IndexedScene<'_> {
    fn hit<'a>(&'a self, ray: &mut Ray) -> Option<Intersection<'a>> {
        self.tree.nearest_hit(self.scene, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Camera, Color, Ellipsoid, Geometry, Material, Plane, Sphere, Triangle};
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    fn random_geometry(rng: &mut StdRng) -> Geometry {
        let center = random_point(rng, 10.0);
        match rng.gen_range(0..4) {
            0 => Sphere::new(center, rng.gen_range(0.1..1.5)).into(),
            1 => Ellipsoid::new(
                center,
                Vec3::new(
                    rng.gen_range(0.2..1.5),
                    rng.gen_range(0.2..1.5),
                    rng.gen_range(0.2..1.5),
                ),
            )
            .into(),
            2 => Triangle::new(
                center,
                center + random_point(rng, 1.5),
                center + random_point(rng, 1.5),
            )
            .into(),
            // Occasional far-away planes, some axis-aligned
            _ => {
                let normal = if rng.gen_bool(0.5) {
                    Vec3::Y
                } else {
                    random_point(rng, 1.0)
                };
                Plane::through(center * 3.0, normal).into()
            }
        }
    }

    fn random_scene(seed: u64, count: usize) -> Scene {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Scene::new(Camera::default());
        let mut added = 0;
        while added < count {
            let material = Arc::new(Material::new(format!("m{added}"), Color::splat(0.5)));
            // Rejected (degenerate) shapes are simply skipped
            if scene.add_primitive(random_geometry(&mut rng), material).is_ok() {
                added += 1;
            }
        }
        scene
    }

    fn spheres_scene(centers: &[Vec3]) -> Scene {
        let mut scene = Scene::new(Camera::default());
        for (i, &center) in centers.iter().enumerate() {
            let material = Arc::new(Material::new(format!("s{i}"), Color::ONE));
            scene.add_primitive(Sphere::new(center, 0.5), material).unwrap();
        }
        scene
    }

    #[test]
    fn test_default_depth_limit_is_binary_log() {
        assert_eq!(default_depth_limit(0), 0);
        assert_eq!(default_depth_limit(1), 0);
        assert_eq!(default_depth_limit(2), 1);
        assert_eq!(default_depth_limit(3), 2);
        assert_eq!(default_depth_limit(4), 2);
        assert_eq!(default_depth_limit(5), 3);
        assert_eq!(default_depth_limit(1000), 10);
        assert_eq!(default_depth_limit(1024), 10);
    }

    #[test]
    fn test_empty_scene_is_single_leaf() {
        let scene = Scene::new(Camera::default());
        let tree = KdTree::build(&scene);

        assert!(tree.root().is_leaf());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);

        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(tree.nearest_hit(&scene, &mut ray).is_none());
        assert_eq!(ray.t_max, f32::INFINITY);
    }

    #[test]
    fn test_single_primitive_is_leaf() {
        let scene = spheres_scene(&[Vec3::new(0.0, 0.0, 5.0)]);
        let tree = KdTree::build(&scene);
        assert!(tree.root().is_leaf());

        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = tree.nearest_hit(&scene, &mut ray).unwrap();
        assert!((hit.t - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_tree_recurses_into_both_children() {
        let centers: Vec<Vec3> = (0..16).map(|i| Vec3::new(i as f32 * 2.0, 0.0, 0.0)).collect();
        let scene = spheres_scene(&centers);
        let tree = KdTree::build(&scene);

        assert_eq!(tree.depth_limit(), 4);
        let (left, right) = tree.root().children().unwrap();
        assert!(!left.is_leaf());
        assert!(!right.is_leaf());
        assert!(tree.max_depth() > 1);
    }

    #[test]
    fn test_leaves_partition_all_indices() {
        for seed in 0..8 {
            let scene = random_scene(seed, 57);
            for limit in [0, 1, 3, default_depth_limit(scene.len()), 12] {
                let tree = KdTree::with_depth_limit(&scene, limit);

                let mut seen = Vec::new();
                tree.visit_leaves(|indices, _, depth| {
                    assert!(depth <= limit);
                    seen.extend_from_slice(indices);
                });

                // Every index appears exactly once
                let unique: BTreeSet<usize> = seen.iter().copied().collect();
                assert_eq!(seen.len(), scene.len());
                assert_eq!(unique, (0..scene.len()).collect());
            }
        }
    }

    #[test]
    fn test_child_bounds_inside_parent() {
        fn check(node: &KdNode, scene: &Scene) {
            match node {
                KdNode::Leaf { primitives, bounds, .. } => {
                    for &i in primitives {
                        assert!(bounds.contains(&scene.primitives()[i].bounding_box()));
                    }
                }
                KdNode::Interior { bounds, left, right, depth, .. } => {
                    for child in [left, right] {
                        assert!(bounds.contains(child.bounds()));
                        assert_eq!(child.depth(), depth + 1);
                        check(child, scene);
                    }
                }
            }
        }

        for seed in 0..4 {
            let scene = random_scene(100 + seed, 40);
            let tree = KdTree::build(&scene);
            assert_eq!(tree.root().depth(), 0);
            check(tree.root(), &scene);
        }
    }

    #[test]
    fn test_identical_centroids_terminate() {
        // Every split would leave the left side empty
        let centers = vec![Vec3::new(1.0, 2.0, 3.0); 32];
        let scene = spheres_scene(&centers);
        let tree = KdTree::build(&scene);

        assert!(tree.root().is_leaf());
        assert_eq!(tree.leaf_count(), 1);

        let mut ray = Ray::new(Vec3::new(1.0, 2.0, -10.0), Vec3::Z);
        let hit = tree.nearest_hit(&scene, &mut ray).unwrap();
        assert!((hit.t - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let scene = random_scene(7, 64);
        let a = KdTree::build(&scene);
        let b = KdTree::build(&scene);

        let mut leaves_a = Vec::new();
        let mut leaves_b = Vec::new();
        a.visit_leaves(|indices, _, _| leaves_a.push(indices.to_vec()));
        b.visit_leaves(|indices, _, _| leaves_b.push(indices.to_vec()));
        assert_eq!(leaves_a, leaves_b);
    }

    #[test]
    fn test_indexed_matches_brute_force() {
        for seed in 0..6 {
            let scene = random_scene(seed, 80);
            let mut rng = StdRng::seed_from_u64(1000 + seed);

            for limit in [0, 2, default_depth_limit(scene.len()), 20] {
                let tree = KdTree::with_depth_limit(&scene, limit);
                let indexed = IndexedScene::new(&scene, &tree);

                for _ in 0..200 {
                    let origin = random_point(&mut rng, 15.0);
                    let direction = random_point(&mut rng, 1.0);
                    if direction.length_squared() < 1e-4 {
                        continue;
                    }
                    let ray = Ray::new(origin, direction);

                    let mut brute_ray = ray;
                    let mut indexed_ray = ray;
                    let brute = scene.hit(&mut brute_ray);
                    let found = indexed.hit(&mut indexed_ray);

                    match (brute, found) {
                        (None, None) => {}
                        (Some(a), Some(b)) => {
                            assert!((a.t - b.t).abs() <= 1e-4 * a.t.max(1.0));
                            assert!((a.position - b.position).length() < 1e-3);
                            if (a.t - b.t).abs() < 1e-6 {
                                assert!((a.normal - b.normal).length() < 1e-3);
                            }
                            assert!((brute_ray.t_max - indexed_ray.t_max).abs() <= 1e-4 * a.t.max(1.0));
                        }
                        (a, b) => panic!(
                            "seed {seed} limit {limit}: brute force {:?} vs indexed {:?}",
                            a.map(|h| h.t),
                            b.map(|h| h.t)
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn test_nearest_of_overlapping_children() {
        // A large sphere straddling the split and a small one in front of it
        let mut scene = Scene::new(Camera::default());
        let big = Arc::new(Material::new("big", Color::ONE));
        let small = Arc::new(Material::new("small", Color::ONE));
        scene.add_primitive(Sphere::new(Vec3::new(-1.0, 0.0, 10.0), 4.0), big).unwrap();
        scene.add_primitive(Sphere::new(Vec3::new(1.0, 0.0, 3.0), 0.5), small.clone()).unwrap();
        scene.add_primitive(Sphere::new(Vec3::new(6.0, 0.0, 10.0), 0.5), small).unwrap();

        let tree = KdTree::with_depth_limit(&scene, 4);
        let mut ray = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z);
        let hit = tree.nearest_hit(&scene, &mut ray).unwrap();
        assert_eq!(hit.material.name, "small");
        assert!((hit.t - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_flat_triangle_grid_recurses_to_limit() {
        let mut scene = Scene::new(Camera::default());
        let floor = Arc::new(Material::new("floor", Color::splat(0.5)));
        for i in 0..32 {
            for j in 0..32 {
                let corner = Vec3::new(i as f32, 0.0, j as f32);
                let triangle = Triangle::new(corner, corner + Vec3::X, corner + Vec3::Z);
                scene.add_primitive(triangle, floor.clone()).unwrap();
            }
        }

        let tree = KdTree::build(&scene);
        assert_eq!(tree.depth_limit(), 10);
        assert_eq!(tree.max_depth(), 10);

        let mut biggest_leaf = 0;
        tree.visit_leaves(|indices, _, _| biggest_leaf = biggest_leaf.max(indices.len()));
        assert!(biggest_leaf <= 2, "biggest leaf holds {biggest_leaf}");

        let mut ray = Ray::new(Vec3::new(10.2, 5.0, 20.2), Vec3::NEG_Y);
        let hit = tree.nearest_hit(&scene, &mut ray).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
    }
}
