//! Whitted-style light transport.
//!
//! Direct lighting from point lights through shadow rays, plus one
//! Fresnel-weighted mirror bounce per hit, recursing until the ray depth
//! passes `max_depth`.

use lumen_core::{Color, Scene};
use lumen_math::{reflect, Ray, Vec3};

use crate::brdf::{fresnel, shade};
use crate::intersection::{Hittable, Intersection};
use crate::kdtree::{IndexedScene, KdTree};
use crate::renderer::RenderConfig;

/// Deepest bounce that is still traced. Primary rays have depth 0.
pub const MAX_DEPTH: u32 = 5;

/// Offset applied to secondary ray origins against self-intersection.
pub const ACNE_BIAS: f32 = 1e-4;

/// Radiance arriving along `ray` with the default settings.
///
/// With `index` the nearest-hit queries go through the tree, otherwise every
/// primitive is scanned.
pub fn trace(scene: &Scene, index: Option<&KdTree>, ray: Ray) -> Color {
    trace_with_config(scene, index, ray, &RenderConfig::default())
}

/// Radiance arriving along `ray`, using `config.max_depth` and `config.acne_bias`.
pub fn trace_with_config(scene: &Scene, index: Option<&KdTree>, ray: Ray, config: &RenderConfig) -> Color {
    match index {
        Some(tree) => radiance(&IndexedScene::new(scene, tree), scene, ray, config),
        None => radiance(scene, scene, ray, config),
    }
}

/// Recursive radiance estimate; `world` answers the nearest-hit queries.
///
/// Issues at most one nearest-hit query per depth level for the ray chain,
/// plus one shadow query per light at each hit.
pub fn radiance(world: &dyn Hittable, scene: &Scene, mut ray: Ray, config: &RenderConfig) -> Color {
    if ray.depth > config.max_depth {
        return Color::ZERO;
    }

    let Some(hit) = world.hit(&mut ray) else {
        return scene.sky_color();
    };

    let view = -ray.direction;
    let direct = direct_lighting(world, scene, &hit, view, config.acne_bias);

    let reflected = Ray::new(hit.position + hit.normal * config.acne_bias, reflect(ray.direction, hit.normal))
        .with_depth(ray.depth + 1);

    // Fresnel at the half-vector between view and mirror direction
    let half = (view + reflected.direction).try_normalize().unwrap_or(hit.normal);
    let weight = fresnel(reflected.direction.dot(half), 1.0, hit.material.ior);

    direct + weight * radiance(world, scene, reflected, config)
}

/// Sum of unoccluded light contributions at `hit`.
pub(crate) fn direct_lighting(
    world: &dyn Hittable,
    scene: &Scene,
    hit: &Intersection<'_>,
    view: Vec3,
    bias: f32,
) -> Color {
    scene.lights().iter().fold(Color::ZERO, |acc, light| {
        let to_light = light.position - hit.position;
        let distance = to_light.length();
        if distance <= bias {
            return acc;
        }

        let l = to_light / distance;
        if hit.normal.dot(l) <= 0.0 {
            return acc;
        }

        let mut shadow = Ray::new(hit.position + hit.normal * bias, l).with_interval(bias, distance);
        if world.hit(&mut shadow).is_some() {
            return acc;
        }

        acc + shade(hit.normal, view, l, light.color, hit.material)
    })
}
