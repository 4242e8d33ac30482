//! Simple ray tracer example.
//!
//! Renders a few spheres, an ellipsoid and a triangle over a ground plane,
//! and saves the result as PNG.
//!
//! Usage: cargo run --release --example simple_render [output.png] [config.json]

use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::{Camera, Color, Ellipsoid, Light, Material, Plane, Scene, Sphere, Triangle};
use lumen_math::Vec3;
use lumen_renderer::{build_index, render, RenderConfig};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "output.png".to_string());
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {path}"))?
        }
        None => RenderConfig::default(),
    };

    let scene = build_scene()?;
    let index = build_index(&scene);
    let image = render(&scene, Some(&index), WIDTH, HEIGHT, &config)?;

    image::save_buffer(&output, &image.to_rgba(), WIDTH, HEIGHT, image::ColorType::Rgba8)
        .with_context(|| format!("Failed to save {output}"))?;
    log::info!("Saved to {}", output);

    Ok(())
}

fn build_scene() -> Result<Scene> {
    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 2.0, 7.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_fov(45.0);
    let mut scene = Scene::new(camera).with_sky_color(Color::new(0.5, 0.7, 1.0));

    let ground = Arc::new(Material::new("ground", Color::splat(0.5)).with_roughness(0.8));
    let red = Arc::new(Material::new("red", Color::new(0.8, 0.1, 0.1)).with_roughness(0.2));
    let gold = Arc::new(
        Material::new("gold", Color::new(0.6, 0.45, 0.1))
            .with_specular(Color::new(1.0, 0.85, 0.4))
            .with_roughness(0.15)
            .with_ior(2.5),
    );
    let glass = Arc::new(Material::new("glass", Color::splat(0.05)).with_roughness(0.05).with_ior(1.5));

    scene.add_primitive(Plane::through(Vec3::ZERO, Vec3::Y), ground)?;
    scene.add_primitive(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0), red)?;
    scene.add_primitive(Ellipsoid::new(Vec3::new(-2.3, 0.6, 0.5), Vec3::new(0.6, 0.6, 1.2)), gold.clone())?;
    scene.add_primitive(Sphere::new(Vec3::new(2.2, 0.7, 0.8), 0.7), glass)?;
    scene.add_primitive(
        Triangle::new(Vec3::new(-1.5, 0.0, -2.5), Vec3::new(1.5, 0.0, -2.5), Vec3::new(0.0, 2.5, -2.5)),
        gold,
    )?;

    // A ring of small spheres to give the index something to do
    let accents = Arc::new(Material::new("accent", Color::new(0.2, 0.3, 0.8)));
    for i in 0..24 {
        let angle = i as f32 / 24.0 * std::f32::consts::TAU;
        let center = Vec3::new(3.5 * angle.cos(), 0.2, 3.5 * angle.sin() - 0.5);
        scene.add_primitive(Sphere::new(center, 0.2), accents.clone())?;
    }

    scene.add_light(Light::new(Vec3::new(4.0, 6.0, 5.0), Color::splat(1.6)));
    scene.add_light(Light::new(Vec3::new(-5.0, 4.0, 2.0), Color::new(0.5, 0.5, 0.7)));

    Ok(scene)
}
