//! Simple render example.
//!
//! Renders the reference scene with every tracer variant, checks that the
//! images agree and saves the last one as PNG.
//!
//! Run with: cargo run --example simple_render

use std::sync::Arc;
use std::time::Instant;

use lumo_core::reference_scene;
use lumo_renderer::{
    Camera, HostDriver, Rect, Sampler, Texture, TilingConfig, TracerBuilder, TracerKind, Vec3,
};

fn main() {
    env_logger::init();

    println!("Lumo Renderer - Simple Example");
    println!("==============================");

    let (width, height) = (320, 200);

    let start = Instant::now();
    let scene = reference_scene().into_shared();
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new();
    camera
        .set_orientation(Vec3::new(0.0, 0.0, -75.0), Vec3::ZERO)
        .expect("valid orientation");
    camera
        .set_viewport(Rect::from_size(width, height))
        .expect("valid viewport");

    let sampler = Arc::new(Sampler::jittered(25, 0).expect("valid sample count"));
    let driver = Arc::new(HostDriver::default());

    let mut images = Vec::new();
    for kind in [
        TracerKind::Software,
        TracerKind::Hardware,
        TracerKind::MultiHardware,
    ] {
        let target = Texture::rgba8(width, height)
            .expect("valid texture")
            .into_shared();

        let mut tracer = TracerBuilder::new(kind)
            .with_scene(scene.clone())
            .with_sampler(sampler.clone())
            .with_driver(driver.clone())
            .with_tiling(TilingConfig {
                tile_size: 32,
                contexts: 4,
            })
            .with_target(target.clone())
            .build()
            .expect("Failed to create tracer");

        println!("Rendering {}x{} @ {} spp with {}...", width, height, sampler.len(), kind);
        let report = tracer.render(&camera).expect("Render failed");
        println!(
            "  {} tiles, complete: {}, took {:?}",
            report.tiles.len(),
            report.is_complete(),
            report.elapsed
        );

        let pixels = target.lock().pixels().to_vec();
        images.push((kind, target, pixels));
    }

    let (_, _, reference) = &images[0];
    for (kind, _, pixels) in &images[1..] {
        let matches = pixels == reference;
        println!("{} matches software: {}", kind, matches);
    }

    let filename = "output.png";
    let (_, target, _) = &images[images.len() - 1];
    target
        .lock()
        .to_image()
        .save(filename)
        .expect("Failed to save image");
    println!("Saved to {}", filename);
}
