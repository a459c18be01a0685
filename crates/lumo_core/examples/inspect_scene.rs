//! Example: Build the reference scene and inspect it.
//!
//! Run with: cargo run --example inspect_scene

use lumo_core::{intersect_ray, reference_scene, DIFFUSE};
use lumo_math::{Ray, Vec3};

fn main() {
    env_logger::init();

    let scene = reference_scene();
    let nodes = scene.flatten_hierarchy();

    println!("=== Scene: {} ===", scene.name);
    println!("Nodes: {}", scene.node_count());
    println!("Geometry nodes: {}", nodes.len());

    let bounds = scene.world_bounds();
    println!("Bounds: {:?} .. {:?}", bounds.min(), bounds.max());

    println!("\n--- Traversal order ---");
    for (i, node) in nodes.iter().enumerate() {
        if let Some(data) = node.data() {
            let diffuse = data
                .material
                .property(DIFFUSE)
                .map(|c| format!("{:?}", c))
                .unwrap_or_else(|e| e.to_string());
            println!(
                "  [{}] {} ({}, material '{}', diffuse {})",
                i,
                node.name(),
                data.geometry.kind(),
                data.material.name,
                diffuse
            );
        }
    }

    println!("\n--- Probe rays ---");
    let probes = [
        Ray::new(Vec3::new(-150.0, 0.0, 0.0), Vec3::X),
        Ray::new(Vec3::new(0.0, 0.0, -75.0), Vec3::Z),
        Ray::new(Vec3::new(0.0, 100.0, -75.0), Vec3::Z),
    ];
    for ray in &probes {
        match intersect_ray(&nodes, ray) {
            Some(hit) => println!(
                "  {:?} -> '{}' at {:.3}, normal {:?}",
                ray.origin(),
                hit.material.name,
                hit.distance,
                hit.normal
            ),
            None => println!("  {:?} -> miss", ray.origin()),
        }
    }
}
