//! Lumo Core - scene graph and geometry for the Lumo ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: the `Geometry` intersection trait with `Sphere` and `Triangle`
//! - **Materials**: named property bags looked up at shading time
//! - **Scene graph**: `Scene` and `SceneNode`, flattened per frame for tracing
//!
//! # Example
//!
//! ```ignore
//! use lumo_core::{intersect_ray, reference_scene};
//!
//! let scene = reference_scene();
//! let nodes = scene.flatten_hierarchy();
//! if let Some(hit) = intersect_ray(&nodes, &ray) {
//!     println!("hit at distance {}", hit.distance);
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod sphere;
pub mod triangle;

// Re-export commonly used types
pub use error::SceneError;
pub use geometry::{Geometry, GeometryKind, IntersectInfo, SurfaceHit};
pub use material::{Material, DIFFUSE};
pub use scene::{intersect_ray, reference_scene, NodeData, Scene, SceneNode, SharedScene};
pub use sphere::Sphere;
pub use triangle::Triangle;
