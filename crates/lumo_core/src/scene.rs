//! Scene graph types for Lumo.
//!
//! A scene is a tree of named nodes. Each node may carry one piece of
//! geometry with its material. Tracers flatten the tree into a list of
//! geometry-bearing nodes once per frame and scan it linearly.

use std::sync::Arc;

use log::debug;
use lumo_math::{Aabb, Ray, Vec3, Vec4};
use parking_lot::RwLock;

use crate::error::{SceneError, SceneResult};
use crate::geometry::{Geometry, IntersectInfo};
use crate::{Material, Sphere, Triangle};

/// A scene shared between the application and the tracers.
///
/// Tracers hold the read lock for a whole frame, so edits made through the
/// write lock are applied between frames only.
pub type SharedScene = Arc<RwLock<Scene>>;

/// Geometry and material attached to a scene node.
#[derive(Debug)]
pub struct NodeData {
    pub geometry: Box<dyn Geometry>,
    pub material: Material,
}

impl NodeData {
    /// Attach a geometry and material.
    pub fn new(geometry: impl Geometry + 'static, material: Material) -> Self {
        Self {
            geometry: Box::new(geometry),
            material,
        }
    }
}

/// A node in the scene tree. Parents own their children.
#[derive(Debug, Default)]
pub struct SceneNode {
    name: String,
    data: Option<NodeData>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
            children: Vec::new(),
        }
    }

    /// Builder: attach geometry and material.
    pub fn with_data(mut self, geometry: impl Geometry + 'static, material: Material) -> Self {
        self.data = Some(NodeData::new(geometry, material));
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child and return a handle to it.
    pub fn add_child(&mut self, child: SceneNode) -> &mut SceneNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attached geometry and material, if any.
    pub fn data(&self) -> Option<&NodeData> {
        self.data.as_ref()
    }

    /// Replace (or clear) the attached data.
    pub fn set_data(&mut self, data: Option<NodeData>) {
        self.data = data;
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Depth-first search for a node by name (first match wins).
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Mutable variant of [`SceneNode::find`].
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    fn collect_geometry<'a>(&'a self, out: &mut Vec<&'a SceneNode>) {
        if self.data.is_some() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_geometry(out);
        }
    }
}

/// A complete scene: the node tree plus frame-wide settings.
#[derive(Debug)]
pub struct Scene {
    /// Scene name (for logs)
    pub name: String,

    root: SceneNode,
    background: Vec4,
    generation: u64,
}

impl Scene {
    /// Create an empty scene with an opaque black background.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: SceneNode::new("root"),
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            generation: 0,
        }
    }

    /// Wrap the scene for sharing with tracers.
    pub fn into_shared(self) -> SharedScene {
        Arc::new(RwLock::new(self))
    }

    /// Root node.
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Mutable root node. Counts as an edit.
    pub fn root_mut(&mut self) -> &mut SceneNode {
        self.generation += 1;
        &mut self.root
    }

    /// Find a node for editing. Counts as an edit when the node exists.
    pub fn node_mut(&mut self, name: &str) -> SceneResult<&mut SceneNode> {
        match self.root.find_mut(name) {
            Some(node) => {
                self.generation += 1;
                Ok(node)
            }
            None => Err(SceneError::NodeNotFound(name.to_string())),
        }
    }

    /// Color returned for rays that hit nothing.
    pub fn background(&self) -> Vec4 {
        self.background
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Vec4) {
        self.generation += 1;
        self.background = color;
    }

    /// Edit counter, bumped by every mutating accessor.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Collect every geometry-bearing node in depth-first pre-order.
    ///
    /// Built fresh on each call since the scene may change between frames.
    pub fn flatten_hierarchy(&self) -> Vec<&SceneNode> {
        let mut nodes = Vec::new();
        self.root.collect_geometry(&mut nodes);
        nodes
    }

    /// Total node count, including the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Bounding box of all geometry in the scene.
    pub fn world_bounds(&self) -> Aabb {
        self.flatten_hierarchy()
            .iter()
            .filter_map(|node| node.data())
            .fold(Aabb::EMPTY, |acc, data| {
                Aabb::surrounding(&acc, &data.geometry.bounds())
            })
    }
}

/// Find the nearest hit among flattened nodes.
///
/// Nodes without data are skipped. On equal distances the node that comes
/// first in `nodes` wins.
pub fn intersect_ray<'a>(nodes: &[&'a SceneNode], ray: &Ray) -> Option<IntersectInfo<'a>> {
    let mut nearest: Option<IntersectInfo<'a>> = None;

    for data in nodes.iter().copied().filter_map(SceneNode::data) {
        let Some(hit) = data.geometry.intersect(ray) else {
            continue;
        };

        let closer = match &nearest {
            Some(best) => hit.distance < best.distance,
            None => true,
        };
        if closer {
            nearest = Some(IntersectInfo {
                distance: hit.distance,
                normal: hit.normal,
                material: &data.material,
            });
        }
    }

    nearest
}

/// Build the built-in demo scene: two spheres and a small triangle.
pub fn reference_scene() -> Scene {
    let mut scene = Scene::new("reference");

    let root = scene.root_mut();
    root.add_child(SceneNode::new("sphereGeometry").with_data(
        Sphere::new(Vec3::new(-50.0, 0.0, 0.0), 25.0),
        Material::diffuse("orange", Vec4::new(1.0, 0.5, 0.25, 1.0)),
    ));
    root.add_child(SceneNode::new("sphereGeometry2").with_data(
        Sphere::new(Vec3::new(40.0, 0.0, 0.0), 40.0),
        Material::diffuse("blue", Vec4::new(0.0, 0.0, 1.0, 1.0)),
    ));
    root.add_child(SceneNode::new("triangleMesh").with_data(
        Triangle::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ),
        Material::diffuse("grey", Vec4::new(0.5, 0.5, 0.5, 1.0)),
    ));

    debug!(
        "Built reference scene: {} nodes, {} with geometry",
        scene.node_count(),
        scene.flatten_hierarchy().len()
    );

    scene
}
