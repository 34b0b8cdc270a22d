//! Scene engine contract: hierarchical transformable nodes, a perspective
//! camera and the render boundary.
//!
//! The overlay pipeline writes transforms into a node arena every frame; the
//! external render engine consumes the arena plus camera through a single
//! [`Renderer::render`] call. Nothing in here draws.

use nalgebra::Vector3;
use std::collections::HashMap;

/// Arena handle for a scene node
pub type NodeId = usize;

/// Position, Euler rotation (radians) and per-axis scale of a node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Morph/blendshape channels exposed by a mesh node
#[derive(Debug, Clone, Default)]
pub struct MorphChannels {
    index_by_name: HashMap<String, usize>,
    influences: Vec<f32>,
}

impl MorphChannels {
    /// Build a channel dictionary from ordered channel names
    #[must_use]
    pub fn new(names: &[String]) -> Self {
        let index_by_name = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            index_by_name,
            influences: vec![0.0; names.len()],
        }
    }

    /// Set the influence for a named channel; returns false if the channel
    /// does not exist (callers treat that as a no-op)
    pub fn set_influence(&mut self, name: &str, score: f32) -> bool {
        match self.index_by_name.get(name) {
            Some(&index) => {
                self.influences[index] = score;
                true
            }
            None => false,
        }
    }

    /// Current influence of a named channel
    #[must_use]
    pub fn influence(&self, name: &str) -> Option<f32> {
        self.index_by_name.get(name).map(|&i| self.influences[i])
    }

    /// Number of channels
    #[must_use]
    pub fn len(&self) -> usize {
        self.influences.len()
    }

    /// Whether the node exposes no channels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }
}

/// One transformable node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub morph: Option<MorphChannels>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            transform: Transform::default(),
            visible: true,
            morph: None,
            parent,
            children: Vec::new(),
        }
    }

    /// Parent node, if any
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Flat arena holding the node hierarchy
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<SceneNode>>,
    free: Vec<NodeId>,
    roots: Vec<NodeId>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node under `parent` (or at the top level) and return its id
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let node = SceneNode::new(name.into(), parent);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        match parent {
            Some(parent_id) => {
                if let Some(Some(p)) = self.nodes.get_mut(parent_id) {
                    p.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    /// Set a node's visibility; missing ids are ignored
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }

    /// Top-level nodes
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Preorder traversal of a subtree, including `id` itself
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Remove a subtree and free its slots
    pub fn remove_subtree(&mut self, id: NodeId) {
        let ids = self.descendants(id);
        if ids.is_empty() {
            return;
        }

        if let Some(parent) = self.node(id).and_then(SceneNode::parent) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        } else {
            self.roots.retain(|&r| r != id);
        }

        for node_id in ids {
            self.nodes[node_id] = None;
            self.free.push(node_id);
        }
    }

    /// Number of live nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Perspective camera consumed by the external render engine
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub position: Vector3<f32>,
}

impl Camera {
    /// Camera at `(0, 0, distance)` looking down the negative z axis
    #[must_use]
    pub fn new(fov_degrees: f32, aspect: f32, distance: f32) -> Self {
        Self {
            fov_y: fov_degrees.to_radians(),
            aspect,
            position: Vector3::new(0.0, 0.0, distance),
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

/// External render engine boundary: one call per display refresh
pub trait Renderer {
    /// Propagate a container resize to the underlying surface
    fn resize(&mut self, width: u32, height: u32);

    /// Submit the scene for drawing
    fn render(&mut self, scene: &Scene, camera: &Camera);
}

/// Discards every frame; used for headless replay and tests
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames_rendered: u64,
}

impl NullRenderer {
    /// Number of frames submitted so far
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Renderer for NullRenderer {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, _scene: &Scene, _camera: &Camera) {
        self.frames_rendered += 1;
    }
}
