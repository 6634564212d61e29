use serde_json::{Map, Value};

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// A scene node.
///
/// # Pose
///
/// - `transform` is the live pose, written by playback every frame
/// - `rest` is the pose the node had when it was imported; export always
///   serializes this one
///
/// # Pass-through data
///
/// Everything a bundle stores on a node besides its name, hierarchy and TRS
/// (mesh, skin, camera, extensions, extras) lives untouched in `properties`.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Pose ===
    pub transform: Transform,
    pub rest: Transform,

    /// Live morph target weights.
    pub weights: Vec<f32>,

    pub properties: Map<String, Value>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            rest: Transform::IDENTITY,
            weights: Vec::new(),
            properties: Map::new(),
        }
    }

    /// Creates a node whose live and rest pose are both `rest`.
    #[must_use]
    pub fn with_rest(name: impl Into<String>, rest: Transform) -> Self {
        let mut node = Self::new(name);
        node.transform = rest;
        node.rest = rest;
        node
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}
