use serde_json::{Map, Value};
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::transform::Transform;

/// Bundle data the core does not interpret: every top-level document member
/// other than nodes, scenes and animations, plus the decoded buffer contents.
///
/// Exported unchanged, except that buffers are consolidated into one.
#[derive(Debug, Clone, Default)]
pub struct SceneResources {
    pub document: Map<String, Value>,
    pub buffers: Vec<Vec<u8>>,
}

/// Scene graph of one imported bundle.
///
/// All imported content hangs below a single wrapper node, the *animated root*.
/// Nodes keep their import order; the root is always ordered last so imported
/// node indices (referenced by skins and extensions) stay valid on export.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    order: Vec<NodeHandle>,
    root: NodeHandle,

    pub resources: SceneResources,
}

impl Scene {
    /// Creates a scene containing only the animated root.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(root_name));
        Self {
            nodes,
            order: Vec::new(),
            root,
            resources: SceneResources::default(),
        }
    }

    /// The animated root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.order.push(handle);
        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Makes `child` a child of `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return;
        }
        if let Some(old) = self.nodes[child].parent.take() {
            if let Some(old_parent) = self.nodes.get_mut(old) {
                old_parent.children.retain(|&c| c != child);
            }
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Number of nodes, root included.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node handles in export order (imported nodes first, root last).
    pub fn export_order(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.order.iter().copied().chain(std::iter::once(self.root))
    }

    /// Depth-first search from the animated root; the first match wins.
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![self.root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            // Reverse so the first child is visited first.
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Puts every node back into its rest pose.
    ///
    /// The animated root goes to identity; imported nodes return to the
    /// transform they were imported with.
    pub fn reset_to_rest_pose(&mut self) {
        for (handle, node) in &mut self.nodes {
            if handle == self.root {
                node.rest = Transform::IDENTITY;
            }
            node.transform = node.rest;
            node.weights.clear();
        }
    }

    /// A copy of the scene in its rest pose. The live scene is left as is.
    #[must_use]
    pub fn rest_pose_snapshot(&self) -> Scene {
        let mut snapshot = self.clone();
        snapshot.reset_to_rest_pose();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn root_is_ordered_last() {
        let mut scene = Scene::new("root");
        let a = scene.create_node_with_name("a");
        let b = scene.create_node_with_name("b");
        let order: Vec<_> = scene.export_order().collect();
        assert_eq!(order, vec![a, b, scene.root()]);
    }

    #[test]
    fn find_by_name_is_depth_first_from_root() {
        let mut scene = Scene::new("root");
        let a = scene.create_node_with_name("a");
        let dup_deep = scene.create_node_with_name("x");
        let dup_shallow = scene.create_node_with_name("x");
        let orphan = scene.create_node_with_name("orphan");
        scene.attach(a, scene.root());
        scene.attach(dup_deep, a);
        scene.attach(dup_shallow, scene.root());

        assert_eq!(scene.find_node_by_name("x"), Some(dup_deep));
        assert_eq!(scene.find_node_by_name("root"), Some(scene.root()));
        assert_eq!(scene.find_node_by_name("orphan"), None);
        assert!(scene.get_node(orphan).is_some());
    }

    #[test]
    fn reattach_moves_child() {
        let mut scene = Scene::new("root");
        let a = scene.create_node_with_name("a");
        let b = scene.create_node_with_name("b");
        let c = scene.create_node_with_name("c");
        scene.attach(c, a);
        scene.attach(c, b);
        assert!(scene.get_node(a).unwrap().children().is_empty());
        assert_eq!(scene.get_node(b).unwrap().children(), &[c]);
        assert_eq!(scene.get_node(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn snapshot_leaves_live_pose_alone() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        scene.get_node_mut(root).unwrap().transform.position = Vec3::new(1.0, 2.0, 3.0);

        let snapshot = scene.rest_pose_snapshot();
        assert!(snapshot.get_node(root).unwrap().transform.is_identity());
        assert_eq!(
            scene.get_node(root).unwrap().transform.position,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }
}
