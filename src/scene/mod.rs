pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a [`Node`] inside a [`Scene`].
    pub struct NodeHandle;
}

pub use node::Node;
pub use scene::{Scene, SceneResources};
pub use transform::Transform;
