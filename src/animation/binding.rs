use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::scene::NodeHandle;

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetPath {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
    Weights,     // Maps to Morph Target weights
}

impl TargetPath {
    /// Property segment used in track names (`node.position`, `node.quaternion`, ...).
    #[must_use]
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Translation => "position",
            Self::Rotation => "quaternion",
            Self::Scale => "scale",
            Self::Weights => "morphTargetInfluences",
        }
    }

    /// glTF `channel.target.path` value.
    #[must_use]
    pub fn gltf_path(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Weights => "weights",
        }
    }

    #[must_use]
    pub fn from_property_name(name: &str) -> Option<Self> {
        match name {
            "position" => Some(Self::Translation),
            "quaternion" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "morphTargetInfluences" => Some(Self::Weights),
            _ => None,
        }
    }

    /// Number of floats per sample, or `None` for morph weights where it
    /// depends on the mesh.
    #[must_use]
    pub fn fixed_components(self) -> Option<usize> {
        match self {
            Self::Translation | Self::Scale => Some(3),
            Self::Rotation => Some(4),
            Self::Weights => None,
        }
    }
}

/// Typed track name: the scene node a track drives plus the property on it.
///
/// Displays as `<node>.<property>`, e.g. `myModel.quaternion`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackName {
    pub node: String,
    pub target: TargetPath,
}

impl TrackName {
    #[must_use]
    pub fn new(node: impl Into<String>, target: TargetPath) -> Self {
        Self {
            node: node.into(),
            target,
        }
    }
}

impl fmt::Display for TrackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.target.property_name())
    }
}

impl FromStr for TrackName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Node names may contain dots; the property is always the last segment.
        let (node, property) = s
            .rsplit_once('.')
            .ok_or_else(|| Error::parse(format!("track name `{s}` has no property segment")))?;
        if node.is_empty() {
            return Err(Error::parse(format!("track name `{s}` has an empty node name")));
        }
        let target = TargetPath::from_property_name(property)
            .ok_or_else(|| Error::parse(format!("unknown track property `{property}` in `{s}`")))?;
        Ok(Self::new(node, target))
    }
}

/// Binding relationship: maps track `track_index` from a Clip to the target property
/// of `node_handle` in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
