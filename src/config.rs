//! Import & Export Configuration
//!
//! Plain option structs for the loader and the exporter. Both deserialize from
//! JSON with every field optional, so a host application can keep them in its
//! own settings file:
//!
//! ```rust,ignore
//! use clipmerge::config::{ExportFormat, ExportOptions};
//!
//! let options: ExportOptions = serde_json::from_str(r#"{ "format": "text" }"#)?;
//! assert_eq!(options.format, ExportFormat::Text);
//! assert_eq!(options.clip_name, "MergedAnimation");
//! ```

use serde::{Deserialize, Serialize};

/// Name given to the wrapper node that holds the imported scene.
pub const ROOT_NODE_NAME: &str = "myModel";

/// Name of the clip produced by [`crate::animation::assemble`].
pub const MERGED_CLIP_NAME: &str = "MergedAnimation";

/// Options for [`crate::assets::GltfLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Name of the animated wrapper node. Synthetic tracks target this name.
    pub root_node_name: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            root_node_name: ROOT_NODE_NAME.to_string(),
        }
    }
}

/// Output container produced by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Packed binary container (`.glb`).
    #[default]
    Binary,
    /// Pretty-printed JSON document with embedded buffers (`.gltf`).
    Text,
}

impl ExportFormat {
    /// File extension, without the dot.
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Binary => "glb",
            Self::Text => "gltf",
        }
    }

    /// MIME-type classification handed to the save sink.
    #[inline]
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Binary => "application/octet-stream",
            Self::Text => "text/plain",
        }
    }
}

/// Options for [`crate::assets::GltfExporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Name of the single animation written to the bundle.
    pub clip_name: String,
    /// Suggested file name without extension.
    pub file_stem: String,
    /// Value written to `asset.generator`.
    pub generator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Binary,
            clip_name: MERGED_CLIP_NAME.to_string(),
            file_stem: "Exported".to_string(),
            generator: concat!("clipmerge ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExportOptions {
    /// Suggested file name, e.g. `Exported.glb`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }
}
