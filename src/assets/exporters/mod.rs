pub mod gltf;

pub use self::gltf::{ExportPayload, GltfExporter};
