pub mod exporters;
pub mod loaders;

pub use exporters::{ExportPayload, GltfExporter};
pub use loaders::{GltfLoader, ImportedBundle};
