//! # clipmerge
//!
//! Merge the keyframe animations of a glTF bundle, optionally together with a
//! small synthetic transform clip, into one continuous animation and export the
//! result as `.glb` or `.gltf`.
//!
//! ```rust,ignore
//! use clipmerge::{SyntheticParams, Workspace};
//!
//! let mut workspace = Workspace::new()?;
//! workspace.import(&std::fs::read("robot.glb")?)?;
//! workspace.toggle_animation("Walk");
//! workspace.toggle_animation("Run");
//! workspace.set_params(SyntheticParams { duration: 2.0, ..Default::default() })?;
//! workspace.set_include_synthetic(true);
//!
//! let payload = workspace.export()?;
//! std::fs::write(&payload.file_name, &payload.bytes)?;
//! ```

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod scene;
pub mod session;

pub use animation::{
    AnimationAction, AnimationClip, AnimationMixer, Binder, ClipDuration, InterpolationMode, LoopMode,
    MergeReport, Selection, SyntheticParams, TargetPath, Track, TrackMap, TrackName, assemble, merge,
    synthesize,
};
pub use assets::{ExportPayload, GltfExporter, GltfLoader, ImportedBundle};
pub use config::{ExportFormat, ExportOptions, ImportOptions};
pub use errors::{Error, Result};
pub use scene::{Node, NodeHandle, Scene, Transform};
pub use session::Workspace;
