//! Animation data, merging and playback.
//!
//! The export pipeline is a chain of pure functions over snapshots:
//!
//! ```text
//! synthesize(params) ──┐
//!                      ├─> merge(sources, synthetic, selection) ─> assemble(tracks) ─> export
//! imported clips ──────┘
//! ```
//!
//! Playback ([`AnimationMixer`]) is independent of that chain; it only mutates
//! the live pose of scene nodes, which export never reads.

pub mod action;
pub mod assemble;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod merge;
pub mod mixer;
pub mod synth;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use assemble::{assemble, assemble_named};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath, TrackName};
pub use clip::{AnimationClip, ClipDuration, TrackMap};
pub use merge::{MergeReport, Selection, TrackMerger, merge, merge_tracks};
pub use mixer::AnimationMixer;
pub use synth::{SYNTHETIC_CLIP_NAME, SyntheticParams, synthesize, synthesize_for};
pub use tracks::{InterpolationMode, KeyframeCursor, Track};
