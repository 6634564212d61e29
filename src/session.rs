//! Editing Session
//!
//! [`Workspace`] owns one imported bundle together with everything the user
//! adjusts around it: the synthetic clip parameters, the clip selection and
//! playback state. Export runs the full pipeline against a rest-pose snapshot:
//!
//! ```text
//! import ─> bundle.animations ─┐
//! set_params ─> synthetic ─────┼─> merge ─> assemble ─> GltfExporter
//! selection ───────────────────┘
//! ```
//!
//! Playback only ever touches the live pose of `bundle.scene`; export does not
//! read it.

use std::sync::Arc;

use crate::animation::action::LoopMode;
use crate::animation::assemble::assemble_named;
use crate::animation::clip::AnimationClip;
use crate::animation::merge::{MergeReport, Selection, merge};
use crate::animation::mixer::AnimationMixer;
use crate::animation::synth::{SYNTHETIC_CLIP_NAME, SyntheticParams, synthesize_for};
use crate::assets::{ExportPayload, GltfExporter, GltfLoader, ImportedBundle};
use crate::config::{ExportFormat, ExportOptions, ImportOptions};
use crate::errors::{Error, Result};
use crate::scene::Scene;

/// One import/merge/export session.
#[derive(Debug)]
pub struct Workspace {
    bundle: Option<ImportedBundle>,

    params: SyntheticParams,
    synthetic: AnimationClip,
    selection: Selection,

    mixer: AnimationMixer,
    loop_mode: LoopMode,
    playing: bool,

    import_options: ImportOptions,
    export_options: ExportOptions,
}

impl Workspace {
    /// Creates an empty workspace with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(ImportOptions::default(), ExportOptions::default())
    }

    pub fn with_options(import_options: ImportOptions, export_options: ExportOptions) -> Result<Self> {
        let params = SyntheticParams::default();
        let synthetic = synthesize_for(&import_options.root_node_name, &params)?;
        Ok(Self {
            bundle: None,
            params,
            synthetic,
            selection: Selection::new(),
            mixer: AnimationMixer::new(),
            loop_mode: LoopMode::Once,
            playing: false,
            import_options,
            export_options,
        })
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Replaces the current bundle with the one in `bytes`.
    ///
    /// On failure the previous bundle, selection and playback state are kept.
    /// On success the clip selection is cleared (the synthetic flag survives)
    /// and playback is rebuilt for the new scene.
    pub fn import(&mut self, bytes: &[u8]) -> Result<&ImportedBundle> {
        let bundle = GltfLoader::parse(bytes, &self.import_options)?;
        Ok(self.install(bundle))
    }

    /// [`Workspace::import`] with parsing offloaded to the blocking pool.
    pub async fn import_async(&mut self, bytes: Vec<u8>) -> Result<&ImportedBundle> {
        let bundle = GltfLoader::parse_async(bytes, self.import_options.clone()).await?;
        Ok(self.install(bundle))
    }

    fn install(&mut self, bundle: ImportedBundle) -> &ImportedBundle {
        self.selection.clear();
        self.playing = false;
        let bundle = self.bundle.insert(bundle);

        self.mixer.clear();
        for clip in &bundle.animations {
            if clip.name == SYNTHETIC_CLIP_NAME {
                log::warn!(
                    "Imported clip `{SYNTHETIC_CLIP_NAME}` shares its name with the synthetic clip; \
                     it can be merged but playback previews the synthetic one"
                );
                continue;
            }
            self.mixer.add_clip(&bundle.scene, Arc::new(clip.clone()));
        }
        self.mixer.add_clip(&bundle.scene, Arc::new(self.synthetic.clone()));
        self.mixer.set_loop_mode(self.loop_mode);

        bundle
    }

    #[must_use]
    pub fn bundle(&self) -> Option<&ImportedBundle> {
        self.bundle.as_ref()
    }

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.bundle.as_ref().map(|b| &b.scene)
    }

    /// Names of the imported clips, in bundle order. Empty before any import.
    #[must_use]
    pub fn available_animations(&self) -> Vec<String> {
        self.bundle
            .as_ref()
            .map(ImportedBundle::animation_names)
            .unwrap_or_default()
    }

    // ========================================================================
    // Synthetic clip
    // ========================================================================

    #[must_use]
    pub fn params(&self) -> &SyntheticParams {
        &self.params
    }

    #[must_use]
    pub fn synthetic_clip(&self) -> &AnimationClip {
        &self.synthetic
    }

    /// Rebuilds the synthetic clip. Rejected parameters leave the current clip in place.
    pub fn set_params(&mut self, params: SyntheticParams) -> Result<()> {
        let synthetic = synthesize_for(&self.import_options.root_node_name, &params)?;
        self.params = params;
        self.synthetic = synthetic;

        if let Some(bundle) = &self.bundle {
            self.mixer
                .add_clip(&bundle.scene, Arc::new(self.synthetic.clone()));
            self.mixer.set_loop_mode(self.loop_mode);
            if self.playing {
                self.apply_play_state();
            }
        }
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Flips whether the imported clip `name` takes part in merge and playback.
    ///
    /// Returns the new state.
    pub fn toggle_animation(&mut self, name: &str) -> bool {
        let selected = self.selection.toggle(name);
        if self.playing {
            self.apply_play_state();
        }
        selected
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        if self.playing {
            self.apply_play_state();
        }
    }

    pub fn set_include_synthetic(&mut self, include: bool) {
        self.selection.include_synthetic = include;
        if self.playing {
            self.apply_play_state();
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Plays every selected clip, plus the synthetic clip when included.
    pub fn play(&mut self) {
        self.playing = true;
        self.apply_play_state();
    }

    /// Pauses every clip without rewinding.
    pub fn pause(&mut self) {
        self.playing = false;
        self.mixer.pause_all();
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.loop_mode = if looping { LoopMode::Loop } else { LoopMode::Once };
        self.mixer.set_loop_mode(self.loop_mode);
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    /// Advances playback by `dt` seconds and updates the live pose.
    pub fn update(&mut self, dt: f32) {
        if let Some(bundle) = &mut self.bundle {
            self.mixer.update(dt, &mut bundle.scene);
        }
    }

    fn apply_play_state(&mut self) {
        let selection = &self.selection;
        for name in self
            .mixer
            .actions()
            .map(|a| a.clip().name.clone())
            .collect::<Vec<_>>()
        {
            let wanted = if name == SYNTHETIC_CLIP_NAME {
                selection.include_synthetic
            } else {
                selection.is_selected(&name)
            };
            if let Some(action) = self.mixer.action_mut(&name) {
                if wanted {
                    action.play();
                } else {
                    action.paused = true;
                }
            }
        }
    }

    // ========================================================================
    // Merge & Export
    // ========================================================================

    /// Merges the current selection without exporting.
    #[must_use]
    pub fn merge_selected(&self) -> MergeReport {
        let sources = self
            .bundle
            .as_ref()
            .map_or(&[][..], |b| b.animations.as_slice());
        merge(sources, Some(&self.synthetic), &self.selection)
    }

    /// The clip that [`Workspace::export`] would write.
    #[must_use]
    pub fn merged_clip(&self) -> AnimationClip {
        assemble_named(self.export_options.clip_name.clone(), self.merge_selected().tracks)
    }

    #[must_use]
    pub fn export_options(&self) -> &ExportOptions {
        &self.export_options
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.export_options.format = format;
    }

    /// Merges, assembles and serializes the current bundle.
    pub fn export(&self) -> Result<ExportPayload> {
        let scene = self.require_scene()?;
        GltfExporter::export(scene, &self.merged_clip(), &self.export_options)
    }

    /// [`Workspace::export`] with serialization offloaded to the blocking pool.
    pub async fn export_async(&self) -> Result<ExportPayload> {
        let scene = self.require_scene()?.clone();
        GltfExporter::export_async(scene, self.merged_clip(), self.export_options.clone()).await
    }

    fn require_scene(&self) -> Result<&Scene> {
        self.scene()
            .ok_or_else(|| Error::export("nothing to export: no bundle has been imported"))
    }
}
