//! Track Merger
//!
//! Concatenates same-named tracks from several clips into single continuous
//! tracks. Contributors are appended in encounter order; each appended segment
//! is shifted by the end time the merged track had before the append, so it
//! starts where the previous segment stopped.
//!
//! ```text
//!  A.position  times [0, 1]      values [a0, a1]
//!  B.position  times [0, 2]      values [b0, b1]
//!  ───────────────────────────────────────────────────────
//!  merged      times [0, 1, 1, 3] values [a0, a1, b0, b1]
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::animation::clip::{AnimationClip, TrackMap};
use crate::animation::tracks::Track;

/// Which source clips, and whether the synthetic clip, take part in a merge.
///
/// Clip names keep the order they were selected in; that order is the merge
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    selected: Vec<String>,
    pub include_synthetic: bool,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the given names in order, ignoring repeats.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for name in names {
            selection.select(name);
        }
        selection
    }

    #[must_use]
    pub fn with_synthetic(mut self, include: bool) -> Self {
        self.include_synthetic = include;
        self
    }

    /// Appends `name` to the selection. Returns `false` if it was already selected.
    pub fn select(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.is_selected(&name) {
            return false;
        }
        self.selected.push(name);
        true
    }

    /// Removes `name`. Returns `false` if it was not selected.
    pub fn deselect(&mut self, name: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|n| n != name);
        self.selected.len() != before
    }

    /// Flips the selection state of `name` and returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.deselect(name) {
            false
        } else {
            self.selected.push(name.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    /// Selected clip names in merge order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// `true` when nothing at all would be merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && !self.include_synthetic
    }
}

/// Output of [`merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub tracks: TrackMap,
    /// Selected clip names with no matching source clip. Skipped, not fatal.
    pub missing: Vec<String>,
    /// Names of the clips that contributed, in merge order.
    pub contributors: Vec<String>,
}

/// Incremental track concatenation.
#[derive(Debug, Clone, Default)]
pub struct TrackMerger {
    tracks: TrackMap,
}

impl TrackMerger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one contributor track.
    ///
    /// The first track seen for a name is copied as-is. Later ones are
    /// appended behind it with their times shifted by the existing end time.
    /// Returns `false` if the track was rejected because its component count
    /// differs from the track already merged under that name.
    pub fn append(&mut self, track: &Track) -> bool {
        let Some(existing) = self.tracks.get_mut(&track.name) else {
            self.tracks.insert(track.clone());
            return true;
        };

        if !existing.is_empty()
            && !track.is_empty()
            && existing.component_count() != track.component_count()
        {
            log::warn!(
                "Skipping `{}`: {} components per keyframe, merged track has {}",
                track.name,
                track.component_count(),
                existing.component_count()
            );
            return false;
        }
        if existing.interpolation != track.interpolation {
            log::debug!(
                "`{}` mixes {:?} and {:?} keyframes; keeping {:?}",
                track.name,
                existing.interpolation,
                track.interpolation,
                existing.interpolation
            );
        }

        // Taken once, before the times grow.
        let shift = existing.end_time().unwrap_or(0.0);

        let mut times = Vec::with_capacity(existing.times.len() + track.times.len());
        times.extend_from_slice(&existing.times);
        times.extend(track.times.iter().map(|t| t + shift));

        let mut values = Vec::with_capacity(existing.values.len() + track.values.len());
        values.extend_from_slice(&existing.values);
        values.extend_from_slice(&track.values);

        *existing = Track {
            name: track.name.clone(),
            times,
            values,
            interpolation: existing.interpolation,
        };
        true
    }

    /// Appends every track of `clip`.
    pub fn append_clip(&mut self, clip: &AnimationClip) {
        for track in &clip.tracks {
            self.append(track);
        }
    }

    #[must_use]
    pub fn finish(self) -> TrackMap {
        self.tracks
    }
}

/// Merges an ordered sequence of contributor tracks.
pub fn merge_tracks<'a, I>(contributors: I) -> TrackMap
where
    I: IntoIterator<Item = &'a Track>,
{
    let mut merger = TrackMerger::new();
    for track in contributors {
        merger.append(track);
    }
    merger.finish()
}

/// Merges the selected source clips, then the synthetic clip if included.
///
/// Source clips are looked up by name in selection order. A selected name with
/// no matching clip contributes nothing and is listed in
/// [`MergeReport::missing`].
#[must_use]
pub fn merge(
    sources: &[AnimationClip],
    synthetic: Option<&AnimationClip>,
    selection: &Selection,
) -> MergeReport {
    let mut merger = TrackMerger::new();
    let mut report = MergeReport::default();
    let mut seen = FxHashSet::default();

    for name in selection.names() {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match sources.iter().find(|clip| clip.name == *name) {
            Some(clip) => {
                merger.append_clip(clip);
                report.contributors.push(clip.name.clone());
            }
            None => {
                log::warn!("Selected animation `{name}` not found in the imported bundle; skipping");
                report.missing.push(name.clone());
            }
        }
    }

    if selection.include_synthetic {
        match synthetic {
            Some(clip) => {
                merger.append_clip(clip);
                report.contributors.push(clip.name.clone());
            }
            None => log::warn!("Synthetic clip requested but none was built; skipping"),
        }
    }

    report.tracks = merger.finish();
    report
}
