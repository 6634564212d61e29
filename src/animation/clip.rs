use rustc_hash::FxHashMap;

use crate::animation::binding::TrackName;
use crate::animation::tracks::Track;

/// Clip length: either given explicitly or left for the consumer to derive
/// from the longest track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipDuration {
    Explicit(f32),
    Auto,
}

/// Tracks keyed by [`TrackName`], iterated in first-insertion order.
///
/// Iteration order depends only on the order tracks were inserted, so the same
/// inputs always produce the same sequence (and the same exported bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMap {
    tracks: Vec<Track>,
    index: FxHashMap<TrackName, usize>,
}

impl TrackMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &TrackName) -> Option<&Track> {
        self.index.get(name).map(|&i| &self.tracks[i])
    }

    pub(crate) fn get_mut(&mut self, name: &TrackName) -> Option<&mut Track> {
        self.index.get(name).map(|&i| &mut self.tracks[i])
    }

    #[must_use]
    pub fn contains(&self, name: &TrackName) -> bool {
        self.index.contains_key(name)
    }

    /// Inserts `track`, returning the track it replaced.
    ///
    /// A replaced track keeps its original position in iteration order.
    pub fn insert(&mut self, track: Track) -> Option<Track> {
        if let Some(&i) = self.index.get(&track.name) {
            return Some(std::mem::replace(&mut self.tracks[i], track));
        }
        self.index.insert(track.name.clone(), self.tracks.len());
        self.tracks.push(track);
        None
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &TrackName> {
        self.tracks.iter().map(|t| &t.name)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }
}

impl FromIterator<Track> for TrackMap {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        let mut map = TrackMap::new();
        for track in iter {
            map.insert(track);
        }
        map
    }
}

impl IntoIterator for TrackMap {
    type Item = Track;
    type IntoIter = std::vec::IntoIter<Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrackMap {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: ClipDuration,
    pub tracks: TrackMap,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, duration: ClipDuration, tracks: TrackMap) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Duration in seconds; [`ClipDuration::Auto`] resolves to the latest
    /// keyframe time across all tracks (0 for a clip without keyframes).
    #[must_use]
    pub fn resolved_duration(&self) -> f32 {
        match self.duration {
            ClipDuration::Explicit(d) => d,
            ClipDuration::Auto => self
                .tracks
                .iter()
                .filter_map(Track::end_time)
                .fold(0.0_f32, f32::max),
        }
    }

    #[must_use]
    pub fn track(&self, name: &TrackName) -> Option<&Track> {
        self.tracks.get(name)
    }
}
