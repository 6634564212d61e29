use serde::{Deserialize, Serialize};

use crate::animation::binding::{TargetPath, TrackName};
use crate::animation::values::Interpolatable;
use crate::errors::{Error, Result};

/// How values between two keyframes are produced.
///
/// Cubic-spline input is flattened to [`InterpolationMode::Linear`] on import,
/// so every track keeps exactly one value per keyframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

impl InterpolationMode {
    /// glTF `sampler.interpolation` value.
    #[must_use]
    pub fn gltf_name(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Step => "STEP",
        }
    }
}

const MAX_SCAN_OFFSET: usize = 3;

/// Last keyframe index found by [`Track::locate`], reused by the next lookup.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// A named time/value sample sequence for one target property.
///
/// `values` is flat: sample `i` occupies
/// `values[i * component_count()..(i + 1) * component_count()]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: TrackName,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
    pub interpolation: InterpolationMode,
}

impl Track {
    /// Builds a track after checking the layout invariants (see [`Track::validate`]).
    pub fn new(
        name: TrackName,
        times: Vec<f32>,
        values: Vec<f32>,
        interpolation: InterpolationMode,
    ) -> Result<Self> {
        let track = Self {
            name,
            times,
            values,
            interpolation,
        };
        track.validate()?;
        Ok(track)
    }

    /// Checks the layout invariants:
    /// - `times` is finite, non-negative and non-decreasing
    /// - `values.len() == times.len() * component_count`
    ///
    /// The fields are public, so a track built without [`Track::new`] may
    /// break them; consumers that serialize tracks call this first.
    pub fn validate(&self) -> Result<()> {
        let name = &self.name;
        let (times, values) = (&self.times, &self.values);

        if let Some(bad) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(Error::invalid_parameter(
                "times",
                format!("track `{name}` has an invalid keyframe time {bad}"),
            ));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::invalid_parameter(
                "times",
                format!("track `{name}` times are not non-decreasing"),
            ));
        }

        let layout_ok = match name.target.fixed_components() {
            Some(n) => values.len() == times.len() * n,
            // Morph weights: any whole number of weights per keyframe.
            None if times.is_empty() => values.is_empty(),
            None => values.len() % times.len() == 0,
        };
        if !layout_ok {
            return Err(Error::invalid_parameter(
                "values",
                format!(
                    "track `{name}` has {} values for {} keyframes",
                    values.len(),
                    times.len()
                ),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> TargetPath {
        self.name.target
    }

    /// Number of keyframes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Floats per keyframe.
    #[must_use]
    pub fn component_count(&self) -> usize {
        match self.name.target.fixed_components() {
            Some(n) => n,
            None if self.times.is_empty() => 0,
            None => self.values.len() / self.times.len(),
        }
    }

    /// Time of the last keyframe.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Components of keyframe `index`.
    #[must_use]
    pub fn value_at(&self, index: usize) -> &[f32] {
        let n = self.component_count();
        &self.values[index * n..(index + 1) * n]
    }

    /// Finds the keyframe interval containing `time`.
    ///
    /// Returns the left keyframe index and the interpolation factor in `[0, 1]`
    /// towards the next keyframe. Tries a short linear scan from the cursor
    /// first and falls back to binary search on large jumps.
    ///
    /// The track must not be empty.
    pub fn locate(&self, time: f32, cursor: &mut KeyframeCursor) -> (usize, f32) {
        let len = self.times.len();
        if len == 1 {
            return (0, 0.0);
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found_index = if time >= t_curr {
            // Playback moving forward: check [i, i+1), [i+1, i+2), ...
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Reverse playback or loop reset
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found_index.unwrap_or_else(|| {
            // partition_point returns the first keyframe after `time`
            let next_idx = self.times.partition_point(|&t| t <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = index;

        if index >= len - 1 {
            return (len - 1, 0.0);
        }

        let t0 = self.times[index];
        let dt = self.times[index + 1] - t0;
        let alpha = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        (index, alpha.clamp(0.0, 1.0))
    }

    /// Samples the track as `T` at `time`, or `None` if the track is empty or
    /// its component count does not match `T`.
    pub fn sample<T: Interpolatable>(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() || self.component_count() != T::COMPONENTS {
            return None;
        }

        let (index, alpha) = self.locate(time, cursor);
        let v0 = T::from_components(self.value_at(index));
        if index + 1 >= self.len() {
            return Some(v0);
        }
        Some(match self.interpolation {
            InterpolationMode::Step => v0,
            InterpolationMode::Linear => {
                T::interpolate_linear(v0, T::from_components(self.value_at(index + 1)), alpha)
            }
        })
    }

    /// Samples every component independently into `out` (used for morph weights).
    pub fn sample_components_into(&self, time: f32, cursor: &mut KeyframeCursor, out: &mut Vec<f32>) {
        out.clear();
        if self.is_empty() {
            return;
        }

        let (index, alpha) = self.locate(time, cursor);
        let v0 = self.value_at(index);
        if index + 1 >= self.len() || self.interpolation == InterpolationMode::Step {
            out.extend_from_slice(v0);
            return;
        }
        let v1 = self.value_at(index + 1);
        out.extend(
            v0.iter()
                .zip(v1)
                .map(|(&a, &b)| f32::interpolate_linear(a, b, alpha)),
        );
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn position_track(times: Vec<f32>, values: Vec<f32>) -> Result<Track> {
        Track::new(
            TrackName::new("node", TargetPath::Translation),
            times,
            values,
            InterpolationMode::Linear,
        )
    }

    #[test]
    fn rejects_bad_layout() {
        assert!(position_track(vec![0.0, 1.0], vec![0.0; 5]).is_err());
        assert!(position_track(vec![1.0, 0.0], vec![0.0; 6]).is_err());
        assert!(position_track(vec![0.0, f32::NAN], vec![0.0; 6]).is_err());
        assert!(position_track(vec![-1.0, 0.0], vec![0.0; 6]).is_err());
        assert!(position_track(vec![0.0, 0.0], vec![0.0; 6]).is_ok());
    }

    #[test]
    fn validate_catches_hand_built_tracks() {
        let mut track = position_track(vec![0.0, 1.0], vec![0.0; 6]).unwrap();
        assert!(track.validate().is_ok());

        track.values.pop();
        assert!(track.validate().unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn cursor_scan_matches_binary_search() {
        let times: Vec<f32> = (0..20).map(|i| i as f32).collect();
        let values: Vec<f32> = (0..20).flat_map(|i| [i as f32, 0.0, 0.0]).collect();
        let track = position_track(times, values).unwrap();

        let mut cursor = KeyframeCursor::default();
        for &t in &[0.5, 1.5, 2.5, 15.2, 3.1, 19.0, 25.0, 0.0] {
            let v: Vec3 = track.sample(t, &mut cursor).unwrap();
            let expected = t.clamp(0.0, 19.0);
            assert!((v.x - expected).abs() < 1e-5, "t={t}: got {}", v.x);
        }
    }

    #[test]
    fn weights_component_count_is_derived() {
        let track = Track::new(
            TrackName::new("face", TargetPath::Weights),
            vec![0.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.5],
            InterpolationMode::Linear,
        )
        .unwrap();
        assert_eq!(track.component_count(), 2);

        let mut out = Vec::new();
        track.sample_components_into(0.5, &mut KeyframeCursor::default(), &mut out);
        assert_eq!(out, vec![0.5, 0.25]);
    }
}
