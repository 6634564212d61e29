use std::sync::Arc;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end, hold the last frame and pause.
    #[default]
    Once,
    /// Wrap around at the end.
    Loop,
}

impl LoopMode {
    /// Maps an unbounded local time into `[0, duration]`, reporting whether
    /// playback reached an end it does not wrap past.
    fn resolve(self, time: f32, duration: f32) -> (f32, bool) {
        match self {
            Self::Once => (time.clamp(0.0, duration), time >= duration || time < 0.0),
            Self::Loop => (time.rem_euclid(duration), false),
        }
    }
}

/// Playback state of one clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,
    duration: f32,

    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        let duration = clip.resolved_duration();
        Self {
            clip,
            duration,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Once,
            paused: false,
            enabled: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Starts (or resumes) playback.
    pub fn play(&mut self) {
        self.enabled = true;
        self.paused = false;
    }

    /// Disables the action and rewinds it.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.paused = false;
        self.time = 0.0;
    }

    /// Advances the local time by `dt` seconds (scaled by `time_scale`).
    ///
    /// A `Once` action that runs off either end holds that end and pauses.
    pub fn update(&mut self, dt: f32) {
        if self.paused || !self.enabled || self.duration <= 0.0 {
            return;
        }

        let (time, finished) = self
            .loop_mode
            .resolve(self.time + dt * self.time_scale, self.duration);
        self.time = time;
        if finished {
            self.paused = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{ClipDuration, TrackMap};

    fn action(duration: f32) -> AnimationAction {
        let clip = AnimationClip::new("a", ClipDuration::Explicit(duration), TrackMap::new());
        let mut action = AnimationAction::new(Arc::new(clip));
        action.play();
        action
    }

    #[test]
    fn once_clamps_and_pauses() {
        let mut a = action(2.0);
        a.update(1.5);
        a.update(1.5);
        assert_eq!(a.time, 2.0);
        assert!(a.paused);
    }

    #[test]
    fn loop_wraps() {
        let mut a = action(2.0);
        a.loop_mode = LoopMode::Loop;
        a.update(2.5);
        assert!((a.time - 0.5).abs() < 1e-6);
        assert!(!a.paused);
    }

    #[test]
    fn disabled_action_does_not_advance() {
        let mut a = action(2.0);
        a.stop();
        a.update(1.0);
        assert_eq!(a.time, 0.0);
    }
}
