use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::Scene;

/// Drives every playing [`AnimationAction`] and writes sampled values into the
/// live pose of the bound scene nodes.
///
/// Actions are applied in the order they were added; when two playing actions
/// drive the same property the later one wins.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    scratch: Vec<f32>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an action for `clip`, bound against `scene`.
    pub fn add_clip(&mut self, scene: &Scene, clip: Arc<AnimationClip>) {
        let bindings = Binder::bind(scene, &clip);
        let mut action = AnimationAction::new(clip);
        action.bindings = bindings;
        self.add_action(action);
    }

    /// Adds `action`, replacing any existing action for a clip of the same name.
    pub fn add_action(&mut self, action: AnimationAction) {
        self.actions.retain(|a| a.clip().name != action.clip().name);
        self.actions.push(action);
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    #[must_use]
    pub fn action(&self, clip_name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.clip().name == clip_name)
    }

    pub fn action_mut(&mut self, clip_name: &str) -> Option<&mut AnimationAction> {
        self.actions.iter_mut().find(|a| a.clip().name == clip_name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &AnimationAction> {
        self.actions.iter()
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        for action in &mut self.actions {
            action.loop_mode = mode;
        }
    }

    /// Pauses every action without rewinding.
    pub fn pause_all(&mut self) {
        for action in &mut self.actions {
            action.paused = true;
        }
    }

    /// Advances every action by `dt` and applies the sampled values to `scene`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if !action.enabled {
                continue;
            }

            let clip = Arc::clone(action.clip());
            let time = action.time;
            for binding in &action.bindings {
                let track = &clip.tracks.as_slice()[binding.track_index];
                let cursor = &mut action.track_cursors[binding.track_index];
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                match binding.target {
                    TargetPath::Translation => {
                        if let Some(v) = track.sample::<Vec3>(time, cursor) {
                            node.transform.position = v;
                        }
                    }
                    TargetPath::Scale => {
                        if let Some(v) = track.sample::<Vec3>(time, cursor) {
                            node.transform.scale = v;
                        }
                    }
                    TargetPath::Rotation => {
                        if let Some(q) = track.sample::<Quat>(time, cursor) {
                            node.transform.rotation = q;
                        }
                    }
                    TargetPath::Weights => {
                        track.sample_components_into(time, cursor, &mut self.scratch);
                        if !self.scratch.is_empty() {
                            node.weights.clone_from(&self.scratch);
                        }
                    }
                }
            }
        }
    }
}
