use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::errors::{Error, Result};
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves each track of `clip` to a node under the scene's animated root.
    ///
    /// Tracks whose node cannot be found are skipped; use [`Binder::bind_all`]
    /// when every track must bind.
    #[must_use]
    pub fn bind(scene: &Scene, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            match scene.find_node_by_name(&track.name.node) {
                Some(node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.target(),
                }),
                None => log::debug!("No node named `{}` for track `{}`", track.name.node, track.name),
            }
        }

        bindings
    }

    /// Like [`Binder::bind`] but fails on the first unresolved track.
    pub fn bind_all(scene: &Scene, clip: &AnimationClip) -> Result<Vec<PropertyBinding>> {
        clip.tracks
            .iter()
            .enumerate()
            .map(|(track_index, track)| {
                let node_handle: NodeHandle = scene
                    .find_node_by_name(&track.name.node)
                    .ok_or_else(|| {
                        Error::export(format!(
                            "track `{}` targets node `{}` which is not in the scene",
                            track.name, track.name.node
                        ))
                    })?;
                Ok(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.target(),
                })
            })
            .collect()
    }
}
