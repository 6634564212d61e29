use crate::animation::clip::{AnimationClip, ClipDuration, TrackMap};
use crate::config::MERGED_CLIP_NAME;

/// Wraps merged tracks into the single exported clip.
///
/// The duration is left as [`ClipDuration::Auto`] so the consumer derives it
/// from the longest track. Track order is the merge map's insertion order.
#[must_use]
pub fn assemble(tracks: TrackMap) -> AnimationClip {
    assemble_named(MERGED_CLIP_NAME, tracks)
}

#[must_use]
pub fn assemble_named(name: impl Into<String>, tracks: TrackMap) -> AnimationClip {
    let clip = AnimationClip::new(name, ClipDuration::Auto, tracks);
    log::debug!(
        "Assembled `{}` with {} tracks ({}s)",
        clip.name,
        clip.tracks.len(),
        clip.resolved_duration()
    );
    clip
}
