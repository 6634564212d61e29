//! Keyframe Track Synthesizer
//!
//! Builds the supplementary transform clip from simple end-state parameters.
//! Every synthesized track has two keyframes: the property's identity value at
//! `t = 0` and the requested value at `t = duration`.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::binding::{TargetPath, TrackName};
use crate::animation::clip::{AnimationClip, ClipDuration, TrackMap};
use crate::animation::tracks::{InterpolationMode, Track};
use crate::config::ROOT_NODE_NAME;
use crate::errors::{Error, Result};

/// Name of the synthesized clip.
pub const SYNTHETIC_CLIP_NAME: &str = "CustomAnimation";

/// Euler order used for the degree-based rotation input.
///
/// Intrinsic X, then Y, then Z: `q = qx * qy * qz`.
pub const SYNTHETIC_EULER_ORDER: EulerRot = EulerRot::XYZ;

/// User-supplied end state of the synthetic animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticParams {
    pub final_position: [f32; 3],
    pub final_scale: [f32; 3],
    /// Euler angles in degrees, applied in [`SYNTHETIC_EULER_ORDER`].
    pub final_rotation_degrees: [f32; 3],
    /// Seconds. Must be positive.
    pub duration: f32,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            final_position: [0.0; 3],
            final_scale: [1.0; 3],
            final_rotation_degrees: [0.0; 3],
            duration: 5.0,
        }
    }
}

impl SyntheticParams {
    pub fn validate(&self) -> Result<()> {
        // Written as a negated comparison so NaN is rejected too.
        if !(self.duration > 0.0) || !self.duration.is_finite() {
            return Err(Error::invalid_parameter(
                "duration",
                format!("must be a positive number of seconds, got {}", self.duration),
            ));
        }
        Ok(())
    }

    /// End rotation as a unit quaternion.
    #[must_use]
    pub fn final_rotation(&self) -> Quat {
        let [x, y, z] = self.final_rotation_degrees.map(f32::to_radians);
        Quat::from_euler(SYNTHETIC_EULER_ORDER, x, y, z)
    }
}

/// Synthesizes the custom clip targeting the default animated node.
pub fn synthesize(params: &SyntheticParams) -> Result<AnimationClip> {
    synthesize_for(ROOT_NODE_NAME, params)
}

/// Synthesizes the custom clip targeting `node`.
///
/// Produces exactly three tracks (position, scale, quaternion) with keyframes
/// at `[0, duration]`.
pub fn synthesize_for(node: &str, params: &SyntheticParams) -> Result<AnimationClip> {
    params.validate()?;

    let times = vec![0.0, params.duration];
    let position = Vec3::from_array(params.final_position);
    let scale = Vec3::from_array(params.final_scale);
    let rotation = params.final_rotation();

    let tracks = [
        (
            TargetPath::Translation,
            [Vec3::ZERO.to_array(), position.to_array()].concat(),
        ),
        (
            TargetPath::Scale,
            [Vec3::ONE.to_array(), scale.to_array()].concat(),
        ),
        (
            TargetPath::Rotation,
            [Quat::IDENTITY.to_array(), rotation.to_array()].concat(),
        ),
    ]
    .into_iter()
    .map(|(target, values)| {
        Track::new(
            TrackName::new(node, target),
            times.clone(),
            values,
            InterpolationMode::Linear,
        )
    })
    .collect::<Result<TrackMap>>()?;

    log::debug!(
        "Synthesized `{SYNTHETIC_CLIP_NAME}` for `{node}` over {}s",
        params.duration
    );

    Ok(AnimationClip::new(
        SYNTHETIC_CLIP_NAME,
        ClipDuration::Explicit(params.duration),
        tracks,
    ))
}
