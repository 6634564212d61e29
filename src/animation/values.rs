use glam::{Quat, Vec3};

/// A sample type that can be read from a flat `f32` keyframe buffer and
/// interpolated between two keyframes.
pub trait Interpolatable: Copy + Sized {
    /// Floats per sample in the flat buffer.
    const COMPONENTS: usize;

    /// Reads one sample. `slice.len()` is exactly [`Self::COMPONENTS`].
    fn from_components(slice: &[f32]) -> Self;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    const COMPONENTS: usize = 1;

    fn from_components(slice: &[f32]) -> Self {
        slice[0]
    }

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    const COMPONENTS: usize = 3;

    fn from_components(slice: &[f32]) -> Self {
        Vec3::from_slice(slice)
    }

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    const COMPONENTS: usize = 4;

    // glTF order: x, y, z, w
    fn from_components(slice: &[f32]) -> Self {
        Quat::from_slice(slice).normalize()
    }

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}
