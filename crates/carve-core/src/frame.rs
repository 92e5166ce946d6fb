//! Stereo frame type.

/// One synchronized pair of left/right samples, normalized to [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    #[inline]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    #[inline]
    pub const fn silence() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Same sample on both channels.
    #[inline]
    pub const fn mono(sample: f32) -> Self {
        Self::new(sample, sample)
    }

    #[inline]
    pub fn scaled(self, gain: f32) -> Self {
        Self::new(self.left * gain, self.right * gain)
    }

    /// Per-channel linear interpolation towards `other` (`t` in 0..1).
    #[inline]
    pub fn lerp(self, other: Frame, t: f32) -> Self {
        Self::new(
            crate::math::crossfade(self.left, other.left, t),
            crate::math::crossfade(self.right, other.right, t),
        )
    }
}

impl From<(f32, f32)> for Frame {
    fn from((left, right): (f32, f32)) -> Self {
        Self::new(left, right)
    }
}

impl From<Frame> for (f32, f32) {
    fn from(frame: Frame) -> Self {
        (frame.left, frame.right)
    }
}
