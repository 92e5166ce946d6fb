//! Scalar helpers shared by the loop window and playback code.
//!
//! These never panic on inverted ranges; `f32::clamp` does, and window
//! bounds computed from float controls can briefly invert at degenerate
//! slice sizes.

/// Clamp `x` to `[lo, hi]`. When `lo > hi` the result is `lo`.
#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    x.min(hi).max(lo)
}

/// Linear map of `x` from `[x0, x1]` onto `[y0, y1]`.
#[inline]
pub fn rescale(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn crossfade(a: f32, b: f32, p: f32) -> f32 {
    a + (b - a) * p
}
