//! Energy-based transient detection for beat slicing.
//!
//! The buffer is split into fixed windows. A window opens a new slice when
//! its scaled energy exceeds both the absolute threshold and `rise_ratio`
//! times the previous window's energy. The boundary lands on the window's
//! first zero crossing, or on the window start when there is none.
//!
//! Only windows followed by at least one more sample are analyzed, so a
//! trailing partial (or exactly final) window never produces a boundary.
//!
//! ## Use Cases
//!
//! - Auto-slicing drum loops
//! - Splitting recorded phrases at attacks

/// Samples per analysis window.
pub const DEFAULT_WINDOW_SIZE: usize = 256;

/// Energy jump over the previous window required for an onset.
const DEFAULT_RISE_RATIO: f32 = 10.0;

/// Scale applied to the per-sample mean energy.
const ENERGY_SCALE: f32 = 100.0;

/// Threshold bounds accepted by [`TransientDetector::set_threshold`].
const MIN_THRESHOLD: f32 = 0.01;
const MAX_THRESHOLD: f32 = 10.0;

/// Detector parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DetectorConfig {
    pub window_size: usize,
    /// Absolute energy an onset window must exceed.
    pub threshold: f32,
    /// Required ratio over the previous window's energy.
    pub rise_ratio: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            threshold: 1.0,
            rise_ratio: DEFAULT_RISE_RATIO,
        }
    }
}

/// Statistics for one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Offset of the window's first sample.
    pub start: usize,
    /// `100 * sum(x^2) / window_size`.
    pub energy: f32,
    /// Absolute offset of the first zero crossing, if any.
    pub zero_crossing: Option<usize>,
}

impl WindowStats {
    /// Where a slice starting in this window should begin.
    pub fn boundary(&self) -> usize {
        self.zero_crossing.unwrap_or(self.start)
    }
}

/// One-shot transient detector.
#[derive(Debug, Clone)]
pub struct TransientDetector {
    config: DetectorConfig,
}

impl Default for TransientDetector {
    fn default() -> Self {
        Self::with_config(DetectorConfig::default())
    }
}

impl TransientDetector {
    /// Create a detector with the given sensitivity threshold.
    pub fn new(threshold: f32) -> Self {
        let mut detector = Self::default();
        detector.set_threshold(threshold);
        detector
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config: DetectorConfig {
                window_size: config.window_size.max(1),
                ..config
            },
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Set the detection threshold (clamped to 0.01 - 10.0).
    pub fn set_threshold(&mut self, threshold: f32) {
        self.config.threshold = threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    /// Per-window energy and zero-crossing statistics.
    pub fn analyze<I>(&self, samples: I) -> Vec<WindowStats>
    where
        I: IntoIterator<Item = f32>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut samples = samples.into_iter();
        let total = samples.len();
        let size = self.config.window_size;
        let mut stats = Vec::with_capacity(total / size);

        let mut previous = 0.0f32;
        let mut start = 0usize;
        while start + size < total {
            let mut sum_sq = 0.0f32;
            let mut zero_crossing = None;
            for (k, sample) in samples.by_ref().take(size).enumerate() {
                sum_sq += sample * sample;
                if zero_crossing.is_none() && crosses_zero(previous, sample) {
                    zero_crossing = Some(start + k);
                }
                previous = sample;
            }
            stats.push(WindowStats {
                start,
                energy: ENERGY_SCALE * sum_sq / size as f32,
                zero_crossing,
            });
            start += size;
        }

        stats
    }

    /// Detect slice boundaries.
    ///
    /// The result always begins with 0, followed by detected boundaries in
    /// strictly ascending order.
    pub fn detect<I>(&self, samples: I) -> Vec<usize>
    where
        I: IntoIterator<Item = f32>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut boundaries = vec![0];
        let mut prev_energy = 0.0f32;

        for window in self.analyze(samples) {
            if window.energy > self.config.threshold
                && window.energy > self.config.rise_ratio * prev_energy
            {
                let boundary = window.boundary();
                if boundaries.last().is_some_and(|&last| boundary > last) {
                    boundaries.push(boundary);
                }
            }
            prev_energy = window.energy;
        }

        boundaries
    }
}

/// True when `current` sits on the other side of zero from `previous`
/// (counting exact zero as its own side).
#[inline]
fn crosses_zero(previous: f32, current: f32) -> bool {
    sign(previous) != sign(current)
}

#[inline]
fn sign(x: f32) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn silence_then_burst(silent: usize, loud: usize, amplitude: f32) -> Vec<f32> {
        let mut samples = vec![0.0f32; silent + loud];
        samples[silent..].fill(amplitude);
        samples
    }

    #[test]
    fn test_detector_creation() {
        let detector = TransientDetector::default();
        assert_eq!(detector.config().window_size, DEFAULT_WINDOW_SIZE);
        assert_relative_eq!(detector.threshold(), 1.0);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let mut detector = TransientDetector::new(0.0);
        assert_relative_eq!(detector.threshold(), MIN_THRESHOLD);
        detector.set_threshold(50.0);
        assert_relative_eq!(detector.threshold(), MAX_THRESHOLD);
    }

    #[test]
    fn test_silence_yields_origin_only() {
        let detector = TransientDetector::new(0.5);
        assert_eq!(detector.detect(vec![0.0f32; 10_000]), vec![0]);
        assert_eq!(detector.detect(Vec::<f32>::new()), vec![0]);
    }

    #[test]
    fn test_single_burst_after_silence() {
        let samples = silence_then_burst(10_000, 1_000, 1.0);
        let detector = TransientDetector::new(1.0);
        let boundaries = detector.detect(samples.iter().copied());

        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0], 0);
        assert_eq!(boundaries[1], 10_000);
    }

    #[test]
    fn test_window_energy_scale() {
        let detector = TransientDetector::new(1.0);
        let stats = detector.analyze(vec![0.5f32; 600]);
        assert_eq!(stats.len(), 2);
        // 100 * 0.25 * 256 / 256
        assert_relative_eq!(stats[0].energy, 25.0);
        assert_eq!(stats[0].zero_crossing, Some(0));
        assert_eq!(stats[1].zero_crossing, None);
    }

    #[test]
    fn test_boundary_falls_back_to_window_start() {
        let window = WindowStats {
            start: 512,
            energy: 50.0,
            zero_crossing: None,
        };
        assert_eq!(window.boundary(), 512);
    }

    #[test]
    fn test_final_window_is_not_analyzed() {
        let detector = TransientDetector::new(1.0);
        // Exactly two windows worth: only the first has a following sample.
        let stats = detector.analyze(vec![0.0f32; 2 * DEFAULT_WINDOW_SIZE]);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn test_gradual_rise_does_not_slice() {
        // Each window is louder than the last, but never by 10x.
        let samples: Vec<f32> = (0..4096)
            .map(|i| 0.3 + 0.6 * (i as f32 / 4096.0))
            .collect();
        let detector = TransientDetector::new(0.5);
        assert_eq!(detector.detect(samples), vec![0]);
    }

    #[test]
    fn test_threshold_gates_quiet_onsets() {
        let samples = silence_then_burst(1024, 1024, 0.05);
        // energy = 100 * 0.0025 = 0.25
        assert_eq!(TransientDetector::new(1.0).detect(samples.clone()), vec![0]);
        assert_eq!(TransientDetector::new(0.1).detect(samples), vec![0, 1024]);
    }
}
