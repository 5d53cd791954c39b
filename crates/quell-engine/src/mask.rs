//! Gate mask generation
//!
//! Converts magnitude spectra plus a noise profile into per-frame, per-bin
//! attenuation masks:
//! - soft gate: gains ramp from the floor gain up to unity across the band
//!   `[floor, floor + sensitivity * deviation]` (smoothstep, no hard cut)
//! - spectral smoothing: adjacent-bin moving average against isolated gated
//!   or passed bins
//! - temporal smoothing: exponential blend with the previous frame's mask
//!   against frame-to-frame gain flutter ("musical noise")
//!
//! Output gains are clamped to `[gain_floor, 1.0]`; a gated bin is strongly
//! attenuated but never silenced outright.

use rayon::prelude::*;

use crate::config::DenoiseConfig;
use crate::profile::NoiseProfile;

// Transition bands narrower than this collapse to a hard threshold test.
const WIDTH_EPS: f32 = 1e-12;

/// Per-frame gate mask generator
#[derive(Debug, Clone)]
pub struct MaskGenerator {
    sensitivity: f32,
    smoothing_decay: f32,
    spectral_radius: usize,
    gain_floor: f32,
}

impl MaskGenerator {
    /// Build a generator from validated configuration
    pub fn from_config(config: &DenoiseConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            smoothing_decay: config.smoothing_decay,
            spectral_radius: config.spectral_radius,
            gain_floor: config.gain_floor,
        }
    }

    /// Compute one mask per frame
    ///
    /// The raw gate and spectral smoothing are frame-independent and run in
    /// parallel; temporal smoothing is a cheap sequential pass over the
    /// result.
    pub fn compute(&self, magnitudes: &[Vec<f32>], profile: &NoiseProfile) -> Vec<Vec<f32>> {
        let mut masks: Vec<Vec<f32>> = magnitudes
            .par_iter()
            .map(|frame| {
                let raw = self.gate_frame(frame, profile);
                self.smooth_bins(raw)
            })
            .collect();

        self.smooth_time(&mut masks);
        masks
    }

    /// Soft gate of one frame against the profile
    fn gate_frame(&self, magnitudes: &[f32], profile: &NoiseProfile) -> Vec<f32> {
        magnitudes
            .iter()
            .enumerate()
            .map(|(b, &mag)| {
                let lo = profile.floor[b];
                let width = self.sensitivity * profile.deviation[b];

                if width <= WIDTH_EPS {
                    if mag > lo { 1.0 } else { self.gain_floor }
                } else {
                    let t = ((mag - lo) / width).clamp(0.0, 1.0);
                    let shaped = t * t * (3.0 - 2.0 * t);
                    self.gain_floor + (1.0 - self.gain_floor) * shaped
                }
            })
            .collect()
    }

    /// Moving average over adjacent bins
    fn smooth_bins(&self, gains: Vec<f32>) -> Vec<f32> {
        let radius = self.spectral_radius;
        if radius == 0 || gains.len() < 2 {
            return gains;
        }

        let bins = gains.len();
        (0..bins)
            .map(|b| {
                let lo = b.saturating_sub(radius);
                let hi = (b + radius).min(bins - 1);
                let sum: f32 = gains[lo..=hi].iter().sum();
                sum / (hi - lo + 1) as f32
            })
            .collect()
    }

    /// Exponential blend of each frame's mask with its predecessor
    fn smooth_time(&self, masks: &mut [Vec<f32>]) {
        let decay = self.smoothing_decay;
        if masks.is_empty() {
            return;
        }

        let bins = masks[0].len();
        let mut prev = vec![1.0f32; bins];

        for mask in masks.iter_mut() {
            for (b, gain) in mask.iter_mut().enumerate() {
                let blended = decay * prev[b] + (1.0 - decay) * *gain;
                *gain = blended.clamp(self.gain_floor, 1.0);
                prev[b] = *gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn profile(floor: f32, deviation: f32, bins: usize) -> NoiseProfile {
        NoiseProfile {
            floor: vec![floor; bins],
            deviation: vec![deviation; bins],
            frame_count: 16,
        }
    }

    fn generator(decay: f32, radius: usize) -> MaskGenerator {
        MaskGenerator::from_config(
            &DenoiseConfig {
                smoothing_decay: decay,
                spectral_radius: radius,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_gains_bounded() {
        let gate = generator(0.6, 2);
        let profile = profile(1.0, 0.5, 8);
        let magnitudes = vec![
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 5.0, 100.0, 0.1],
            vec![3.0, 0.0, 0.2, 9.0, 1.2, 1.7, 0.4, 2.2],
        ];

        let masks = gate.compute(&magnitudes, &profile);
        for mask in &masks {
            for &g in mask {
                assert!((0.02..=1.0).contains(&g), "gain {g} out of bounds");
            }
        }
    }

    #[test]
    fn test_voiced_bin_passes_and_quiet_bin_gates() {
        let gate = generator(0.0, 0);
        let profile = profile(1.0, 0.5, 3);

        // Threshold is floor + 1.5 * 0.5 = 1.75
        let masks = gate.compute(&[vec![10.0, 0.5, 1.75]], &profile);
        assert_abs_diff_eq!(masks[0][0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(masks[0][1], 0.02, epsilon = 1e-6);
        assert_abs_diff_eq!(masks[0][2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ramp_is_monotonic() {
        let gate = generator(0.0, 0);
        let profile = profile(1.0, 1.0, 1);

        let mut last = 0.0;
        for step in 0..=10 {
            let mag = 1.0 + 1.5 * step as f32 / 10.0;
            let masks = gate.compute(&[vec![mag]], &profile);
            assert!(masks[0][0] >= last);
            last = masks[0][0];
        }
        assert_abs_diff_eq!(last, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_silent_profile_no_nan() {
        let gate = generator(0.0, 2);
        let profile = profile(0.0, 0.0, 4);

        let masks = gate.compute(&[vec![0.0; 4], vec![1.0; 4]], &profile);
        for mask in &masks {
            assert!(mask.iter().all(|g| g.is_finite()));
        }
        // Zero magnitude sits at the zero floor: gated
        assert_abs_diff_eq!(masks[0][0], 0.02, epsilon = 1e-2);
    }

    #[test]
    fn test_temporal_smoothing_blends_with_previous_frame() {
        let gate = generator(0.5, 0);
        let profile = profile(1.0, 0.5, 1);

        // Both frames fully voiced except the second, which drops below floor
        let masks = gate.compute(&[vec![10.0], vec![0.0]], &profile);

        // Frame 0: 0.5 * 1.0 (initial) + 0.5 * 1.0 = 1.0
        assert_abs_diff_eq!(masks[0][0], 1.0, epsilon = 1e-6);
        // Frame 1: 0.5 * 1.0 + 0.5 * 0.02 = 0.51, not an instant drop
        assert_abs_diff_eq!(masks[1][0], 0.51, epsilon = 1e-4);
    }

    #[test]
    fn test_spectral_smoothing_averages_isolated_bin() {
        let gate = generator(0.0, 1);
        let profile = profile(1.0, 0.5, 5);

        // Middle bin voiced, neighbors gated
        let masks = gate.compute(&[vec![0.0, 0.0, 10.0, 0.0, 0.0]], &profile);

        // Isolated pass is pulled down by gated neighbors
        assert!(masks[0][2] < 1.0);
        // And bleeds into them
        assert!(masks[0][1] > 0.02);
        assert!(masks[0][3] > 0.02);
    }
}
