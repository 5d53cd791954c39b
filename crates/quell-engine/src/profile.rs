//! Noise profile estimation
//!
//! A profile summarizes the background noise per frequency bin as a floor
//! magnitude and a deviation around it. Two estimation modes:
//! - explicit: mean and standard deviation over caller-marked noise frames
//! - whole-signal: a low magnitude percentile across all padding-free
//!   frames pins the background level in each bin

use crate::config::NoiseEstimation;
use crate::error::{EngineError, EngineResult};
use crate::frame::FrameLayout;

/// Per-bin statistical summary of the background noise
#[derive(Debug, Clone)]
pub struct NoiseProfile {
    /// Estimated floor magnitude per bin
    pub floor: Vec<f32>,
    /// Estimated deviation of noise magnitude per bin
    pub deviation: Vec<f32>,
    /// Number of frames the estimate was drawn from
    pub frame_count: usize,
}

impl NoiseProfile {
    /// Number of frequency bins
    pub fn bins(&self) -> usize {
        self.floor.len()
    }

    /// Estimate a profile from per-frame magnitude spectra
    ///
    /// `magnitudes` holds one magnitude vector per frame, all of equal
    /// length. Populations of fewer than two frames yield a zero profile so
    /// degenerate inputs gate conservatively instead of dividing by zero.
    pub fn estimate(
        magnitudes: &[Vec<f32>],
        layout: &FrameLayout,
        mode: &NoiseEstimation,
        percentile: f32,
    ) -> EngineResult<Self> {
        let bins = magnitudes.first().map_or(0, Vec::len);

        match mode {
            NoiseEstimation::Frames { start, end } => {
                if *start >= *end || *end > magnitudes.len() {
                    return Err(EngineError::NoiseSegmentOutOfRange {
                        start: *start,
                        end: *end,
                        frames: magnitudes.len(),
                    });
                }
                Ok(Self::from_marked_frames(&magnitudes[*start..*end], bins))
            }
            NoiseEstimation::WholeSignal => {
                let range = layout.interior_frames();
                Ok(Self::from_percentile(&magnitudes[range], bins, percentile))
            }
        }
    }

    /// Per-bin mean and standard deviation over noise-only frames
    ///
    /// Welford running statistics, single pass.
    fn from_marked_frames(frames: &[Vec<f32>], bins: usize) -> Self {
        let count = frames.len();
        if count < 2 {
            return Self::zero(bins, count);
        }

        let mut mean = vec![0.0f32; bins];
        let mut m2 = vec![0.0f32; bins];

        for (n, frame) in frames.iter().enumerate() {
            for (b, &mag) in frame.iter().enumerate() {
                let delta = mag - mean[b];
                mean[b] += delta / (n + 1) as f32;
                let delta2 = mag - mean[b];
                m2[b] += delta * delta2;
            }
        }

        let deviation = m2
            .iter()
            .map(|&v| (v / (count - 1) as f32).sqrt())
            .collect();

        Self {
            floor: mean,
            deviation,
            frame_count: count,
        }
    }

    /// Per-bin floor from a low magnitude percentile
    ///
    /// Magnitudes of complex-Gaussian background noise are Rayleigh
    /// distributed, so the chosen quantile pins the per-bin Rayleigh scale;
    /// floor and deviation are that distribution's mean and standard
    /// deviation. Foreground content above the percentile cannot inflate
    /// the estimate.
    fn from_percentile(frames: &[Vec<f32>], bins: usize, percentile: f32) -> Self {
        let count = frames.len();
        if count < 2 {
            return Self::zero(bins, count);
        }

        let quantile_to_scale = 1.0 / (-2.0 * (1.0 - percentile).ln()).sqrt();
        let mean_factor = (std::f32::consts::PI / 2.0).sqrt();
        let std_factor = (2.0 - std::f32::consts::PI / 2.0).sqrt();

        let mut floor = vec![0.0f32; bins];
        let mut deviation = vec![0.0f32; bins];
        let mut column = vec![0.0f32; count];

        let k = (percentile * (count - 1) as f32).floor() as usize;

        for b in 0..bins {
            for (t, frame) in frames.iter().enumerate() {
                column[t] = frame[b];
            }
            column.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let scale = column[k] * quantile_to_scale;
            floor[b] = scale * mean_factor;
            deviation[b] = scale * std_factor;
        }

        Self {
            floor,
            deviation,
            frame_count: count,
        }
    }

    fn zero(bins: usize, frame_count: usize) -> Self {
        Self {
            floor: vec![0.0; bins],
            deviation: vec![0.0; bins],
            frame_count,
        }
    }
}
