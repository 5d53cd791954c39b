//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Denoise configuration
///
/// All gate tunables are exposed here; the engine reads nothing from
/// ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenoiseConfig {
    /// Analysis frame length in samples
    pub frame_length: usize,
    /// Hop between consecutive frames in samples (must not exceed frame_length)
    pub hop_length: usize,
    /// Gate threshold in noise-floor deviations above the floor
    pub sensitivity: f32,
    /// Temporal mask smoothing factor in [0, 1); 0 disables smoothing
    pub smoothing_decay: f32,
    /// Spectral smoothing radius in bins; 0 disables smoothing
    pub spectral_radius: usize,
    /// Minimum mask gain (> 0 so gated bins are attenuated, never silenced)
    pub gain_floor: f32,
    /// Magnitude percentile used for the whole-signal noise floor, in (0, 1)
    pub noise_percentile: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            frame_length: 1024,
            hop_length: 256,
            sensitivity: 1.5,
            smoothing_decay: 0.6,
            spectral_radius: 2,
            gain_floor: 0.02,
            noise_percentile: 0.10,
        }
    }
}

impl DenoiseConfig {
    /// Set frame length
    pub fn with_frame_length(mut self, frame_length: usize) -> Self {
        self.frame_length = frame_length;
        self
    }

    /// Set hop length
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    /// Set gate sensitivity
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set temporal smoothing decay
    pub fn with_smoothing_decay(mut self, decay: f32) -> Self {
        self.smoothing_decay = decay;
        self
    }

    /// Set minimum mask gain
    pub fn with_gain_floor(mut self, floor: f32) -> Self {
        self.gain_floor = floor;
        self
    }

    /// Number of frequency bins per spectrum
    pub fn bins(&self) -> usize {
        self.frame_length / 2 + 1
    }

    /// Validate parameter bounds
    ///
    /// Called once before any transform work; a rejected config fails the
    /// whole call.
    pub fn validate(&self) -> EngineResult<()> {
        if self.frame_length == 0 {
            return Err(EngineError::InvalidConfig(
                "frame_length must be greater than zero".into(),
            ));
        }
        if self.hop_length == 0 {
            return Err(EngineError::InvalidConfig(
                "hop_length must be greater than zero".into(),
            ));
        }
        if self.hop_length > self.frame_length {
            return Err(EngineError::InvalidConfig(format!(
                "hop_length {} exceeds frame_length {}",
                self.hop_length, self.frame_length
            )));
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "sensitivity must be finite and non-negative, got {}",
                self.sensitivity
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_decay) {
            return Err(EngineError::InvalidConfig(format!(
                "smoothing_decay must be in [0, 1), got {}",
                self.smoothing_decay
            )));
        }
        if !(self.gain_floor > 0.0 && self.gain_floor <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "gain_floor must be in (0, 1], got {}",
                self.gain_floor
            )));
        }
        if !(self.noise_percentile > 0.0 && self.noise_percentile < 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "noise_percentile must be in (0, 1), got {}",
                self.noise_percentile
            )));
        }
        Ok(())
    }
}

/// Noise profile estimation mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseEstimation {
    /// Derive the floor from a low magnitude percentile over the whole signal
    WholeSignal,
    /// Derive the floor from a contiguous range of noise-only frames
    Frames { start: usize, end: usize },
}

impl Default for NoiseEstimation {
    fn default() -> Self {
        Self::WholeSignal
    }
}

impl NoiseEstimation {
    /// Mark the frames fully covered by a sample range as noise-only
    ///
    /// Callers usually address time in samples; frames are the engine's
    /// unit. Returns `WholeSignal` when the range covers no complete frame.
    pub fn from_sample_range(
        config: &DenoiseConfig,
        start_sample: usize,
        end_sample: usize,
    ) -> Self {
        if end_sample <= start_sample {
            return Self::WholeSignal;
        }

        // Frame k covers original samples [k*hop - frame_length, k*hop):
        // the analysis layout prepends frame_length zeros so early frames
        // straddle the signal start.
        let start = (start_sample + config.frame_length).div_ceil(config.hop_length);
        let end = end_sample / config.hop_length + 1;

        if end > start {
            Self::Frames { start, end }
        } else {
            Self::WholeSignal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DenoiseConfig::default();
        assert_eq!(config.frame_length, 1024);
        assert_eq!(config.hop_length, 256);
        assert_eq!(config.bins(), 513);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_frame_length_rejected() {
        let config = DenoiseConfig::default().with_frame_length(0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_hop_rejected() {
        let config = DenoiseConfig::default().with_hop_length(0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_hop_exceeding_frame_rejected() {
        let config = DenoiseConfig::default()
            .with_frame_length(512)
            .with_hop_length(1024);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_gain_floor_bounds() {
        assert!(DenoiseConfig::default().with_gain_floor(0.0).validate().is_err());
        assert!(DenoiseConfig::default().with_gain_floor(1.5).validate().is_err());
        assert!(DenoiseConfig::default().with_gain_floor(0.05).validate().is_ok());
    }

    #[test]
    fn test_percentile_bounds() {
        let mut config = DenoiseConfig::default();
        config.noise_percentile = 1.2;
        assert!(config.validate().is_err());
        config.noise_percentile = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_sample_range() {
        let config = DenoiseConfig::default(); // 1024 / 256

        // 8000 samples of leading noise: the first frame fully inside the
        // range starts once the analysis padding is cleared
        let mode = NoiseEstimation::from_sample_range(&config, 0, 8000);
        assert_eq!(mode, NoiseEstimation::Frames { start: 4, end: 32 });

        // A range shorter than one frame falls back to whole-signal
        let mode = NoiseEstimation::from_sample_range(&config, 100, 400);
        assert_eq!(mode, NoiseEstimation::WholeSignal);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = DenoiseConfig::default().with_sensitivity(2.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: DenoiseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frame_length, config.frame_length);
        assert_eq!(back.sensitivity, config.sensitivity);
    }
}
