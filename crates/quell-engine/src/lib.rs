//! Quell spectral-gating noise suppression engine
//!
//! Offline denoising of a recorded buffer:
//!
//! ## Noise profile
//! - Whole-signal estimation from a low magnitude percentile per bin
//! - Explicit estimation from caller-marked noise-only frames
//!
//! ## Spectral gate
//! - Soft per-bin gating against the profiled noise floor
//! - Temporal and spectral mask smoothing against musical noise
//! - Configurable minimum gain, never full silence injection
//!
//! ## Reconstruction
//! - Windowed overlap-add with squared-window envelope normalization
//! - Output length always equals input length
//!
//! The engine is a pure function of its inputs: a [`Denoiser`] holds only
//! validated configuration and FFT plans, so one value may serve concurrent
//! calls without locking. Frame analysis, masking and synthesis parallelize
//! across frames; overlap-add accumulation is the single serial join.

#![warn(missing_docs)]

pub mod config;
pub mod frame;
pub mod mask;
pub mod profile;
pub mod reconstruct;
pub mod stft;
pub mod window;

mod error;

pub use config::{DenoiseConfig, NoiseEstimation};
pub use error::{EngineError, EngineResult};
pub use profile::NoiseProfile;

use quell_core::AudioBuffer;
use rayon::prelude::*;

use crate::frame::FrameLayout;
use crate::mask::MaskGenerator;
use crate::reconstruct::overlap_add;
use crate::stft::Stft;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pipeline stages, in processing order
///
/// The pipeline only moves forward; a failing stage aborts the call and no
/// partial output escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Slicing the signal into overlapping windowed frames
    Framing,
    /// Forward spectral transform of every frame
    Transforming,
    /// Noise profile estimation
    ProfileEstimation,
    /// Gate mask computation
    Masking,
    /// Inverse transform and overlap-add
    Reconstructing,
    /// Output ready
    Done,
}

/// Spectral-gating denoiser
///
/// Holds validated configuration and the FFT plan pair. Stateless across
/// calls; construct once and reuse freely, including from multiple threads.
pub struct Denoiser {
    config: DenoiseConfig,
    stft: Stft,
}

impl Denoiser {
    /// Create a denoiser, validating the configuration up front
    pub fn new(config: DenoiseConfig) -> EngineResult<Self> {
        config.validate()?;
        let stft = Stft::new(config.frame_length);
        Ok(Self { config, stft })
    }

    /// Active configuration
    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Denoise with whole-signal noise estimation
    pub fn process(&self, input: &AudioBuffer) -> EngineResult<AudioBuffer> {
        self.process_with(input, &NoiseEstimation::WholeSignal)
    }

    /// Denoise with an explicit noise estimation mode
    ///
    /// Multi-channel input is averaged down to mono before processing; the
    /// output is always mono at the input's sample rate, sample count equal
    /// to the input's per-channel count.
    pub fn process_with(
        &self,
        input: &AudioBuffer,
        noise: &NoiseEstimation,
    ) -> EngineResult<AudioBuffer> {
        if input.sample_rate == 0 {
            return Err(EngineError::UnsupportedSampleRate(input.sample_rate));
        }
        if input.is_empty() || input.channels == 0 {
            return Err(EngineError::EmptySignal);
        }

        let mono;
        let signal: &[f32] = if input.channels == 1 {
            &input.samples
        } else {
            mono = input.to_mono();
            &mono.samples
        };

        log::debug!(
            "{:?}: {} samples at {} Hz, frame {} hop {}",
            PipelineStage::Framing,
            signal.len(),
            input.sample_rate,
            self.config.frame_length,
            self.config.hop_length
        );
        let layout = FrameLayout::new(signal.len(), self.config.frame_length, self.config.hop_length);

        log::debug!("{:?}: {} frames", PipelineStage::Transforming, layout.num_frames);
        let spectra = self.stft.analyze(signal, &layout);
        let magnitudes: Vec<Vec<f32>> = spectra
            .par_iter()
            .map(|spectrum| spectrum.iter().map(|c| c.norm()).collect())
            .collect();

        log::debug!("{:?}: mode {:?}", PipelineStage::ProfileEstimation, noise);
        let profile = NoiseProfile::estimate(
            &magnitudes,
            &layout,
            noise,
            self.config.noise_percentile,
        )?;

        let mean_floor = profile.floor.iter().sum::<f32>() / profile.bins().max(1) as f32;
        log::debug!(
            "{:?}: {} bins over {} frames, mean floor {:.1} dB",
            PipelineStage::Masking,
            profile.bins(),
            profile.frame_count,
            quell_core::linear_to_db(mean_floor)
        );
        let masks = MaskGenerator::from_config(&self.config).compute(&magnitudes, &profile);

        log::debug!("{:?}", PipelineStage::Reconstructing);
        let samples = overlap_add(&self.stft, &layout, spectra, &masks);

        log::debug!("{:?}: {} samples", PipelineStage::Done, samples.len());
        Ok(AudioBuffer::mono(samples, input.sample_rate))
    }
}

/// Denoise a buffer with the default configuration
pub fn denoise(input: &AudioBuffer) -> EngineResult<AudioBuffer> {
    Denoiser::new(DenoiseConfig::default())?.process(input)
}
