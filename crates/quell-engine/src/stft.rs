//! Short-time spectral transform
//!
//! Thin wrapper over realfft's forward/inverse real-valued FFT pair. Plans
//! are built once and shared; per-frame buffers stay local to the calling
//! task so analysis parallelizes across frames.

use std::sync::Arc;

use rayon::prelude::*;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

use crate::frame::FrameLayout;
use crate::window::hann;

/// One frame's complex spectrum
pub type Spectrum = Vec<Complex<f32>>;

/// Forward/inverse transform pair for a fixed frame length
pub struct Stft {
    frame_length: usize,
    window: Vec<f32>,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl Stft {
    /// Create transform pair for the given frame length
    pub fn new(frame_length: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(frame_length);
        let inverse = planner.plan_fft_inverse(frame_length);

        Self {
            frame_length,
            window: hann(frame_length),
            forward,
            inverse,
        }
    }

    /// Frame length in samples
    #[inline]
    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Number of frequency bins per spectrum
    #[inline]
    pub fn bins(&self) -> usize {
        self.frame_length / 2 + 1
    }

    /// Analysis window shared with synthesis
    #[inline]
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Forward transform of one frame (contents are scratched)
    pub fn forward_frame(&self, frame: &mut [f32]) -> Spectrum {
        let mut spectrum = self.forward.make_output_vec();
        self.forward.process(frame, &mut spectrum).ok();
        spectrum
    }

    /// Inverse transform of one spectrum into a frame-length buffer
    ///
    /// realfft's inverse is unnormalized; output is scaled by 1/frame_length
    /// so `inverse_frame(forward_frame(x)) == x` up to rounding.
    pub fn inverse_frame(&self, spectrum: &mut [Complex<f32>], out: &mut [f32]) {
        // DC and Nyquist bins of a real signal's spectrum are purely real;
        // masking preserves that, but the inverse plan requires it exactly.
        if let Some(first) = spectrum.first_mut() {
            first.im = 0.0;
        }
        if self.frame_length % 2 == 0 {
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }
        }

        self.inverse.process(spectrum, out).ok();

        let norm = 1.0 / self.frame_length as f32;
        for sample in out.iter_mut() {
            *sample *= norm;
        }
    }

    /// Windowed forward analysis of every frame in the layout
    pub fn analyze(&self, signal: &[f32], layout: &FrameLayout) -> Vec<Spectrum> {
        (0..layout.num_frames)
            .into_par_iter()
            .map(|index| {
                let mut frame = vec![0.0f32; self.frame_length];
                layout.extract_windowed(signal, index, &self.window, &mut frame);
                self.forward_frame(&mut frame)
            })
            .collect()
    }
}
