//! Overlap-add reconstruction
//!
//! Applies the gate mask, inverse-transforms each frame, windows it again
//! for synthesis and overlap-adds into the padded output. Dividing by the
//! accumulated squared-window envelope undoes the analysis/synthesis
//! windowing exactly, so an all-pass mask reproduces the input.

use rayon::prelude::*;

use crate::frame::FrameLayout;
use crate::stft::{Spectrum, Stft};

// Envelope floor substituted where window overlap carries no energy.
const ENVELOPE_EPS: f32 = 1e-8;

/// Apply masks and overlap-add the spectra back into a time-domain signal
///
/// Consumes the spectra (the inverse transform scratches them). Returns
/// exactly `layout.signal_len` samples.
pub fn overlap_add(
    stft: &Stft,
    layout: &FrameLayout,
    mut spectra: Vec<Spectrum>,
    masks: &[Vec<f32>],
) -> Vec<f32> {
    let frame_length = layout.frame_length;
    let window = stft.window();

    // Frame-independent synthesis fans out; accumulation below is the
    // single serial merge point.
    let frames: Vec<Vec<f32>> = spectra
        .par_iter_mut()
        .zip(masks.par_iter())
        .map(|(spectrum, mask)| {
            for (bin, &gain) in spectrum.iter_mut().zip(mask.iter()) {
                *bin = *bin * gain;
            }

            let mut frame = vec![0.0f32; frame_length];
            stft.inverse_frame(spectrum, &mut frame);
            for (sample, &w) in frame.iter_mut().zip(window.iter()) {
                *sample *= w;
            }
            frame
        })
        .collect();

    let mut output = vec![0.0f32; layout.padded_len];
    let mut envelope = vec![0.0f32; layout.padded_len];

    for (index, frame) in frames.iter().enumerate() {
        let start = layout.frame_start(index);
        for (i, &sample) in frame.iter().enumerate() {
            output[start + i] += sample;
            envelope[start + i] += window[i] * window[i];
        }
    }

    let begin = layout.lead_pad;
    let end = begin + layout.signal_len;
    let mut starved = 0usize;

    let result: Vec<f32> = output[begin..end]
        .iter()
        .zip(&envelope[begin..end])
        .map(|(&sample, &env)| {
            if env <= ENVELOPE_EPS {
                starved += 1;
            }
            sample / env.max(ENVELOPE_EPS)
        })
        .collect();

    if starved > 0 {
        log::warn!(
            "window envelope below {ENVELOPE_EPS:e} at {starved} of {} samples",
            layout.signal_len
        );
    }

    result
}
