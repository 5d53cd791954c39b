//! Frame layout and windowed frame extraction
//!
//! The signal is sliced into overlapping frames on a hop grid. The layout
//! prepends `frame_length` zeros and appends zeros up to a whole number of
//! hops so every original sample is covered by the full set of overlapping
//! windows; reconstruction trims the padding back off.

use quell_core::Sample;

/// Frame geometry for one analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Frame length in samples
    pub frame_length: usize,
    /// Hop between consecutive frame starts
    pub hop_length: usize,
    /// Original signal length in samples
    pub signal_len: usize,
    /// Number of frames covering the padded signal
    pub num_frames: usize,
    /// Leading zero padding (equals frame_length)
    pub lead_pad: usize,
    /// Padded signal length
    pub padded_len: usize,
}

impl FrameLayout {
    /// Compute the layout for a non-empty signal
    ///
    /// Sizing constraints are enforced by `DenoiseConfig::validate` before
    /// any layout is built.
    pub fn new(signal_len: usize, frame_length: usize, hop_length: usize) -> Self {
        debug_assert!(signal_len > 0);
        debug_assert!(frame_length > 0);
        debug_assert!(hop_length > 0 && hop_length <= frame_length);

        let num_frames = signal_len.div_ceil(hop_length) + 1;
        let padded_len = (num_frames - 1) * hop_length + frame_length;

        Self {
            frame_length,
            hop_length,
            signal_len,
            num_frames,
            lead_pad: frame_length,
            padded_len,
        }
    }

    /// Start of frame `index` in padded coordinates
    #[inline]
    pub fn frame_start(&self, index: usize) -> usize {
        index * self.hop_length
    }

    /// Frames lying entirely inside the original signal
    ///
    /// Falls back to the full frame range when the signal is shorter than
    /// one frame, where no frame is padding-free.
    pub fn interior_frames(&self) -> std::ops::Range<usize> {
        let start = self.frame_length.div_ceil(self.hop_length);
        let end = self.signal_len / self.hop_length + 1;
        if end > start {
            start..end
        } else {
            0..self.num_frames
        }
    }

    /// Copy frame `index` into `out`, applying `window` elementwise
    ///
    /// Samples outside the original signal read as zero.
    pub fn extract_windowed(
        &self,
        signal: &[Sample],
        index: usize,
        window: &[Sample],
        out: &mut [Sample],
    ) {
        debug_assert_eq!(out.len(), self.frame_length);
        debug_assert_eq!(window.len(), self.frame_length);

        let start = self.frame_start(index);
        for (i, slot) in out.iter_mut().enumerate() {
            let padded_idx = start + i;
            let sample = if padded_idx >= self.lead_pad && padded_idx - self.lead_pad < self.signal_len
            {
                signal[padded_idx - self.lead_pad]
            } else {
                0.0
            };
            *slot = sample * window[i];
        }
    }
}
