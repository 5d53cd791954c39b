//! Error types for the denoising engine

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Empty input signal
    #[error("Empty input signal")]
    EmptySignal,

    /// Invalid sample rate
    #[error("Unsupported sample rate: {0}")]
    UnsupportedSampleRate(u32),

    /// Explicit noise segment outside the framed signal
    #[error("Noise segment frames {start}..{end} out of range (signal has {frames} frames)")]
    NoiseSegmentOutOfRange {
        start: usize,
        end: usize,
        frames: usize,
    },
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
