//! quell-core: Shared types and utilities for Quell
//!
//! This crate provides the foundational audio types used across the Quell
//! workspace: the sample alias, the PCM buffer, and level conversions.

mod buffer;
mod level;

pub use buffer::*;
pub use level::*;

/// Type alias for audio samples (f32, matching the engine's FFT precision)
pub type Sample = f32;
