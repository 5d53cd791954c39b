//! Analysis/synthesis window generation

/// Generate a periodic Hann window of the given length
pub fn hann(length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / length as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hann_endpoints_and_midpoint() {
        let w = hann(1024);
        assert_eq!(w.len(), 1024);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(w[512], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hann_symmetry() {
        // Periodic Hann: w[i] == w[len - i] for interior points
        let w = hann(256);
        for i in 1..128 {
            assert_abs_diff_eq!(w[i], w[256 - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hann_bounded() {
        let w = hann(511);
        assert!(w.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
