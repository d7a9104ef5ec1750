//! Segment extraction and envelope normalization
//!
//! Analysis segments are runs of [`SEGMENT_LENGTH`] consecutive frames,
//! one per valid start index, so adjacent segments overlap by all but one
//! frame. Segments are transient: each (segment, band) pair of envelope
//! vectors is normalized, clipped and correlated in place, never stored.

use crate::config::{BETA_DB, SEGMENT_LENGTH};

/// Number of valid segment start indices for an envelope of `num_frames`
/// frames (zero when fewer than [`SEGMENT_LENGTH`] frames exist)
pub fn num_segments(num_frames: usize) -> usize {
    num_frames.saturating_sub(SEGMENT_LENGTH - 1)
}

/// One band's length-[`SEGMENT_LENGTH`] slice of an envelope, starting at
/// frame `start`
pub fn band_segment(envelope: &[Vec<f64>], band: usize, start: usize) -> &[f64] {
    &envelope[band][start..start + SEGMENT_LENGTH]
}

/// Scale factor that gives the degraded segment the clean segment's power:
/// the ratio of L2 norms, with the denominator guarded by machine epsilon
/// so an all-zero degraded segment yields a large-but-finite factor
pub fn normalization_factor(clean: &[f64], degraded: &[f64]) -> f64 {
    l2_norm(clean) / (l2_norm(degraded) + f64::EPSILON)
}

/// Envelope ceiling multiplier, `1 + 10^(-BETA_DB / 20)`.
///
/// Degraded energy above this multiple of the clean envelope no longer
/// helps intelligibility and is clipped away.
pub fn clip_ceiling() -> f64 {
    1.0 + 10f64.powf(-BETA_DB / 20.0)
}

/// Rescale `degraded` to `clean`'s power, then clip each element from
/// above at [`clip_ceiling`] times the corresponding clean element
pub fn normalize_and_clip(clean: &[f64], degraded: &[f64]) -> Vec<f64> {
    let factor = normalization_factor(clean, degraded);
    let ceiling = clip_ceiling();
    clean
        .iter()
        .zip(degraded)
        .map(|(&c, &d)| (d * factor).min(c * ceiling))
        .collect()
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_segments() {
        assert_eq!(num_segments(SEGMENT_LENGTH), 1);
        assert_eq!(num_segments(SEGMENT_LENGTH + 5), 6);
        assert_eq!(num_segments(SEGMENT_LENGTH - 1), 0);
        assert_eq!(num_segments(0), 0);
    }

    #[test]
    fn test_clip_ceiling_value() {
        // Beta = -15 dB: 1 + 10^(15/20) ~= 6.6234
        assert!((clip_ceiling() - 6.623_413_251_903_491).abs() < 1e-12);
    }

    #[test]
    fn test_normalization_matches_power() {
        let clean = vec![1.0, 2.0, 3.0];
        let degraded = vec![0.5, 1.0, 1.5];
        let factor = normalization_factor(&clean, &degraded);
        assert!((factor - 2.0).abs() < 1e-12);

        // After scaling the norms agree
        let scaled: Vec<f64> = degraded.iter().map(|&d| d * factor).collect();
        assert!((l2_norm(&scaled) - l2_norm(&clean)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_degraded_segment_is_finite() {
        let clean = vec![1.0, 1.0, 1.0];
        let degraded = vec![0.0, 0.0, 0.0];
        let factor = normalization_factor(&clean, &degraded);
        assert!(factor.is_finite());
        let clipped = normalize_and_clip(&clean, &degraded);
        assert!(clipped.iter().all(|v| v.is_finite()));
        // Zero stays zero regardless of the factor
        assert_eq!(clipped, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clipping_bounds_loud_degraded() {
        // The last element is loud where the clean envelope is nearly
        // silent, so rescaling alone cannot bound it
        let clean = vec![1.0, 1.0, 1.0, 0.001];
        let degraded = vec![0.1, 0.1, 0.1, 10.0];
        let clipped = normalize_and_clip(&clean, &degraded);
        let ceiling = clip_ceiling();
        for (&v, &c) in clipped.iter().zip(&clean) {
            assert!(v <= c * ceiling + 1e-12);
        }
        assert!((clipped[3] - 0.001 * ceiling).abs() < 1e-12);
    }

    #[test]
    fn test_identical_segments_are_untouched() {
        let clean = vec![0.3, 0.7, 1.1, 0.9];
        let clipped = normalize_and_clip(&clean, &clean);
        for (&out, &orig) in clipped.iter().zip(&clean) {
            assert!((out - orig).abs() < 1e-12);
        }
    }

    #[test]
    fn test_band_segment_slicing() {
        let envelope: Vec<Vec<f64>> = (0..3)
            .map(|b| (0..40).map(|t| (b * 100 + t) as f64).collect())
            .collect();
        let seg = band_segment(&envelope, 1, 5);
        assert_eq!(seg.len(), SEGMENT_LENGTH);
        assert_eq!(seg[0], 105.0);
        assert_eq!(seg[SEGMENT_LENGTH - 1], 105.0 + (SEGMENT_LENGTH - 1) as f64);
    }
}
