//! Correlation-based score aggregation
//!
//! Two interchangeable strategies over the same band envelopes:
//!
//! - **Standard**: per (segment, band), the degraded envelope vector is
//!   power-matched to the clean one and clipped, then correlated with it
//!   over time. The score is the mean correlation over all segments and
//!   bands.
//! - **Extended**: per segment, both envelopes are mean/variance
//!   normalized along time and then along bands, and the normalized
//!   matrices are correlated element-wise. Better behaved under
//!   non-linear processing such as ideal binary masking.
//!
//! Zero-variance vectors contribute a correlation of 0: every norm in a
//! denominator is guarded with machine epsilon, so degenerate
//! (segment, band) cells never poison the aggregate and nothing here can
//! return NaN for finite input.

use crate::analysis::segments::{band_segment, normalize_and_clip, num_segments};
use crate::config::SEGMENT_LENGTH;

/// Standard STOI aggregation over a pair of band envelopes indexed
/// `[band][frame]`.
///
/// Envelopes must hold at least [`SEGMENT_LENGTH`] frames; the pipeline
/// driver guarantees this.
pub fn standard_score(clean: &[Vec<f64>], degraded: &[Vec<f64>]) -> f64 {
    let bands = clean.len();
    let segments = num_segments(clean[0].len());

    let mut total = 0.0;
    for start in 0..segments {
        for band in 0..bands {
            let x = band_segment(clean, band, start);
            let y = band_segment(degraded, band, start);
            let y_prime = normalize_and_clip(x, y);
            total += centered_correlation(x, &y_prime);
        }
    }

    total / (segments * bands) as f64
}

/// Extended (ESTOI) aggregation over a pair of band envelopes indexed
/// `[band][frame]`.
///
/// No power matching or clipping is applied; each segment is mean/variance
/// normalized along its time rows, then along its band columns, and the
/// element-wise product is accumulated over all segments.
pub fn extended_score(clean: &[Vec<f64>], degraded: &[Vec<f64>]) -> f64 {
    let bands = clean.len();
    let segments = num_segments(clean[0].len());

    let mut total = 0.0;
    for start in 0..segments {
        let mut x_seg: Vec<Vec<f64>> = (0..bands)
            .map(|b| band_segment(clean, b, start).to_vec())
            .collect();
        let mut y_seg: Vec<Vec<f64>> = (0..bands)
            .map(|b| band_segment(degraded, b, start).to_vec())
            .collect();

        row_col_normalize(&mut x_seg);
        row_col_normalize(&mut y_seg);

        for (x_row, y_row) in x_seg.iter().zip(&y_seg) {
            for (&x, &y) in x_row.iter().zip(y_row) {
                total += x * y;
            }
        }
    }

    total / (SEGMENT_LENGTH * segments) as f64
}

/// Correlation of two vectors after removing their means, with each
/// centered vector's norm guarded by machine epsilon (zero-variance
/// vectors therefore correlate to 0)
fn centered_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut dot = 0.0;
    let mut x_sq = 0.0;
    let mut y_sq = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xc = xi - x_mean;
        let yc = yi - y_mean;
        dot += xc * yc;
        x_sq += xc * xc;
        y_sq += yc * yc;
    }

    dot / ((x_sq.sqrt() + f64::EPSILON) * (y_sq.sqrt() + f64::EPSILON))
}

/// Mean/variance normalize each time row, then each band column, of one
/// segment matrix indexed `[band][time]`
fn row_col_normalize(segment: &mut [Vec<f64>]) {
    for row in segment.iter_mut() {
        mean_variance_normalize(row);
    }

    let bands = segment.len();
    let frames = segment[0].len();
    let mut column = vec![0.0; bands];
    for t in 0..frames {
        for b in 0..bands {
            column[b] = segment[b][t];
        }
        mean_variance_normalize(&mut column);
        for b in 0..bands {
            segment[b][t] = column[b];
        }
    }
}

/// Subtract the mean and divide by the L2 norm (plus machine epsilon)
fn mean_variance_normalize(v: &mut [f64]) {
    let mean = v.iter().sum::<f64>() / v.len() as f64;
    for x in v.iter_mut() {
        *x -= mean;
    }
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt() + f64::EPSILON;
    for x in v.iter_mut() {
        *x /= norm;
    }
}
