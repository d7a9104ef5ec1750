//! Framing and magnitude spectra
//!
//! Slices a signal into 50%-overlapping Hann-windowed frames, zero-pads
//! them to the transform size and keeps the squared magnitude of the
//! one-sided spectrum. Only magnitudes propagate downstream; no inverse
//! transform exists anywhere in the pipeline.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::config::{FFT_BINS, FFT_LENGTH, FRAME_LENGTH, HOP_LENGTH};

/// Symmetric Hann window of the given length with the zero endpoints
/// trimmed off: element `i` of `hann(len + 2)` for `i` in `1..=len`.
pub(crate) fn hann_window(len: usize) -> Vec<f64> {
    let m = (len + 1) as f64;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * (i + 1) as f64 / m).cos()))
        .collect()
}

/// Squared-magnitude spectra of the overlapping frames of `x`.
///
/// Frames start at sample 0 and advance by [`HOP_LENGTH`]; a frame whose
/// start lands exactly on `len - FRAME_LENGTH` is not produced, so a signal
/// of `n` whole hops yields `n - 1` frames. Each frame is Hann-windowed,
/// zero-padded to [`FFT_LENGTH`] and transformed; bins 0 through Nyquist
/// are kept as `re^2 + im^2`.
pub fn power_spectra(x: &[f64]) -> Vec<Vec<f64>> {
    let w = hann_window(FRAME_LENGTH);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(FFT_LENGTH);
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let mut buf = vec![Complex::new(0.0, 0.0); FFT_LENGTH];

    let usable = x.len().saturating_sub(FRAME_LENGTH);
    let mut spectra = Vec::with_capacity(usable / HOP_LENGTH + 1);

    for start in (0..usable).step_by(HOP_LENGTH) {
        for (k, c) in buf.iter_mut().enumerate() {
            *c = if k < FRAME_LENGTH {
                Complex::new(x[start + k] * w[k], 0.0)
            } else {
                Complex::new(0.0, 0.0)
            };
        }
        fft.process_with_scratch(&mut buf, &mut scratch);
        spectra.push(
            buf[..FFT_BINS]
                .iter()
                .map(|c| c.re * c.re + c.im * c.im)
                .collect(),
        );
    }

    log::debug!("STFT: {} frames from {} samples", spectra.len(), x.len());
    spectra
}
