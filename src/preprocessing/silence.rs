//! Energy-based removal of silent frames
//!
//! The measure is calibrated on speech-active regions only; leading,
//! trailing and internal silence biases the correlation step. Both signals
//! are framed in lockstep, frames whose clean-signal energy falls more than
//! [`DYNAMIC_RANGE_DB`] below the loudest frame are dropped from both, and
//! the survivors are overlap-added back into a pair of shorter signals.

use crate::config::{DYNAMIC_RANGE_DB, FRAME_LENGTH, HOP_LENGTH};
use crate::error::IntelligibilityError;
use crate::features::stft::hann_window;

/// Remove frames that are silent in the clean signal from both signals.
///
/// Frames are `FRAME_LENGTH` samples long with a `HOP_LENGTH` hop, windowed
/// by the trimmed Hann window. Frame energy is `20*log10(||w*frame|| + eps)`
/// of the windowed clean frame; a frame survives when its energy is strictly
/// within [`DYNAMIC_RANGE_DB`] of the maximum. Surviving windowed frames are
/// overlap-added at consecutive hop positions, splicing them back-to-back
/// even when the kept set is non-contiguous in the input.
///
/// # Errors
///
/// Returns `InsufficientVoiceActivity` when the signals are too short to
/// hold a single full frame.
pub fn remove_silent_frames(
    x: &[f64],
    y: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), IntelligibilityError> {
    let usable = x.len().saturating_sub(FRAME_LENGTH);
    if usable == 0 {
        return Err(IntelligibilityError::InsufficientVoiceActivity);
    }

    let w = hann_window(FRAME_LENGTH);

    // Clean-frame energies in dB
    let starts: Vec<usize> = (0..usable).step_by(HOP_LENGTH).collect();
    let mut energies = Vec::with_capacity(starts.len());
    for &start in &starts {
        let norm: f64 = x[start..start + FRAME_LENGTH]
            .iter()
            .zip(&w)
            .map(|(&s, &wv)| (s * wv) * (s * wv))
            .sum::<f64>()
            .sqrt();
        energies.push(20.0 * (norm + f64::EPSILON).log10());
    }

    let max_energy = energies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let threshold = max_energy - DYNAMIC_RANGE_DB;

    let kept: Vec<usize> = energies
        .iter()
        .enumerate()
        .filter(|&(_, &e)| e > threshold)
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "Silence removal: kept {} of {} frames (threshold {:.1} dB)",
        kept.len(),
        starts.len(),
        threshold
    );

    // Overlap-add the kept windowed frames
    let n_sil = (kept.len() - 1) * HOP_LENGTH + FRAME_LENGTH;
    let mut x_sil = vec![0.0; n_sil];
    let mut y_sil = vec![0.0; n_sil];
    for (j, &frame) in kept.iter().enumerate() {
        let src = starts[frame];
        let dst = j * HOP_LENGTH;
        for k in 0..FRAME_LENGTH {
            x_sil[dst + k] += x[src + k] * w[k];
            y_sil[dst + k] += y[src + k] * w[k];
        }
    }

    Ok((x_sil, y_sil))
}
