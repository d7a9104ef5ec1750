//! # stoi
//!
//! Short-Time Objective Intelligibility (STOI) for Rust: a scalar measure
//! predicting how intelligible degraded speech is relative to a clean,
//! time-aligned reference.
//!
//! ## Features
//!
//! - **STOI**: per-band temporal correlation with power normalization and
//!   perceptual clipping
//! - **ESTOI**: the extended variant using spectral correlation, better
//!   suited to non-linearly processed speech
//! - Arbitrary input sample rates (resampled internally to 10 kHz)
//! - Energy-based silent-frame removal, as the measure is only calibrated
//!   on speech-active regions
//!
//! ## Quick Start
//!
//! ```
//! use stoi::stoi;
//!
//! // 3 seconds of amplitude-modulated tone standing in for speech
//! let clean: Vec<f64> = (0..30_000)
//!     .map(|i| {
//!         let t = i as f64 / 10_000.0;
//!         (2.0 * std::f64::consts::PI * 440.0 * t).sin()
//!             * (0.55 + 0.45 * (2.0 * std::f64::consts::PI * 4.0 * t).sin())
//!     })
//!     .collect();
//!
//! let score = stoi(&clean, &clean, 10_000, false)?;
//! assert!(score > 0.95);
//! # Ok::<(), stoi::IntelligibilityError>(())
//! ```
//!
//! ## Architecture
//!
//! The measure is a strictly sequential pipeline over the signal pair:
//!
//! ```text
//! Resample -> Remove silence -> STFT -> 1/3-octave bands -> Segments -> Correlate
//! ```
//!
//! Both signals always pass through identical framing, filterbank and
//! segment parameters; the silence mask is computed on the clean signal
//! and applied to both at matching frame positions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod preprocessing;

pub use analysis::result::{MeasureMetadata, Measurement};
pub use config::{MeasureConfig, Variant};
pub use error::IntelligibilityError;

use config::{FFT_LENGTH, FRAME_LENGTH, HOP_LENGTH, INTERNAL_SAMPLE_RATE, NUM_BANDS, SEGMENT_LENGTH};

/// Compute the STOI (or ESTOI) score for a clean/degraded signal pair.
///
/// # Arguments
///
/// * `clean` - Clean reference signal, mono samples
/// * `degraded` - Degraded/processed signal, mono, time-aligned with `clean`
/// * `sample_rate` - Sample rate of both signals in Hz
/// * `extended` - Use the extended (ESTOI) aggregation
///
/// # Returns
///
/// A finite score, nominally in [-1, 1] and in practice concentrated in
/// [0, 1], with higher meaning more intelligible.
///
/// # Errors
///
/// * [`IntelligibilityError::InvalidRate`] - `sample_rate` is zero
/// * [`IntelligibilityError::InvalidShape`] - empty inputs or mismatched lengths
/// * [`IntelligibilityError::InsufficientVoiceActivity`] - too little
///   voice-active signal survives silence removal to form one analysis
///   segment
///
/// # Example
///
/// ```no_run
/// use stoi::stoi;
///
/// let clean: Vec<f64> = vec![]; // your signals
/// let degraded: Vec<f64> = vec![];
/// let score = stoi(&clean, &degraded, 16_000, false)?;
/// println!("STOI: {:.3}", score);
/// # Ok::<(), stoi::IntelligibilityError>(())
/// ```
pub fn stoi(
    clean: &[f64],
    degraded: &[f64],
    sample_rate: u32,
    extended: bool,
) -> Result<f64, IntelligibilityError> {
    let config = MeasureConfig {
        variant: if extended {
            Variant::Extended
        } else {
            Variant::Standard
        },
        silence_fallback: None,
    };
    measure(clean, degraded, sample_rate, config).map(|m| m.score)
}

/// Single-precision convenience wrapper around [`stoi`].
///
/// Samples are widened to f64 before any arithmetic; the pipeline itself
/// always runs in double precision.
pub fn stoi_f32(
    clean: &[f32],
    degraded: &[f32],
    sample_rate: u32,
    extended: bool,
) -> Result<f64, IntelligibilityError> {
    let clean: Vec<f64> = clean.iter().map(|&s| s as f64).collect();
    let degraded: Vec<f64> = degraded.iter().map(|&s| s as f64).collect();
    stoi(&clean, &degraded, sample_rate, extended)
}

/// Compute the intelligibility measure with full configuration and
/// metadata.
///
/// This is the underlying entry point [`stoi`] delegates to. In addition
/// to selecting the aggregation variant, [`MeasureConfig::silence_fallback`]
/// lets callers substitute a sentinel score instead of receiving
/// [`IntelligibilityError::InsufficientVoiceActivity`]; the returned
/// [`Measurement`] records when that happened.
///
/// # Errors
///
/// As for [`stoi`]; additionally
/// [`IntelligibilityError::NumericDegenerate`] if the aggregate score is
/// non-finite (unreachable for finite input).
pub fn measure(
    clean: &[f64],
    degraded: &[f64],
    sample_rate: u32,
    config: MeasureConfig,
) -> Result<Measurement, IntelligibilityError> {
    use std::time::Instant;
    let start_time = Instant::now();

    if sample_rate == 0 {
        return Err(IntelligibilityError::InvalidRate(
            "sample rate must be > 0".to_string(),
        ));
    }
    if clean.is_empty() || degraded.is_empty() {
        return Err(IntelligibilityError::InvalidShape(
            "input signals must be non-empty".to_string(),
        ));
    }
    if clean.len() != degraded.len() {
        return Err(IntelligibilityError::InvalidShape(format!(
            "clean and degraded signals must have the same length, got {} and {}",
            clean.len(),
            degraded.len()
        )));
    }

    log::debug!(
        "Measuring intelligibility: {} samples at {} Hz, variant {:?}",
        clean.len(),
        sample_rate,
        config.variant
    );

    let duration_seconds = clean.len() as f64 / sample_rate as f64;

    // Stage 1: bring both signals to the internal rate
    let (x, y) = if sample_rate != INTERNAL_SAMPLE_RATE {
        (
            preprocessing::resample::resample(clean, sample_rate, INTERNAL_SAMPLE_RATE)?,
            preprocessing::resample::resample(degraded, sample_rate, INTERNAL_SAMPLE_RATE)?,
        )
    } else {
        (clean.to_vec(), degraded.to_vec())
    };

    let vad_frames = if x.len() > FRAME_LENGTH {
        1 + (x.len() - FRAME_LENGTH - 1) / HOP_LENGTH
    } else {
        0
    };

    let fallback = |frames_analyzed: usize,
                    frames_discarded: usize|
     -> Result<Measurement, IntelligibilityError> {
        match config.silence_fallback {
            Some(score) => {
                log::debug!(
                    "Insufficient voice activity, substituting configured fallback {}",
                    score
                );
                Ok(Measurement {
                    score,
                    variant: config.variant,
                    used_silence_fallback: true,
                    metadata: MeasureMetadata {
                        source_sample_rate: sample_rate,
                        duration_seconds,
                        frames_analyzed,
                        frames_discarded,
                        segments: 0,
                        processing_time_ms: start_time.elapsed().as_secs_f64() * 1_000.0,
                    },
                })
            }
            None => Err(IntelligibilityError::InsufficientVoiceActivity),
        }
    };

    // Stage 2: drop frames that are silent in the clean signal
    let (x_sil, y_sil) = match preprocessing::silence::remove_silent_frames(&x, &y) {
        Ok(pair) => pair,
        Err(IntelligibilityError::InsufficientVoiceActivity) => {
            return fallback(0, vad_frames);
        }
        Err(e) => return Err(e),
    };
    let frames_kept = (x_sil.len() - FRAME_LENGTH) / HOP_LENGTH + 1;
    let frames_discarded = vad_frames - frames_kept;

    // Stage 3: short-time squared-magnitude spectra
    let x_spec = features::stft::power_spectra(&x_sil);
    let y_spec = features::stft::power_spectra(&y_sil);

    if x_spec.len() < SEGMENT_LENGTH {
        return fallback(x_spec.len(), frames_discarded);
    }

    // Stage 4: one-third-octave band envelopes (shared cached filterbank)
    let filterbank =
        features::filterbank::third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
    let x_env = filterbank.band_envelope(&x_spec);
    let y_env = filterbank.band_envelope(&y_spec);

    // Stages 5-6: segment normalization and correlation
    let score = match config.variant {
        Variant::Standard => analysis::correlation::standard_score(&x_env, &y_env),
        Variant::Extended => analysis::correlation::extended_score(&x_env, &y_env),
    };

    if !score.is_finite() {
        return Err(IntelligibilityError::NumericDegenerate(format!(
            "aggregate score is {}",
            score
        )));
    }

    let segments = analysis::segments::num_segments(x_spec.len());
    let processing_time_ms = start_time.elapsed().as_secs_f64() * 1_000.0;

    log::debug!(
        "Intelligibility {:.4} over {} segments in {:.2} ms",
        score,
        segments,
        processing_time_ms
    );

    Ok(Measurement {
        score,
        variant: config.variant,
        used_silence_fallback: false,
        metadata: MeasureMetadata {
            source_sample_rate: sample_rate,
            duration_seconds,
            frames_analyzed: x_spec.len(),
            frames_discarded,
            segments,
            processing_time_ms,
        },
    })
}
