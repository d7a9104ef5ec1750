//! Configuration parameters for the intelligibility measure
//!
//! The numeric constants below define the published STOI operating point.
//! They are fixed: the filterbank, windowing and segment arithmetic are
//! calibrated against listening-test data at exactly these values, and the
//! score is only meaningful when all of them are used together.

/// Internal sample rate the whole pipeline runs at, in Hz
pub const INTERNAL_SAMPLE_RATE: u32 = 10_000;

/// Analysis frame length in samples at the internal rate (25.6 ms)
pub const FRAME_LENGTH: usize = 256;

/// Hop between consecutive frames (50% overlap)
pub const HOP_LENGTH: usize = FRAME_LENGTH / 2;

/// FFT size frames are zero-padded to
pub const FFT_LENGTH: usize = 512;

/// Number of retained FFT bins (DC through Nyquist)
pub const FFT_BINS: usize = FFT_LENGTH / 2 + 1;

/// Number of one-third-octave bands
pub const NUM_BANDS: usize = 15;

/// Center frequency of the lowest one-third-octave band, in Hz
pub const MIN_BAND_FREQ: f64 = 150.0;

/// Number of consecutive frames per analysis segment (384 ms)
pub const SEGMENT_LENGTH: usize = 30;

/// Energy range in dB below the loudest frame within which a frame
/// counts as voice-active
pub const DYNAMIC_RANGE_DB: f64 = 40.0;

/// Lower signal-to-distortion bound in dB used for envelope clipping
pub const BETA_DB: f64 = -15.0;

/// Aggregation strategy for the final correlation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Variant {
    /// Per-band temporal correlation with normalization and clipping
    #[default]
    Standard,
    /// Spectral correlation over mean/variance-normalized segments (ESTOI)
    Extended,
}

/// Measurement configuration
#[derive(Debug, Clone)]
pub struct MeasureConfig {
    /// Aggregation variant (default: [`Variant::Standard`])
    pub variant: Variant,

    /// Optional score substituted when no voice-active frames survive.
    ///
    /// `None` (the default) surfaces
    /// [`IntelligibilityError::InsufficientVoiceActivity`](crate::IntelligibilityError::InsufficientVoiceActivity).
    /// Callers that prefer the common wrapper behavior of silently
    /// returning a near-zero sentinel can set `Some(1e-5)`.
    pub silence_fallback: Option<f64>,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Standard,
            silence_fallback: None,
        }
    }
}

impl MeasureConfig {
    /// Configuration for the extended (ESTOI) variant
    pub fn extended() -> Self {
        Self {
            variant: Variant::Extended,
            ..Self::default()
        }
    }
}
