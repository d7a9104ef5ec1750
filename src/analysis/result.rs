//! Measurement result types

use serde::{Deserialize, Serialize};

use crate::config::Variant;

/// Outcome of one intelligibility measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Aggregate intelligibility score. Nominally in [-1, 1]; in practice
    /// concentrated in [0, 1], with higher meaning more intelligible.
    pub score: f64,

    /// Aggregation variant the score was computed with
    pub variant: Variant,

    /// True when the configured silence fallback was substituted because
    /// too few voice-active frames survived
    pub used_silence_fallback: bool,

    /// Measurement metadata
    pub metadata: MeasureMetadata,
}

/// Metadata describing one measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureMetadata {
    /// Sample rate of the input signals in Hz
    pub source_sample_rate: u32,

    /// Duration of the input signals in seconds
    pub duration_seconds: f64,

    /// Short-time frames that entered the correlation stage after
    /// silence removal
    pub frames_analyzed: usize,

    /// Short-time frames discarded as silent
    pub frames_discarded: usize,

    /// Number of analysis segments the score was averaged over
    pub segments: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f64,
}
