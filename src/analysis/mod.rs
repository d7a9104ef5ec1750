//! Segment analysis and score aggregation
//!
//! Consumes the band envelopes of the clean/degraded pair:
//! - Segment extraction with normalization and clipping
//! - Correlation-based aggregation (standard and extended)
//! - Result types

pub mod correlation;
pub mod result;
pub mod segments;
