//! Error types for the intelligibility measure

use std::fmt;

/// Errors that can occur while computing the intelligibility measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntelligibilityError {
    /// Non-positive or otherwise unusable sample rate
    InvalidRate(String),

    /// Empty input or mismatched signal lengths
    InvalidShape(String),

    /// No voice-active frames survive silence removal, so the measure
    /// is undefined for this signal pair
    InsufficientVoiceActivity,

    /// The aggregate score degenerated to a non-finite value
    NumericDegenerate(String),
}

impl fmt::Display for IntelligibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntelligibilityError::InvalidRate(msg) => write!(f, "Invalid sample rate: {}", msg),
            IntelligibilityError::InvalidShape(msg) => write!(f, "Invalid input shape: {}", msg),
            IntelligibilityError::InsufficientVoiceActivity => write!(
                f,
                "Not enough frames to compute the intermediate intelligibility \
                 measure after removing silent frames"
            ),
            IntelligibilityError::NumericDegenerate(msg) => {
                write!(f, "Numerically degenerate result: {}", msg)
            }
        }
    }
}

impl std::error::Error for IntelligibilityError {}
