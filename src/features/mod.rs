//! Time-frequency feature extraction
//!
//! Turns a preprocessed signal into its one-third-octave band envelope:
//! - Framing and short-time magnitude spectra
//! - One-third-octave filterbank application

pub mod filterbank;
pub mod stft;
