//! One-third-octave filterbank
//!
//! Maps one-sided squared-magnitude spectra into a fixed set of
//! one-third-octave bands. Band centers are spaced by a ratio of 2^(1/3)
//! starting from [`MIN_BAND_FREQ`](crate::config::MIN_BAND_FREQ); the band
//! edges at `center * 2^(±1/6)` are snapped to the nearest FFT bin, and each
//! band sums the squared magnitudes of the bins in `[low, high)` before
//! taking the square root.
//!
//! The weight matrix is the single source of truth for what a band means.
//! It is computed once per (sample rate, transform size, band count)
//! configuration and cached process-wide; concurrent calls share the cached
//! instance read-only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::config::MIN_BAND_FREQ;

/// Precomputed bin-to-band weight matrix with band metadata
#[derive(Debug, Clone)]
pub struct Filterbank {
    /// Per-band weights over the retained FFT bins
    weights: Vec<Vec<f64>>,
    /// Band center frequencies in Hz
    centers: Vec<f64>,
    /// Per-band `[low, high)` bin ranges the weights were built from
    edges: Vec<(usize, usize)>,
}

impl Filterbank {
    fn design(sample_rate: u32, fft_len: usize, num_bands: usize, min_freq: f64) -> Self {
        let num_bins = fft_len / 2 + 1;
        let bin_hz = sample_rate as f64 / fft_len as f64;
        let bin_freqs: Vec<f64> = (0..num_bins).map(|i| i as f64 * bin_hz).collect();

        let mut weights = vec![vec![0.0; num_bins]; num_bands];
        let mut centers = Vec::with_capacity(num_bands);
        let mut edges = Vec::with_capacity(num_bands);

        for (band, row) in weights.iter_mut().enumerate() {
            let k = band as f64;
            centers.push(min_freq * 2f64.powf(k / 3.0));

            let f_low = min_freq * 2f64.powf((2.0 * k - 1.0) / 6.0);
            let f_high = min_freq * 2f64.powf((2.0 * k + 1.0) / 6.0);
            let low_bin = nearest_bin(&bin_freqs, f_low);
            let high_bin = nearest_bin(&bin_freqs, f_high);

            for w in &mut row[low_bin..high_bin] {
                *w = 1.0;
            }
            edges.push((low_bin, high_bin));
        }

        Self {
            weights,
            centers,
            edges,
        }
    }

    /// Number of bands
    pub fn num_bands(&self) -> usize {
        self.weights.len()
    }

    /// Band center frequencies in Hz
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// The `[low, high)` bin range contributing to `band`
    pub fn bin_range(&self, band: usize) -> (usize, usize) {
        self.edges[band]
    }

    /// Band values for one frame's squared-magnitude spectrum: the square
    /// root of the weighted sum of squared magnitudes per band
    pub fn apply(&self, power_spectrum: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|row| {
                row.iter()
                    .zip(power_spectrum)
                    .map(|(&w, &p)| w * p)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }

    /// Band envelope of a whole spectrogram, indexed `[band][frame]`
    pub fn band_envelope(&self, spectra: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut envelope = vec![vec![0.0; spectra.len()]; self.num_bands()];
        for (frame, spectrum) in spectra.iter().enumerate() {
            for (band, value) in self.apply(spectrum).into_iter().enumerate() {
                envelope[band][frame] = value;
            }
        }
        envelope
    }
}

/// First bin index minimizing the squared distance to `target`
fn nearest_bin(bin_freqs: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &f) in bin_freqs.iter().enumerate() {
        let dist = (f - target) * (f - target);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Filterbank cache keyed by (sample rate, FFT size, band count)
static CACHE: OnceLock<Mutex<HashMap<(u32, usize, usize), Arc<Filterbank>>>> = OnceLock::new();

/// Shared one-third-octave filterbank for the given configuration.
///
/// The first call per configuration designs the weights; later calls (from
/// any thread) clone the cached `Arc`.
pub fn third_octave_filterbank(sample_rate: u32, fft_len: usize, num_bands: usize) -> Arc<Filterbank> {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut banks = cache.lock().expect("filterbank cache poisoned");
    banks
        .entry((sample_rate, fft_len, num_bands))
        .or_insert_with(|| {
            Arc::new(Filterbank::design(sample_rate, fft_len, num_bands, MIN_BAND_FREQ))
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FFT_LENGTH, INTERNAL_SAMPLE_RATE, NUM_BANDS};

    /// Band edges of the 10 kHz / 512-point operating point, as published
    const PUBLISHED_EDGES: [(usize, usize); 15] = [
        (7, 9),
        (9, 11),
        (11, 14),
        (14, 17),
        (17, 22),
        (22, 27),
        (27, 34),
        (34, 43),
        (43, 55),
        (55, 69),
        (69, 87),
        (87, 109),
        (109, 138),
        (138, 174),
        (174, 219),
    ];

    #[test]
    fn test_published_bin_ranges() {
        let fb = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        for (band, &expected) in PUBLISHED_EDGES.iter().enumerate() {
            assert_eq!(fb.bin_range(band), expected, "band {}", band);
        }
    }

    #[test]
    fn test_weights_are_binary_and_match_edges() {
        let fb = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        for band in 0..fb.num_bands() {
            let (low, high) = fb.bin_range(band);
            for (bin, &w) in fb.weights[band].iter().enumerate() {
                let expected = if bin >= low && bin < high { 1.0 } else { 0.0 };
                assert_eq!(w, expected, "band {} bin {}", band, bin);
            }
        }
    }

    #[test]
    fn test_center_frequency_spacing() {
        let fb = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        let centers = fb.centers();
        assert_eq!(centers.len(), NUM_BANDS);
        assert!((centers[0] - 150.0).abs() < 1e-12);
        let ratio = 2f64.powf(1.0 / 3.0);
        for pair in centers.windows(2) {
            assert!((pair[1] / pair[0] - ratio).abs() < 1e-12);
        }
    }

    #[test]
    fn test_apply_sums_band_bins() {
        let fb = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        // Put energy 4.0 into a single bin of band 2
        let mut spectrum = vec![0.0; FFT_LENGTH / 2 + 1];
        spectrum[12] = 4.0;
        let bands = fb.apply(&spectrum);
        assert!((bands[2] - 2.0).abs() < 1e-15);
        for (band, &v) in bands.iter().enumerate() {
            if band != 2 {
                assert_eq!(v, 0.0, "band {}", band);
            }
        }
    }

    #[test]
    fn test_band_envelope_shape() {
        let fb = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        let spectra = vec![vec![1.0; FFT_LENGTH / 2 + 1]; 7];
        let envelope = fb.band_envelope(&spectra);
        assert_eq!(envelope.len(), NUM_BANDS);
        for band in &envelope {
            assert_eq!(band.len(), 7);
        }
        // Flat spectrum: each band's value is sqrt of its bin count
        for band in 0..NUM_BANDS {
            let (low, high) = fb.bin_range(band);
            let expected = ((high - low) as f64).sqrt();
            assert!((envelope[band][3] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cache_returns_shared_instance() {
        let a = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        let b = third_octave_filterbank(INTERNAL_SAMPLE_RATE, FFT_LENGTH, NUM_BANDS);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
