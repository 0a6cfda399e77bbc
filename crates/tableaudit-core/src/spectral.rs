//! Zero-mean magnitude spectra of table sequences.

use rustfft::{FftPlanner, num_complex::Complex};
use serde::Serialize;

/// One bin of a one-sided magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumBin {
    /// Cycles per sample, `k / n`.
    pub frequency: f64,
    pub magnitude: f64,
}

/// Peak and flatness of a spectrum, DC bin excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpectrumSummary {
    pub dominant_frequency: f64,
    pub peak_magnitude: f64,
    pub mean_magnitude: f64,
    /// Geometric over arithmetic mean of power: 1.0 = flat, 0.0 = tonal.
    pub flatness: f64,
}

/// Forward FFT of `values` after subtracting their mean.
///
/// Returns bins `0..=n/2`. An empty input gives an empty spectrum.
pub fn magnitude_spectrum(values: &[f64]) -> Vec<SpectrumBin> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = values
        .iter()
        .map(|&v| Complex {
            re: v - mean,
            im: 0.0,
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer[..=n / 2]
        .iter()
        .enumerate()
        .map(|(k, c)| SpectrumBin {
            frequency: k as f64 / n as f64,
            magnitude: c.norm(),
        })
        .collect()
}

/// Convenience for integer sequences.
pub fn magnitude_spectrum_of<T: Copy + Into<f64>>(values: &[T]) -> Vec<SpectrumBin> {
    let as_f64: Vec<f64> = values.iter().map(|&v| v.into()).collect();
    magnitude_spectrum(&as_f64)
}

pub fn summarize(spectrum: &[SpectrumBin]) -> SpectrumSummary {
    let bins = spectrum.get(1..).unwrap_or(&[]);
    if bins.is_empty() {
        return SpectrumSummary::default();
    }

    let peak = bins
        .iter()
        .copied()
        .fold(bins[0], |best, b| if b.magnitude > best.magnitude { b } else { best });
    let mean_magnitude = bins.iter().map(|b| b.magnitude).sum::<f64>() / bins.len() as f64;

    let power: Vec<f64> = bins
        .iter()
        .map(|b| b.magnitude * b.magnitude + 1e-15)
        .collect();
    let log_sum: f64 = power.iter().map(|&p| p.ln()).sum();
    let geo_mean = (log_sum / power.len() as f64).exp();
    let arith_mean = power.iter().sum::<f64>() / power.len() as f64;

    SpectrumSummary {
        dominant_frequency: peak.frequency,
        peak_magnitude: peak.magnitude,
        mean_magnitude,
        flatness: (geo_mean / arith_mean).clamp(0.0, 1.0),
    }
}
