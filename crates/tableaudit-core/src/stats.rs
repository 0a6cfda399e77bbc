//! Descriptive statistics over decoded table sequences.
//!
//! Every function here is pure and total: degenerate input (empty sequences,
//! constant sequences, zero expectations) yields a neutral value rather than
//! an error or a NaN. Correlation sums are accumulated in `i128` so they stay
//! exact before the final floating-point division.

use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Largest `bits` accepted by [`low_bits_histogram`].
pub const MAX_HISTOGRAM_BITS: u32 = 16;

/// Histogram of the low `bits` bits of each value (`2^bits` buckets).
///
/// `bits` above [`MAX_HISTOGRAM_BITS`] yields an empty histogram.
pub fn low_bits_histogram(values: &[u32], bits: u32) -> Vec<u64> {
    if bits > MAX_HISTOGRAM_BITS {
        return Vec::new();
    }
    let mask = (1u32 << bits) - 1;
    let mut counts = vec![0u64; 1usize << bits];
    for &v in values {
        counts[(v & mask) as usize] += 1;
    }
    counts
}

/// Shannon entropy in bits per symbol of `x mod alphabet`.
///
/// Returns 0.0 for an empty sequence or a zero alphabet.
pub fn shannon_entropy(values: &[u32], alphabet: usize) -> f64 {
    let n = values.len();
    if n == 0 || alphabet == 0 {
        return 0.0;
    }
    let mut hist = vec![0u64; alphabet];
    for &v in values {
        hist[v as usize % alphabet] += 1;
    }
    let n = n as f64;
    hist.iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Pearson chi-square `Σ (c − E)² / E` against a flat expectation.
///
/// A non-positive or non-finite expectation returns 0.0.
pub fn chi_square(counts: &[u64], expected: f64) -> f64 {
    if !expected.is_finite() || expected <= 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Number of distinct values.
pub fn unique_count(values: &[u32]) -> usize {
    values.iter().collect::<HashSet<_>>().len()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Raw moment sums shared by serial and lag correlation.
struct MomentSums {
    n: i128,
    sum: i128,
    sum_sq: i128,
}

impl MomentSums {
    fn new(values: &[u32]) -> Self {
        let sum = values.iter().map(|&v| v as i128).sum();
        let sum_sq = values.iter().map(|&v| (v as i128) * (v as i128)).sum();
        Self {
            n: values.len() as i128,
            sum,
            sum_sq,
        }
    }

    fn denominator(&self) -> i128 {
        self.n * self.sum_sq - self.sum * self.sum
    }

    /// Cyclic correlation at `lag`: `(n·Σ xᵢ·x₍ᵢ₊ₖ₎ mod n − (Σx)²) / den`.
    fn correlation(&self, values: &[u32], lag: usize) -> f64 {
        let den = self.denominator();
        if den == 0 {
            return 0.0;
        }
        let n = values.len();
        let cross: i128 = (0..n)
            .map(|i| values[i] as i128 * values[(i + lag) % n] as i128)
            .sum();
        let num = self.n * cross - self.sum * self.sum;
        num as f64 / den as f64
    }
}

/// Lag-1 serial correlation with cyclic wrap-around.
///
/// Fewer than two values or a constant sequence yields 0.0.
pub fn serial_correlation(values: &[u32]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    MomentSums::new(values).correlation(values, 1)
}

/// Cyclic autocorrelation for lags `1..=max_lag`.
pub fn autocorrelation(values: &[u32], max_lag: usize) -> Vec<f64> {
    if values.len() < 2 {
        return vec![0.0; max_lag];
    }
    let sums = MomentSums::new(values);
    (1..=max_lag)
        .map(|lag| sums.correlation(values, lag))
        .collect()
}

// ---------------------------------------------------------------------------
// Bitwise
// ---------------------------------------------------------------------------

/// XOR of all values, seeded at zero.
pub fn xor_fold(values: &[u32]) -> u32 {
    values.iter().fold(0, |acc, &v| acc ^ v)
}

/// For each bit position `0..width` (LSB first), how many values have it set.
///
/// Positions at or above 32 are always zero.
pub fn bit_ones_per_position(values: &[u32], width: u32) -> Vec<u64> {
    let mut counts = vec![0u64; width as usize];
    for &v in values {
        for (bit, count) in counts.iter_mut().take(u32::BITS as usize).enumerate() {
            if (v >> bit) & 1 == 1 {
                *count += 1;
            }
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// True when every adjacent pair is non-decreasing. Empty and singleton
/// sequences are monotonic.
pub fn is_monotonic_non_decreasing(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Printable-ASCII rendering of byte-sized values; anything outside 32..127
/// becomes `.`.
pub fn printable_preview(values: &[u32]) -> String {
    values
        .iter()
        .map(|&v| match u8::try_from(v) {
            Ok(b) if (32..127).contains(&b) => b as char,
            _ => '.',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
