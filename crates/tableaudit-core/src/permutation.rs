//! Permutation validation and cycle structure.
//!
//! A [`Permutation`] can only be built from a sequence that is a bijection on
//! its own index range, so cycle decomposition never indexes out of range or
//! walks a non-closing orbit.

use serde::Serialize;

use crate::error::{AuditError, PermutationDefect, Result};

/// A validated bijection `i -> values[i]` on `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    values: Vec<u32>,
}

impl Permutation {
    /// Validate `values` as a permutation of `0..values.len()`.
    ///
    /// The first offending index is reported: either a value that is not
    /// smaller than the length, or a value seen earlier in the sequence.
    pub fn new(values: Vec<u32>) -> Result<Self> {
        let n = values.len();
        let mut seen = vec![false; n];
        for (index, &value) in values.iter().enumerate() {
            let slot = value as usize;
            if slot >= n {
                return Err(AuditError::NotAPermutation {
                    index,
                    value,
                    reason: PermutationDefect::OutOfRange,
                });
            }
            if seen[slot] {
                return Err(AuditError::NotAPermutation {
                    index,
                    value,
                    reason: PermutationDefect::Duplicate,
                });
            }
            seen[slot] = true;
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cycle lengths in order of each cycle's smallest starting index.
    pub fn cycle_lengths(&self) -> Vec<usize> {
        let n = self.values.len();
        let mut visited = vec![false; n];
        let mut cycles = Vec::new();
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut length = 0;
            let mut j = start;
            while !visited[j] {
                visited[j] = true;
                j = self.values[j] as usize;
                length += 1;
            }
            cycles.push(length);
        }
        cycles
    }

    /// Signed offset of each entry from its index, wrapped into
    /// `[-len/2, len/2)`.
    pub fn displacement(&self) -> Vec<i32> {
        displacement(&self.values)
    }
}

/// Wrapped `v - i` for any sequence, bijective or not.
pub fn displacement(values: &[u32]) -> Vec<i32> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as i64;
    let half = n / 2;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| ((v as i64 - i as i64 + half).rem_euclid(n) - half) as i32)
        .collect()
}

/// Validate `values` and return its cycle lengths.
pub fn permutation_cycles(values: &[u32]) -> Result<Vec<usize>> {
    Ok(Permutation::new(values.to_vec())?.cycle_lengths())
}

/// Summary of a cycle decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub count: usize,
    /// Longest cycles first, at most `top_n` of them.
    pub top: Vec<usize>,
    pub min: usize,
    /// Element at index `count / 2` of the lengths sorted longest first.
    pub median: usize,
    pub max: usize,
    pub fixed_points: usize,
    /// Sum of all lengths; equals the permutation length.
    pub total: usize,
}

impl CycleSummary {
    pub fn from_lengths(lengths: &[usize], top_n: usize) -> Self {
        if lengths.is_empty() {
            return Self::default();
        }
        let mut sorted = lengths.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        Self {
            count: sorted.len(),
            top: sorted.iter().take(top_n).copied().collect(),
            min: sorted[sorted.len() - 1],
            median: sorted[sorted.len() / 2],
            max: sorted[0],
            fixed_points: sorted.iter().filter(|&&l| l == 1).count(),
            total: sorted.iter().sum(),
        }
    }
}

/// Histogram of cycle lengths as `(length, how many cycles)`, shortest first.
pub fn cycle_length_distribution(lengths: &[usize]) -> Vec<(usize, usize)> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable();
    let mut out: Vec<(usize, usize)> = Vec::new();
    for len in sorted {
        match out.last_mut() {
            Some((l, count)) if *l == len => *count += 1,
            _ => out.push((len, 1)),
        }
    }
    out
}
