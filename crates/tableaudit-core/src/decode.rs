//! Packed-pair decoding.
//!
//! Each table literal carries two sub-fields: `hi = (v >> shift) & hi_mask`
//! and `lo = v & lo_mask`.

use serde::{Deserialize, Serialize};

/// Bit layout of one packed table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedLayout {
    pub hi_shift: u32,
    pub hi_mask: u64,
    pub lo_mask: u64,
}

impl PackedLayout {
    /// 16-bit entries: `p[i] << 8 | p[i + 1]`.
    pub const PERMUTATION: Self = Self {
        hi_shift: 8,
        hi_mask: 0xFF,
        lo_mask: 0xFF,
    };

    /// 24-bit entries: two 12-bit fade samples.
    pub const FADE: Self = Self {
        hi_shift: 12,
        hi_mask: 0xFFF,
        lo_mask: 0xFFF,
    };

    pub fn hi(&self, value: u64) -> u32 {
        // Masks used here are at most 12 bits wide; truncation only matters
        // for custom layouts with masks wider than 32 bits.
        (value.checked_shr(self.hi_shift).unwrap_or(0) & self.hi_mask) as u32
    }

    pub fn lo(&self, value: u64) -> u32 {
        (value & self.lo_mask) as u32
    }

    pub fn decode(&self, values: &[u64]) -> DecodedPair {
        decode(values, self.hi_shift, self.hi_mask, self.lo_mask)
    }
}

/// The two parallel sub-field sequences of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedPair {
    pub hi: Vec<u32>,
    pub lo: Vec<u32>,
}

impl DecodedPair {
    pub fn len(&self) -> usize {
        self.hi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hi.is_empty()
    }
}

/// Split every packed value into its high and low sub-fields.
pub fn decode(values: &[u64], hi_shift: u32, hi_mask: u64, lo_mask: u64) -> DecodedPair {
    let layout = PackedLayout {
        hi_shift,
        hi_mask,
        lo_mask,
    };
    let (hi, lo) = values.iter().map(|&v| (layout.hi(v), layout.lo(v))).unzip();
    DecodedPair { hi, lo }
}
