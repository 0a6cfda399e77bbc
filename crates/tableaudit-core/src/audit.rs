//! End-to-end table audit.
//!
//! ```text
//! Source text → extract body → collect literals → check length → decode → analyses
//! ```
//!
//! Extraction and parsing failures are fatal and return before any report
//! is built. The analyses themselves cannot fail; the only conditional part
//! is cycle analysis, which runs only when the permutation's hi field is a
//! genuine bijection.

use serde::Serialize;

use crate::config::AuditConfig;
use crate::decode::{DecodedPair, PackedLayout};
use crate::error::{AuditError, Result};
use crate::extract::extract_function_body;
use crate::literals::collect_returns;
use crate::permutation::{CycleSummary, Permutation};
use crate::sink::DiagnosticsInput;
use crate::spectral::{self, SpectrumSummary};
use crate::stats;

// ---------------------------------------------------------------------------
// Table extraction
// ---------------------------------------------------------------------------

/// Where a table lives and how its entries are packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub function: String,
    pub layout: PackedLayout,
    /// Required entry count; `None` accepts any.
    pub expected_len: Option<usize>,
}

impl TableSpec {
    pub fn permutation(config: &AuditConfig) -> Self {
        Self {
            function: config.permutation_function.clone(),
            layout: PackedLayout::PERMUTATION,
            expected_len: Some(config.expected_len),
        }
    }

    pub fn fade(config: &AuditConfig) -> Self {
        Self {
            function: config.fade_function.clone(),
            layout: PackedLayout::FADE,
            expected_len: Some(config.expected_len),
        }
    }
}

/// Raw literals of one table plus their decoded sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedTable {
    pub function: String,
    pub raw: Vec<u64>,
    pub decoded: DecodedPair,
}

impl PackedTable {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Extract, collect, length-check, and decode one table.
pub fn extract_table(source: &str, spec: &TableSpec) -> Result<PackedTable> {
    let body = extract_function_body(source, &spec.function)?;
    log::debug!("{}: body is {} bytes", spec.function, body.len());

    let raw = collect_returns(body, &spec.function)?;
    if let Some(expected) = spec.expected_len {
        if raw.len() != expected {
            return Err(AuditError::CountMismatch {
                function: spec.function.clone(),
                expected,
                found: raw.len(),
            });
        }
    }

    let decoded = spec.layout.decode(&raw);
    log::debug!("{}: decoded {} entries", spec.function, decoded.len());
    Ok(PackedTable {
        function: spec.function.clone(),
        raw,
        decoded,
    })
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Autocorrelation at a single lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

/// Diagnostics for the packed permutation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermutationReport {
    pub function: String,
    pub entries: usize,
    pub unique_hi: usize,
    pub unique_lo: usize,
    pub low2_histogram: Vec<u64>,
    pub low4_histogram: Vec<u64>,
    pub chi_square_low2: f64,
    pub chi_square_low4: f64,
    pub entropy_hi: f64,
    pub entropy_lo: f64,
    pub serial_correlation_hi: f64,
    pub serial_correlation_lo: f64,
    /// Lags `1..=autocorr_lags` of the hi field.
    pub autocorrelation: Vec<LagCorrelation>,
    pub xor_hi: u32,
    pub xor_lo: u32,
    /// Bit positions 0 (LSB) to 7 of the hi field.
    pub bit_ones: Vec<u64>,
    pub preview_hi: String,
    pub preview_lo: String,
    pub value_spectrum: SpectrumSummary,
    pub bijection: Bijection,
}

/// Outcome of the bijection check on the hi field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Bijection {
    Valid {
        cycles: CycleSummary,
        displacement_spectrum: SpectrumSummary,
    },
    Invalid {
        reason: String,
    },
}

impl Bijection {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn cycles(&self) -> Option<&CycleSummary> {
        match self {
            Self::Valid { cycles, .. } => Some(cycles),
            Self::Invalid { .. } => None,
        }
    }
}

/// Diagnostics for the packed fade table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FadeReport {
    pub function: String,
    pub entries: usize,
    pub hi_monotonic: bool,
    pub lo_monotonic: bool,
    pub first_hi: u32,
    pub last_hi: u32,
    pub first_lo: u32,
    pub last_lo: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub version: String,
    pub permutation: PermutationReport,
    pub fade: FadeReport,
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

/// Run every permutation-table analysis over an extracted table.
pub fn analyze_permutation(table: &PackedTable, config: &AuditConfig) -> PermutationReport {
    let hi = &table.decoded.hi;
    let lo = &table.decoded.lo;
    let n = hi.len() as f64;

    let low2 = stats::low_bits_histogram(hi, 2);
    let low4 = stats::low_bits_histogram(hi, 4);

    let bijection = match Permutation::new(hi.clone()) {
        Ok(perm) => {
            let lengths = perm.cycle_lengths();
            let displacement = perm.displacement();
            Bijection::Valid {
                cycles: CycleSummary::from_lengths(&lengths, config.top_cycles),
                displacement_spectrum: spectral::summarize(&spectral::magnitude_spectrum_of(
                    displacement.as_slice(),
                )),
            }
        }
        Err(e) => {
            log::warn!("{}: hi field skipped for cycle analysis: {e}", table.function);
            Bijection::Invalid {
                reason: e.to_string(),
            }
        }
    };

    PermutationReport {
        function: table.function.clone(),
        entries: table.len(),
        unique_hi: stats::unique_count(hi),
        unique_lo: stats::unique_count(lo),
        chi_square_low2: stats::chi_square(&low2, n / 4.0),
        chi_square_low4: stats::chi_square(&low4, n / 16.0),
        low2_histogram: low2,
        low4_histogram: low4,
        entropy_hi: stats::shannon_entropy(hi, 256),
        entropy_lo: stats::shannon_entropy(lo, 256),
        serial_correlation_hi: stats::serial_correlation(hi),
        serial_correlation_lo: stats::serial_correlation(lo),
        autocorrelation: stats::autocorrelation(hi, config.autocorr_lags)
            .into_iter()
            .enumerate()
            .map(|(i, correlation)| LagCorrelation {
                lag: i + 1,
                correlation,
            })
            .collect(),
        xor_hi: stats::xor_fold(hi),
        xor_lo: stats::xor_fold(lo),
        bit_ones: stats::bit_ones_per_position(hi, 8),
        preview_hi: stats::printable_preview(hi),
        preview_lo: stats::printable_preview(lo),
        value_spectrum: spectral::summarize(&spectral::magnitude_spectrum_of(hi.as_slice())),
        bijection,
    }
}

/// Monotonicity and endpoints of the fade table.
pub fn analyze_fade(table: &PackedTable) -> FadeReport {
    let hi = &table.decoded.hi;
    let lo = &table.decoded.lo;
    FadeReport {
        function: table.function.clone(),
        entries: table.len(),
        hi_monotonic: stats::is_monotonic_non_decreasing(hi),
        lo_monotonic: stats::is_monotonic_non_decreasing(lo),
        first_hi: hi.first().copied().unwrap_or(0),
        last_hi: hi.last().copied().unwrap_or(0),
        first_lo: lo.first().copied().unwrap_or(0),
        last_lo: lo.last().copied().unwrap_or(0),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// A completed audit: the report plus the tables it was computed from.
#[derive(Debug, Clone)]
pub struct Audit {
    pub config: AuditConfig,
    pub permutation: PackedTable,
    pub fade: PackedTable,
    pub report: AuditReport,
}

impl Audit {
    /// Read-only view handed to diagnostics sinks.
    pub fn diagnostics_input(&self) -> DiagnosticsInput<'_> {
        DiagnosticsInput {
            report: &self.report,
            config: &self.config,
            p_hi: &self.permutation.decoded.hi,
            p_lo: &self.permutation.decoded.lo,
            f_hi: &self.fade.decoded.hi,
            f_lo: &self.fade.decoded.lo,
        }
    }
}

/// Extract both tables from `source` and run every analysis.
pub fn run_audit(source: &str, config: &AuditConfig) -> Result<Audit> {
    config.validate()?;

    let permutation = extract_table(source, &TableSpec::permutation(config))?;
    let fade = extract_table(source, &TableSpec::fade(config))?;

    let perm_report = analyze_permutation(&permutation, config);
    log::info!(
        "{}: {} entries, {} unique hi, bijection={}",
        perm_report.function,
        perm_report.entries,
        perm_report.unique_hi,
        perm_report.bijection.is_valid()
    );
    let fade_report = analyze_fade(&fade);
    log::info!(
        "{}: {} entries, hi monotonic={}, lo monotonic={}",
        fade_report.function,
        fade_report.entries,
        fade_report.hi_monotonic,
        fade_report.lo_monotonic
    );

    Ok(Audit {
        config: config.clone(),
        permutation,
        fade,
        report: AuditReport {
            version: crate::VERSION.to_string(),
            permutation: perm_report,
            fade: fade_report,
        },
    })
}

/// Extract both tables from `source` and return only the report.
pub fn audit_source(source: &str, config: &AuditConfig) -> Result<AuditReport> {
    run_audit(source, config).map(|audit| audit.report)
}
