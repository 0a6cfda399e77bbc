//! # tableaudit-core
//!
//! Statistical audit of hard-coded lookup tables embedded in contract source.
//!
//! A Perlin-style noise contract stores its permutation and fade tables as
//! long runs of `return N;` statements, each `N` packing two sub-fields. This
//! crate pulls those literals back out and checks whether the permutation
//! behaves like a well-distributed bijection and the fade curve is monotone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tableaudit_core::{AuditConfig, audit_source};
//!
//! let source = std::fs::read_to_string("src/PerlinNoise.sol").unwrap();
//! let report = audit_source(&source, &AuditConfig::default()).unwrap();
//! println!("unique p[i]: {}", report.permutation.unique_hi);
//! println!("fade monotonic: {}", report.fade.hi_monotonic);
//! ```
//!
//! ## Architecture
//!
//! Source → [`extract`] → [`literals`] → [`decode`] → [`stats`] / [`permutation`] / [`spectral`] → [`AuditReport`] → sinks
//!
//! Every analysis is a free, pure function over a slice, so any of them can
//! be used on its own. Output sinks implement [`DiagnosticsSink`] and never
//! feed back into the report.

pub mod audit;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod literals;
pub mod permutation;
pub mod sink;
pub mod spectral;
pub mod stats;

pub use audit::{
    Audit, AuditReport, Bijection, FadeReport, LagCorrelation, PackedTable, PermutationReport,
    TableSpec, analyze_fade, analyze_permutation, audit_source, extract_table, run_audit,
};
pub use config::AuditConfig;
pub use decode::{DecodedPair, PackedLayout, decode};
pub use error::{AuditError, PermutationDefect, Result};
pub use extract::extract_function_body;
pub use literals::collect_returns;
pub use permutation::{
    CycleSummary, Permutation, cycle_length_distribution, displacement, permutation_cycles,
};
pub use sink::{DiagnosticsInput, DiagnosticsSink, SinkError, emit_all};
pub use spectral::{SpectrumBin, SpectrumSummary, magnitude_spectrum, magnitude_spectrum_of};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
