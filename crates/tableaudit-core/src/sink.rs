//! Pluggable consumers of a finished audit.
//!
//! Sinks receive read-only views of the report and decoded sequences. A sink
//! failing (missing renderer, unwritable directory) is logged and skipped;
//! it can never change or abort the audit itself.

use thiserror::Error;

use crate::audit::AuditReport;
use crate::config::AuditConfig;

/// Everything a sink may look at.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsInput<'a> {
    pub report: &'a AuditReport,
    pub config: &'a AuditConfig,
    /// Permutation table, hi field (`p[i]`).
    pub p_hi: &'a [u32],
    /// Permutation table, lo field (`p[i + 1]`).
    pub p_lo: &'a [u32],
    pub f_hi: &'a [u32],
    pub f_lo: &'a [u32],
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{0} unavailable")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render failed: {0}")]
    Render(String),
}

pub trait DiagnosticsSink {
    fn name(&self) -> &str;

    fn emit(&self, input: &DiagnosticsInput<'_>) -> Result<(), SinkError>;
}

/// Run every sink in order. Failures are downgraded to warnings.
///
/// Returns how many sinks completed successfully.
pub fn emit_all(sinks: &[&dyn DiagnosticsSink], input: &DiagnosticsInput<'_>) -> usize {
    let mut ok = 0;
    for sink in sinks {
        match sink.emit(input) {
            Ok(()) => {
                log::debug!("sink `{}` done", sink.name());
                ok += 1;
            }
            Err(e) => log::warn!("{} skipped: {e}", sink.name()),
        }
    }
    ok
}
