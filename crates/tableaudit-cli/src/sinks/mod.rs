//! Output sinks run after the console report.

mod plots;

use std::cell::Cell;
use std::path::PathBuf;

use tableaudit_core::{DiagnosticsInput, DiagnosticsSink, SinkError};

pub use plots::PlotSink;

/// Writes the full report as pretty JSON.
pub struct JsonReportSink {
    path: PathBuf,
    written: Cell<bool>,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Cell::new(false),
        }
    }

    pub fn written(&self) -> bool {
        self.written.get()
    }
}

impl DiagnosticsSink for JsonReportSink {
    fn name(&self) -> &str {
        "json report"
    }

    fn emit(&self, input: &DiagnosticsInput<'_>) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(input.report)
            .map_err(|e| SinkError::Render(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        self.written.set(true);
        log::info!("report written to {}", self.path.display());
        Ok(())
    }
}
