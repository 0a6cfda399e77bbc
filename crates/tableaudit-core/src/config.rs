//! Audit configuration.
//!
//! Defaults reproduce the standard `ptable`/`ftable` layout: 256 entries per
//! table, autocorrelation reported to lag 8, top 10 cycles.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Function holding the packed permutation table.
    pub permutation_function: String,
    /// Function holding the packed fade table.
    pub fade_function: String,
    /// Literals each table must return.
    pub expected_len: usize,
    pub autocorr_lags: usize,
    /// Lags rendered in the autocorrelation plot.
    pub plot_autocorr_lags: usize,
    pub top_cycles: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            permutation_function: "ptable".to_string(),
            fade_function: "ftable".to_string(),
            expected_len: 256,
            autocorr_lags: 8,
            plot_autocorr_lags: 32,
            top_cycles: 10,
        }
    }
}

impl AuditConfig {
    /// Load a JSON config from disk. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| AuditError::Config(format!("failed to parse config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, name) in [
            ("permutation_function", &self.permutation_function),
            ("fade_function", &self.fade_function),
        ] {
            if !is_identifier(name) {
                return Err(AuditError::Config(format!(
                    "{field} must be an identifier, got {name:?}"
                )));
            }
        }
        if self.expected_len == 0 {
            return Err(AuditError::Config("expected_len must be > 0".to_string()));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
