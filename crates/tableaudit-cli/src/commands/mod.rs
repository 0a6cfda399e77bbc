pub mod audit;
pub mod dump;

use std::path::Path;

use anyhow::Context;
use tableaudit_core::{AuditConfig, PackedLayout};

/// Read the whole source artifact. It is never written back.
pub fn load_source(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read source {path}"))
}

/// Load the config file if given, then apply command-line overrides.
pub fn load_config(path: Option<&str>, lags: Option<usize>) -> anyhow::Result<AuditConfig> {
    let mut config = match path {
        Some(p) => AuditConfig::from_path(Path::new(p))
            .with_context(|| format!("failed to load config {p}"))?,
        None => AuditConfig::default(),
    };
    if let Some(lags) = lags {
        config.autocorr_lags = lags;
    }
    Ok(config)
}

/// Parse a layout name into its packing.
pub fn parse_layout(s: &str) -> PackedLayout {
    match s {
        "fade" | "ftable" => PackedLayout::FADE,
        "permutation" | "perm" | "ptable" => PackedLayout::PERMUTATION,
        _ => {
            log::warn!("Unknown layout '{s}', using permutation");
            PackedLayout::PERMUTATION
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_layout_variants() {
        assert_eq!(parse_layout("fade"), PackedLayout::FADE);
        assert_eq!(parse_layout("ftable"), PackedLayout::FADE);
        assert_eq!(parse_layout("permutation"), PackedLayout::PERMUTATION);
        assert_eq!(parse_layout("perm"), PackedLayout::PERMUTATION);
    }

    #[test]
    fn test_parse_layout_unknown_defaults_permutation() {
        assert_eq!(parse_layout("FADE"), PackedLayout::PERMUTATION);
        assert_eq!(parse_layout(""), PackedLayout::PERMUTATION);
    }

    #[test]
    fn test_load_config_defaults_and_override() {
        let cfg = load_config(None, None).unwrap();
        assert_eq!(cfg, AuditConfig::default());

        let cfg = load_config(None, Some(32)).unwrap();
        assert_eq!(cfg.autocorr_lags, 32);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_cycles": 5, "autocorr_lags": 4}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cfg = load_config(Some(&path), Some(12)).unwrap();
        assert_eq!(cfg.top_cycles, 5);
        // Command line wins over the file.
        assert_eq!(cfg.autocorr_lags, 12);
    }

    #[test]
    fn test_load_source_missing_names_path() {
        let err = load_source("/nonexistent/PerlinNoise.sol").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/PerlinNoise.sol"));
    }
}
