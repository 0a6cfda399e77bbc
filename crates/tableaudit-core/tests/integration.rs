//! Integration tests for tableaudit-core.
//!
//! These build a synthetic contract with a known permutation and a known fade
//! curve, then run the full pipeline:
//! source text → extraction → literal collection → decoding → analyses.

use std::io::Write;

use tableaudit_core::{
    AuditConfig, AuditError, PackedLayout, audit_source, collect_returns, extract_function_body,
    permutation_cycles, run_audit, stats,
};

/// Seeded Fisher-Yates shuffle of 0..n.
fn shuffled(n: usize, seed: u64) -> Vec<u64> {
    let mut values: Vec<u64> = (0..n as u64).collect();
    let mut state = seed;
    for i in (1..n).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = ((state >> 33) as usize) % (i + 1);
        values.swap(i, j);
    }
    values
}

/// Quintic fade 6t^5 - 15t^4 + 10t^3 sampled on 12 bits.
fn fade_sample(i: usize) -> u64 {
    let t = i as f64 / 256.0;
    let f = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
    (f * 4095.0).round() as u64
}

fn packed_permutation(p: &[u64]) -> Vec<u64> {
    (0..p.len())
        .map(|i| (p[i] << 8) | p[(i + 1) % p.len()])
        .collect()
}

fn packed_fade() -> Vec<u64> {
    (0..256)
        .map(|i| (fade_sample(i) << 12) | fade_sample(i + 1))
        .collect()
}

fn render_function(name: &str, values: &[u64]) -> String {
    let mut out = format!("    function {name}(uint256 i) internal pure returns (uint256) {{\n");
    for (i, v) in values.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&format!("        if (i == {i}) {{ return {v}; }}\n"));
        } else {
            out.push_str(&format!("        // entry {i}\n        if (i == {i}) return {v};\n"));
        }
    }
    out.push_str("        revert();\n    }\n");
    out
}

fn synthetic_contract(p: &[u64]) -> String {
    format!(
        "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n\nlibrary PerlinNoise {{\n    function noise2d(int256 x, int256 y) internal pure returns (int256) {{\n        return 0;\n    }}\n\n{}\n{}}}\n",
        render_function("ptable", &packed_permutation(p)),
        render_function("ftable", &packed_fade()),
    )
}

#[test]
fn end_to_end_report_for_true_bijection() {
    let p = shuffled(256, 0xDEAD_BEEF);
    let src = synthetic_contract(&p);

    let report = audit_source(&src, &AuditConfig::default()).unwrap();
    let perm = &report.permutation;

    assert_eq!(perm.entries, 256);
    assert_eq!(perm.unique_hi, 256);
    assert_eq!(perm.unique_lo, 256);
    // A bijection on 0..256 fills every low-bit bucket evenly.
    assert_eq!(perm.low2_histogram, vec![64; 4]);
    assert_eq!(perm.low4_histogram, vec![16; 16]);
    assert_eq!(perm.chi_square_low2, 0.0);
    assert_eq!(perm.chi_square_low4, 0.0);
    assert!((perm.entropy_hi - 8.0).abs() < 1e-9);
    assert_eq!(perm.xor_hi, 0);
    assert_eq!(perm.xor_lo, 0);
    assert_eq!(perm.bit_ones, vec![128; 8]);
    assert_eq!(perm.autocorrelation.len(), 8);
    assert_eq!(perm.preview_hi.chars().count(), 256);

    let cycles = perm.bijection.cycles().expect("bijection expected");
    assert_eq!(cycles.total, 256);
    assert!(cycles.top.len() <= 10);
    assert!(cycles.top.windows(2).all(|w| w[0] >= w[1]));
    assert!(cycles.min <= cycles.median && cycles.median <= cycles.max);

    assert_eq!(report.fade.entries, 256);
    assert!(report.fade.hi_monotonic);
    assert!(report.fade.lo_monotonic);
    assert_eq!(report.fade.first_hi, 0);
    assert_eq!(report.fade.last_lo, 4095);
}

#[test]
fn permutation_hi_is_not_monotonic() {
    let p = shuffled(256, 42);
    let audit = run_audit(&synthetic_contract(&p), &AuditConfig::default()).unwrap();
    assert!(!stats::is_monotonic_non_decreasing(&audit.permutation.decoded.hi));
    let expected: Vec<u32> = p.iter().map(|&v| v as u32).collect();
    assert_eq!(audit.permutation.decoded.hi, expected);
}

#[test]
fn lo_field_is_hi_shifted_by_one() {
    let p = shuffled(256, 7);
    let audit = run_audit(&synthetic_contract(&p), &AuditConfig::default()).unwrap();
    let hi = &audit.permutation.decoded.hi;
    let lo = &audit.permutation.decoded.lo;
    for i in 0..256 {
        assert_eq!(lo[i], hi[(i + 1) % 256]);
    }
}

#[test]
fn identity_permutation_structure() {
    let p: Vec<u64> = (0..256).collect();
    let report = audit_source(&synthetic_contract(&p), &AuditConfig::default()).unwrap();
    let cycles = report.permutation.bijection.cycles().unwrap();
    assert_eq!(cycles.count, 256);
    assert_eq!(cycles.fixed_points, 256);
    assert_eq!(cycles.max, 1);
    // Identity counts up by one: strongly positive lag-1 correlation.
    assert!(report.permutation.serial_correlation_hi > 0.9);
}

#[test]
fn json_report_serializes() {
    let p = shuffled(256, 99);
    let report = audit_source(&synthetic_contract(&p), &AuditConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["permutation"]["entries"], 256);
    assert_eq!(json["permutation"]["bijection"]["status"], "valid");
    assert_eq!(json["fade"]["hi_monotonic"], true);
}

#[test]
fn reads_contract_from_disk() {
    let p = shuffled(256, 5);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(synthetic_contract(&p).as_bytes()).unwrap();

    let src = std::fs::read_to_string(file.path()).unwrap();
    let body = extract_function_body(&src, "ptable").unwrap();
    let literals = collect_returns(body, "ptable").unwrap();
    assert_eq!(literals.len(), 256);

    let decoded = PackedLayout::PERMUTATION.decode(&literals);
    let cycles = permutation_cycles(&decoded.hi).unwrap();
    assert_eq!(cycles.iter().sum::<usize>(), 256);
}

#[test]
fn truncated_table_is_count_mismatch() {
    let p = shuffled(256, 1);
    let packed = packed_permutation(&p);
    let src = format!(
        "{}{}",
        render_function("ptable", &packed[..255]),
        render_function("ftable", &packed_fade())
    );
    let err = audit_source(&src, &AuditConfig::default()).unwrap_err();
    match err {
        AuditError::CountMismatch {
            function,
            expected,
            found,
        } => {
            assert_eq!(function, "ptable");
            assert_eq!(expected, 256);
            assert_eq!(found, 255);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unclosed_fade_body_is_fatal() {
    let p = shuffled(256, 3);
    let mut src = synthetic_contract(&p);
    // Drop everything after the fade table's last literal.
    let cut = src.rfind("revert();").unwrap();
    src.truncate(cut);
    let err = audit_source(&src, &AuditConfig::default()).unwrap_err();
    assert!(matches!(err, AuditError::UnbalancedBraces { ref function, .. } if function == "ftable"));
    assert_eq!(err.stage(), "extract");
}

#[test]
fn renamed_tables_via_config() {
    let p = shuffled(256, 11);
    let src = synthetic_contract(&p)
        .replace("function ptable(", "function perm(")
        .replace("function ftable(", "function fade(");
    let cfg = AuditConfig::from_json(r#"{"permutation_function": "perm", "fade_function": "fade"}"#)
        .unwrap();
    let report = audit_source(&src, &cfg).unwrap();
    assert_eq!(report.permutation.function, "perm");
    assert_eq!(report.fade.function, "fade");

    let err = audit_source(&src, &AuditConfig::default()).unwrap_err();
    assert!(matches!(err, AuditError::FunctionNotFound { .. }));
}
