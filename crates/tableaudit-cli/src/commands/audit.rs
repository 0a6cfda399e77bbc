use std::fmt::{self, Write as _};

use tableaudit_core::{AuditReport, Bijection, DiagnosticsSink, emit_all, run_audit};

use crate::sinks::{JsonReportSink, PlotSink};

pub struct AuditCommandConfig<'a> {
    pub source_path: &'a str,
    pub config_path: Option<&'a str>,
    pub lags: Option<usize>,
    pub output_path: Option<&'a str>,
    pub plots: bool,
    pub plot_dir: &'a str,
}

pub fn run(cfg: AuditCommandConfig<'_>) -> anyhow::Result<()> {
    let config = super::load_config(cfg.config_path, cfg.lags)?;
    let source = super::load_source(cfg.source_path)?;

    let audit = run_audit(&source, &config)?;
    print!("{}", render_report(&audit.report)?);

    let json = cfg.output_path.map(JsonReportSink::new);
    let plots = cfg.plots.then(|| PlotSink::new(cfg.plot_dir));
    let mut sinks: Vec<&dyn DiagnosticsSink> = Vec::new();
    if let Some(sink) = &json {
        sinks.push(sink);
    }
    if let Some(sink) = &plots {
        sinks.push(sink);
    }

    if !sinks.is_empty() {
        let ok = emit_all(&sinks, &audit.diagnostics_input());
        if let Some(path) = cfg.output_path {
            if json.as_ref().is_some_and(|s| s.written()) {
                println!("\nReport written to {path}");
            }
        }
        log::info!("{ok}/{} output sink(s) completed", sinks.len());
    }
    Ok(())
}

/// Render the console report. Floats follow fixed precisions so runs diff cleanly.
pub fn render_report(report: &AuditReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let p = &report.permutation;
    let f = &report.fade;
    let name = &p.function;

    writeln!(out, "{:=<68}", "")?;
    writeln!(out, "Permutation table `{name}` ({} entries)", p.entries)?;
    writeln!(out, "{:=<68}", "")?;
    writeln!(out, "  ┌─ hi field p[i]: {}", p.preview_hi)?;
    writeln!(out, "  │  lo field p[i+1]: {}", p.preview_lo)?;
    writeln!(out, "  │ unique p[i]: {}", p.unique_hi)?;
    writeln!(out, "  │ unique p[i+1]: {}", p.unique_lo)?;
    writeln!(
        out,
        "  │ low2 counts: {:?}  chi2: {}",
        p.low2_histogram,
        round(p.chi_square_low2, 4)
    )?;
    writeln!(
        out,
        "  │ low4 counts: {:?}  chi2: {}",
        p.low4_histogram,
        round(p.chi_square_low4, 4)
    )?;
    writeln!(
        out,
        "  │ entropy (bits): p[i] {}  p[i+1] {}",
        round(p.entropy_hi, 6),
        round(p.entropy_lo, 6)
    )?;
    writeln!(
        out,
        "  │ serial correlation: p[i] {}  p[i+1] {}",
        round(p.serial_correlation_hi, 6),
        round(p.serial_correlation_lo, 6)
    )?;
    let lags: Vec<String> = p
        .autocorrelation
        .iter()
        .map(|l| format!("{}:{}", l.lag, round(l.correlation, 4)))
        .collect();
    writeln!(out, "  │ autocorrelation: [{}]", lags.join(", "))?;
    writeln!(out, "  │ xor: p[i] {:#x}  p[i+1] {:#x}", p.xor_hi, p.xor_lo)?;
    writeln!(out, "  │ bit ones (LSB first): {:?}", p.bit_ones)?;
    writeln!(
        out,
        "  │ value spectrum: peak {:.3} at f={:.4}, flatness {:.4}",
        p.value_spectrum.peak_magnitude,
        p.value_spectrum.dominant_frequency,
        p.value_spectrum.flatness
    )?;
    match &p.bijection {
        Bijection::Valid {
            cycles,
            displacement_spectrum,
        } => {
            writeln!(
                out,
                "  │ cycles: {} (fixed points {})",
                cycles.count, cycles.fixed_points
            )?;
            writeln!(out, "  │ top cycle lengths: {:?}", cycles.top)?;
            writeln!(
                out,
                "  │ cycle length min/median/max: {}/{}/{}",
                cycles.min, cycles.median, cycles.max
            )?;
            writeln!(
                out,
                "  │ displacement spectrum flatness: {:.4}",
                displacement_spectrum.flatness
            )?;
        }
        Bijection::Invalid { reason } => {
            writeln!(out, "  │ cycles: skipped (not a permutation: {reason})")?;
        }
    }
    writeln!(out, "  └─")?;

    writeln!(out, "\n{:=<68}", "")?;
    writeln!(out, "Fade table `{}` ({} entries)", f.function, f.entries)?;
    writeln!(out, "{:=<68}", "")?;
    writeln!(
        out,
        "  ┌─ monotonic: hi {}  lo {}",
        yes_no(f.hi_monotonic),
        yes_no(f.lo_monotonic)
    )?;
    writeln!(out, "  │ hi first/last: {}/{}", f.first_hi, f.last_hi)?;
    writeln!(out, "  │ lo first/last: {}/{}", f.first_lo, f.last_lo)?;
    writeln!(out, "  └─")?;
    Ok(out)
}

/// Round to `places` decimals, ties to even on the exact binary value, then
/// print the shortest form (`0.5`, `8`, `-0.0123`).
fn round(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // A double never has more than 1074 fraction digits, so this is exact.
    let places = places.min(1074);
    let exact = format!("{:.1074}", value.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().take(places))
        .map(|b| b - b'0')
        .collect();
    let rest = frac.as_bytes().get(places..).unwrap_or(&[]);
    let round_up = match rest.first() {
        Some(b'6'..=b'9') => true,
        Some(b'5') => {
            rest[1..].iter().any(|&b| b != b'0') || digits.last().is_some_and(|d| d % 2 == 1)
        }
        _ => false,
    };
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - places;
    let mut text: String = digits[..split].iter().map(|&d| char::from(b'0' + d)).collect();
    if places > 0 {
        text.push('.');
    }
    text.extend(digits[split..].iter().map(|&d| char::from(b'0' + d)));
    let r: f64 = text.parse().unwrap_or(value.abs());
    // No "-0".
    if r == 0.0 {
        "0".to_string()
    } else if value < 0.0 {
        format!("{}", -r)
    } else {
        format!("{r}")
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "NO" }
}
