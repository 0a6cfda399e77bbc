//! Diagnostic images for the permutation and fade tables.
//!
//! Rendering needs the `plots` feature (plotters). Without it the sink
//! reports itself unavailable and the audit carries on.

use std::path::PathBuf;

use tableaudit_core::{DiagnosticsInput, DiagnosticsSink, SinkError};

pub struct PlotSink {
    dir: PathBuf,
}

impl PlotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticsSink for PlotSink {
    fn name(&self) -> &str {
        "plots"
    }

    #[cfg(feature = "plots")]
    fn emit(&self, input: &DiagnosticsInput<'_>) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir)?;
        let count =
            render::render_all(&self.dir, input).map_err(|e| SinkError::Render(e.to_string()))?;
        println!("\n{count} plot(s) written to {}", self.dir.display());
        Ok(())
    }

    #[cfg(not(feature = "plots"))]
    fn emit(&self, _input: &DiagnosticsInput<'_>) -> Result<(), SinkError> {
        log::debug!("plots requested for {} but renderer not built", self.dir.display());
        Err(SinkError::Unavailable(
            "plot rendering (build with --features plots)".into(),
        ))
    }
}

#[cfg(feature = "plots")]
mod render {
    use std::error::Error;
    use std::ops::Range;
    use std::path::Path;

    use plotters::prelude::*;
    use tableaudit_core::spectral::magnitude_spectrum_of;
    use tableaudit_core::{
        DiagnosticsInput, Permutation, cycle_length_distribution, displacement, stats,
    };

    const WIDE: (u32, u32) = (1200, 700);
    const SQUARE: (u32, u32) = (800, 800);

    /// `(x0, x1, height)`.
    type Bar = (f64, f64, f64);

    /// Render every image into `dir`. Returns how many were written.
    pub fn render_all(dir: &Path, input: &DiagnosticsInput<'_>) -> Result<usize, Box<dyn Error>> {
        let p = input.p_hi;
        let mut written = 0;

        let points: Vec<(f64, f64)> = indexed_points(p);
        render_scatter(
            &dir.join("permutation_scatter.png"),
            "Permutation scatter: i vs p[i]",
            &points,
        )?;
        render_matrix(&dir.join("permutation_matrix.png"), p)?;
        written += 2;

        render_bars(
            &dir.join("low4bit_hist.png"),
            "Low-4-bit counts of p[i]",
            ("low 4 bits", "count"),
            &category_bars(&stats::low_bits_histogram(p, 4)),
        )?;
        render_bars(
            &dir.join("bit_ones.png"),
            "Bit ones per position (p[i])",
            ("bit (0 = LSB)", "ones"),
            &category_bars(&stats::bit_ones_per_position(p, 8)),
        )?;
        written += 2;

        let lags = input.config.plot_autocorr_lags;
        let acf: Vec<Bar> = stats::autocorrelation(p, lags)
            .iter()
            .enumerate()
            .map(|(i, &r)| (i as f64 + 0.6, i as f64 + 1.4, r))
            .collect();
        render_bars(
            &dir.join("autocorr.png"),
            &format!("Autocorrelation (lags 1..{lags})"),
            ("lag", "r"),
            &acf,
        )?;
        written += 1;

        match Permutation::new(p.to_vec()) {
            Ok(perm) => {
                let dist: Vec<Bar> = cycle_length_distribution(&perm.cycle_lengths())
                    .iter()
                    .map(|&(len, count)| (len as f64 - 0.4, len as f64 + 0.4, count as f64))
                    .collect();
                render_bars(
                    &dir.join("cycle_lengths.png"),
                    "Permutation cycle length distribution",
                    ("cycle length", "count"),
                    &dist,
                )?;
                written += 1;
            }
            Err(e) => log::warn!("cycle_lengths.png skipped: {e}"),
        }

        render_lines(
            &dir.join("ftable_curves.png"),
            "Fade table samples",
            ("i", "value"),
            &[
                ("hi (f[i])", indexed_points(input.f_hi), BLUE),
                ("lo (f[i+1])", indexed_points(input.f_lo), RED),
            ],
        )?;
        written += 1;

        let d = displacement(p);
        let d_points: Vec<(f64, f64)> = d
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v as f64))
            .collect();
        render_lines(
            &dir.join("displacement_line.png"),
            "Displacement d[i] = p[i] - i (wrapped)",
            ("i", "d[i]"),
            &[("d", d_points, BLUE)],
        )?;
        render_bars(
            &dir.join("displacement_hist.png"),
            "Displacement histogram",
            ("d", "count"),
            &histogram(&d, -132.0, 132.0, 33),
        )?;
        written += 2;

        let fft_p = spectrum_points(&magnitude_spectrum_of(p));
        render_lines(
            &dir.join("fft_p.png"),
            "FFT magnitude of p[i] (zero-mean)",
            ("frequency (cycles/sample)", "|P|"),
            &[("|P|", fft_p, BLUE)],
        )?;
        let fft_d = spectrum_points(&magnitude_spectrum_of(d.as_slice()));
        render_lines(
            &dir.join("fft_disp.png"),
            "FFT magnitude of displacement d[i] (zero-mean)",
            ("frequency (cycles/sample)", "|D|"),
            &[("|D|", fft_d, BLUE)],
        )?;
        written += 2;

        log::debug!("{written} plot(s) rendered into {}", dir.display());
        Ok(written)
    }

    // -----------------------------------------------------------------------
    // Series helpers
    // -----------------------------------------------------------------------

    fn indexed_points(values: &[u32]) -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v as f64))
            .collect()
    }

    fn category_bars(counts: &[u64]) -> Vec<Bar> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as f64 - 0.4, i as f64 + 0.4, c as f64))
            .collect()
    }

    fn spectrum_points(spectrum: &[tableaudit_core::SpectrumBin]) -> Vec<(f64, f64)> {
        spectrum
            .iter()
            .map(|b| (b.frequency, b.magnitude))
            .collect()
    }

    /// Equal-width bins over `[min, max]`; `max` itself lands in the last bin.
    pub(super) fn histogram(values: &[i32], min: f64, max: f64, bins: usize) -> Vec<Bar> {
        if bins == 0 || max <= min {
            return Vec::new();
        }
        let width = (max - min) / bins as f64;
        let mut counts = vec![0u64; bins];
        for &v in values {
            let v = v as f64;
            if v < min || v > max {
                continue;
            }
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                (
                    min + i as f64 * width,
                    min + (i + 1) as f64 * width,
                    c as f64,
                )
            })
            .collect()
    }

    /// Range covering zero and every value, padded by 5%.
    pub(super) fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let span = hi - lo;
        let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
        (lo - if lo < 0.0 { pad } else { 0.0 })..(hi + pad)
    }

    // -----------------------------------------------------------------------
    // Charts
    // -----------------------------------------------------------------------

    fn render_scatter(
        out_path: &Path,
        caption: &str,
        points: &[(f64, f64)],
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(out_path, WIDE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                padded_range(points.iter().map(|p| p.0)),
                padded_range(points.iter().map(|p| p.1)),
            )?;

        chart.configure_mesh().x_desc("i").y_desc("p[i]").draw()?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    /// One black cell at `(i, p[i])`.
    fn render_matrix(out_path: &Path, values: &[u32]) -> Result<(), Box<dyn Error>> {
        let n = values.len().max(1) as i32;
        let root = BitMapBackend::new(out_path, SQUARE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Permutation matrix (row=p[i], col=i)", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0i32..n, 0i32..n)?;

        chart.configure_mesh().x_desc("i").y_desc("p[i]").draw()?;
        chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
            let (x, y) = (i as i32, v as i32);
            Rectangle::new([(x, y), (x + 1, y + 1)], BLACK.filled())
        }))?;

        root.present()?;
        Ok(())
    }

    fn render_bars(
        out_path: &Path,
        caption: &str,
        (x_desc, y_desc): (&str, &str),
        bars: &[Bar],
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(out_path, WIDE).into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = padded_range(bars.iter().flat_map(|b| [b.0, b.1]));
        let y_range = padded_range(bars.iter().map(|b| b.2));
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(
            bars.iter()
                .map(|&(x0, x1, h)| Rectangle::new([(x0, 0.0), (x1, h)], BLUE.mix(0.6).filled())),
        )?;

        root.present()?;
        Ok(())
    }

    fn render_lines(
        out_path: &Path,
        caption: &str,
        (x_desc, y_desc): (&str, &str),
        series: &[(&str, Vec<(f64, f64)>, RGBColor)],
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(out_path, WIDE).into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = padded_range(series.iter().flat_map(|s| s.1.iter().map(|p| p.0)));
        let y_range = padded_range(series.iter().flat_map(|s| s.1.iter().map(|p| p.1)));
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        for (label, points, color) in series {
            let color = *color;
            chart
                .draw_series(LineSeries::new(points.iter().copied(), &color))?
                .label(*label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableaudit_core::{AuditConfig, run_audit};

    fn audit() -> tableaudit_core::Audit {
        let cfg = AuditConfig {
            expected_len: 4,
            ..AuditConfig::default()
        };
        let src = "function ptable() { return 513; return 259; return 768; return 0; }\n\
                   function ftable() { return 1; return 4098; return 8195; return 12292; }";
        run_audit(src, &cfg).unwrap()
    }

    #[cfg(not(feature = "plots"))]
    #[test]
    fn test_without_feature_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PlotSink::new(dir.path());
        let err = sink.emit(&audit().diagnostics_input()).unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
        assert!(err.to_string().ends_with("unavailable"));
    }

    #[cfg(feature = "plots")]
    #[test]
    fn test_histogram_bins_match_fixed_range() {
        let bins = render::histogram(&[-128, 0, 127, 127, 500], -132.0, 132.0, 33);
        assert_eq!(bins.len(), 33);
        assert_eq!(bins[0].2, 1.0);
        assert_eq!(bins[16].2, 1.0);
        assert_eq!(bins[32].2, 2.0);
        // Out-of-range values are dropped.
        assert_eq!(bins.iter().map(|b| b.2).sum::<f64>(), 4.0);
        assert_eq!(bins[0].0, -132.0);
        assert_eq!(bins[32].1, 132.0);
    }

    #[cfg(feature = "plots")]
    #[test]
    fn test_padded_range_includes_zero() {
        let r = render::padded_range([3.0, 5.0].into_iter());
        assert_eq!(r.start, 0.0);
        assert!(r.end > 5.0);

        let flat = render::padded_range(std::iter::empty());
        assert_eq!(flat, 0.0..1.0);

        let neg = render::padded_range([-2.0, 2.0].into_iter());
        assert!(neg.start < -2.0);
    }

    #[cfg(feature = "plots")]
    #[test]
    fn test_renders_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        let sink = PlotSink::new(&out);
        sink.emit(&audit().diagnostics_input()).unwrap();
        for name in ["permutation_scatter.png", "cycle_lengths.png", "fft_disp.png"] {
            assert!(out.join(name).exists(), "{name} missing");
        }
    }
}
