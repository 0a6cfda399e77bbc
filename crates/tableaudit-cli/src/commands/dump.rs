use std::fmt::{self, Write as _};

use anyhow::Context;
use tableaudit_core::{PackedLayout, PackedTable, TableSpec, extract_table};

pub struct DumpCommandConfig<'a> {
    pub source_path: &'a str,
    pub function: &'a str,
    pub layout: PackedLayout,
    pub csv: bool,
    /// `None` accepts any entry count.
    pub expect: Option<usize>,
}

pub fn run(cfg: DumpCommandConfig<'_>) -> anyhow::Result<()> {
    let source = super::load_source(cfg.source_path)?;
    let spec = TableSpec {
        function: cfg.function.to_string(),
        layout: cfg.layout,
        expected_len: cfg.expect,
    };
    let table = extract_table(&source, &spec)
        .with_context(|| format!("failed to dump `{}`", cfg.function))?;

    if cfg.csv {
        print!("{}", render_csv(&table)?);
    } else {
        print!("{}", render_table(&table)?);
    }
    Ok(())
}

pub fn render_csv(table: &PackedTable) -> Result<String, fmt::Error> {
    let mut out = String::from("index,raw,hi,lo\n");
    for (i, raw) in table.raw.iter().enumerate() {
        writeln!(
            out,
            "{i},{raw},{},{}",
            table.decoded.hi[i], table.decoded.lo[i]
        )?;
    }
    Ok(out)
}

pub fn render_table(table: &PackedTable) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{} ({} entries)", table.function, table.len())?;
    writeln!(out, "{:>6} {:>12} {:>6} {:>6}", "index", "raw", "hi", "lo")?;
    writeln!(out, "{:-<33}", "")?;
    for (i, raw) in table.raw.iter().enumerate() {
        writeln!(
            out,
            "{i:>6} {raw:>12} {:>6} {:>6}",
            table.decoded.hi[i], table.decoded.lo[i]
        )?;
    }
    Ok(out)
}
