//! CLI for tableaudit: statistical audit of embedded permutation and fade tables.

mod commands;
mod sinks;

use clap::{ArgAction, Parser, Subcommand};
use tableaudit_core::AuditError;

#[derive(Parser)]
#[command(name = "tableaudit")]
#[command(about = "tableaudit: statistical audit of embedded permutation and fade tables")]
#[command(version = tableaudit_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract both tables and print the full diagnostic report.
    /// Extraction or parse failures abort with no partial report.
    Audit {
        /// Contract source containing the table functions
        source: String,

        /// JSON config file (function names, table length, lags)
        #[arg(long)]
        config: Option<String>,

        /// Override the number of autocorrelation lags reported
        #[arg(long)]
        lags: Option<usize>,

        /// Write the report as JSON
        #[arg(long)]
        output: Option<String>,

        /// Render diagnostic plots (needs the `plots` feature)
        #[arg(long)]
        plots: bool,

        /// Output directory for plots
        #[arg(long, default_value = ".")]
        outdir: String,
    },

    /// Print index, raw literal, hi and lo for every entry of one table
    Dump {
        /// Contract source containing the table function
        source: String,

        /// Function whose `return N;` literals are dumped
        #[arg(long, default_value = "ptable")]
        function: String,

        /// Packing layout used to split each literal
        #[arg(long, default_value = "permutation", value_parser = ["permutation", "fade"])]
        layout: String,

        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "csv"])]
        format: String,

        /// Expected entry count (0 = accept any)
        #[arg(long, default_value = "0")]
        expect: usize,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Audit {
            source,
            config,
            lags,
            output,
            plots,
            outdir,
        } => commands::audit::run(commands::audit::AuditCommandConfig {
            source_path: &source,
            config_path: config.as_deref(),
            lags,
            output_path: output.as_deref(),
            plots,
            plot_dir: &outdir,
        }),
        Commands::Dump {
            source,
            function,
            layout,
            format,
            expect,
        } => commands::dump::run(commands::dump::DumpCommandConfig {
            source_path: &source,
            function: &function,
            layout: commands::parse_layout(&layout),
            csv: format == "csv",
            expect: (expect > 0).then_some(expect),
        }),
    };

    if let Err(e) = result {
        match e.chain().find_map(|c| c.downcast_ref::<AuditError>()) {
            Some(audit) => eprintln!("error ({} stage): {e:#}", audit.stage()),
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_audit_flags() {
        let cli = Cli::try_parse_from([
            "tableaudit",
            "-vv",
            "audit",
            "PerlinNoise.sol",
            "--plots",
            "--outdir",
            "out",
            "--lags",
            "16",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Audit {
                source,
                plots,
                outdir,
                lags,
                output,
                ..
            } => {
                assert_eq!(source, "PerlinNoise.sol");
                assert!(plots);
                assert_eq!(outdir, "out");
                assert_eq!(lags, Some(16));
                assert!(output.is_none());
            }
            Commands::Dump { .. } => panic!("expected audit"),
        }
    }

    #[test]
    fn test_parse_dump_defaults() {
        let cli = Cli::try_parse_from(["tableaudit", "dump", "a.sol"]).unwrap();
        match cli.command {
            Commands::Dump {
                function,
                layout,
                format,
                expect,
                ..
            } => {
                assert_eq!(function, "ptable");
                assert_eq!(layout, "permutation");
                assert_eq!(format, "table");
                assert_eq!(expect, 0);
            }
            Commands::Audit { .. } => panic!("expected dump"),
        }
    }

    #[test]
    fn test_rejects_unknown_layout() {
        assert!(Cli::try_parse_from(["tableaudit", "dump", "a.sol", "--layout", "zigzag"]).is_err());
    }
}
