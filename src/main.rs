use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covrisk::analyze::Analysis;
use covrisk::cli::{self, Style};
use covrisk::gate::GateOptions;
use covrisk::score::{Options, DEFAULT_CONTRACT_CRAP_THRESHOLD, DEFAULT_CRAP_THRESHOLD};

/// covrisk: change-risk scores for Go functions from complexity and coverage.
#[derive(Parser)]
#[command(name = "covrisk", version, about)]
struct Cli {
    /// Module root containing go.mod.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every function and print the risk report.
    Report {
        /// Go package patterns to analyze.
        #[arg(default_value = "./...")]
        patterns: Vec<String>,

        /// Existing coverage profile. If omitted, `go test` generates one.
        #[arg(long)]
        coverprofile: Option<PathBuf>,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        format: Style,

        /// CRAP score at or above which a function counts toward the CRAPload.
        #[arg(long, default_value_t = DEFAULT_CRAP_THRESHOLD)]
        crap_threshold: f64,

        /// Contract CRAP score at or above which a function counts toward
        /// the contract CRAPload.
        #[arg(long, default_value_t = DEFAULT_CONTRACT_CRAP_THRESHOLD)]
        contract_threshold: f64,

        /// Fail when the CRAPload exceeds this value (0 = report only).
        #[arg(long, default_value_t = 0)]
        max_crapload: usize,

        /// Fail when the contract CRAPload exceeds this value (0 = report only).
        #[arg(long, default_value_t = 0)]
        max_contract_crapload: usize,

        /// Score functions in generated files too.
        #[arg(long)]
        include_generated: bool,
    },

    /// Show per-function statement coverage from a profile.
    Coverage {
        /// Path to the coverage profile.
        coverprofile: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            patterns,
            coverprofile,
            format,
            crap_threshold,
            contract_threshold,
            max_crapload,
            max_contract_crapload,
            include_generated,
        } => {
            let analysis = Analysis {
                root: cli.root,
                patterns,
                profile: coverprofile,
                options: Options {
                    crap_threshold,
                    contract_crap_threshold: contract_threshold,
                    ignore_generated: !include_generated,
                },
            };
            let gate = GateOptions {
                max_crapload,
                max_contract_crapload,
            };

            let outcome = cli::cmd_report(&analysis, format, &gate)?;
            print!("{}", outcome.output);
            if gate.is_enforcing() {
                eprint!("{}", outcome.gate.format_text());
            }
            if let Err(violation) = outcome.gate.verdict() {
                eprintln!("Error: {violation}");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Coverage { coverprofile } => {
            print!("{}", cli::cmd_coverage(&cli.root, &coverprofile)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
