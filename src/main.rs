//! `svcorrect`: correction and merging of structural-variant breakend records.

pub mod bnd;
pub mod classify;
pub mod cluster;
pub mod common;
pub mod correct;
pub mod emit;
pub mod err;
pub mod filter_algebra;
pub mod merge;
pub mod name_map;
pub mod pair;
pub mod quality_filter;
pub mod record;
pub mod recordio;
pub mod rewrite_cross_chrom;
pub mod rewrite_same_chrom;
pub mod select;
pub mod similarity;

use clap::{Parser, Subcommand};
use console::{Emoji, Term};

use err::AppError;

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Correction and merging of structural-variant breakend records",
    long_about = "Classifies and rewrites caller-specific breakend (BND) records into \
        DEL/DUP/INV/TRA form, and merges corrected records from multiple callers or \
        samples into one consistently-columned file."
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify, pair, and rewrite BND records in a single input file.
    Correct(correct::Args),
    /// Cluster and merge corrected records from multiple input files.
    Merge(merge::Args),
}

fn try_main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || match &cli.command {
        Commands::Correct(args) => correct::run(&cli.common, args),
        Commands::Merge(args) => merge::run(&cli.common, args),
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(())
}

fn main() -> std::process::ExitCode {
    use std::process::Termination;
    match try_main() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}
