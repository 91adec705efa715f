//! grip: quantitative-genetics kernels over PLINK 2-bit stores.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grip",
    version,
    about = "Genomic relationships, scores, and marker-effect estimation from packed genotype stores",
    long_about = "Streams PLINK-packed 2-bit genotype columns into allele-frequency \n\
                  summaries, genomic relationship matrices, polygenic scores, a \n\
                  matrix-free ridge solver, and set-enrichment permutation tests."
)]
struct Cli {
    /// Number of threads to use
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-variant call counts and allele frequencies
    Summary(commands::summary::SummaryArgs),

    /// Build a genomic relationship matrix
    Grm(commands::grm::GrmArgs),

    /// Accumulate polygenic scores from per-variant weights
    Score(commands::score::ScoreArgs),

    /// Estimate marker effects by ridge regression (GSRU)
    Ridge(commands::ridge::RidgeArgs),

    /// Set-enrichment p-values from random contiguous windows
    SetTest(commands::set_test::SetTestArgs),

    /// Eigendecomposition of a stored relationship matrix
    Eigen(commands::eigen::EigenArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Set up thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .ok();

    tracing::info!("grip v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} threads", cli.threads);

    match cli.command {
        Commands::Summary(args) => commands::summary::run(args),
        Commands::Grm(args) => commands::grm::run(args),
        Commands::Score(args) => commands::score::run(args),
        Commands::Ridge(args) => commands::ridge::run(args),
        Commands::SetTest(args) => commands::set_test::run(args),
        Commands::Eigen(args) => commands::eigen::run(args),
    }
}
