//! Estimate marker effects by ridge regression (GSRU).
//!
//! grip ridge --bed cohort.bed --lambda 100 --out effects.tsv
//!
//! The phenotype comes from column 6 of the .fam file, or from
//! --pheno-file (TSV of `IID  value`).

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use grip_core::{column_summaries, solve_ridge, RidgeOptions};

use super::common::{open_bundle, parse_column_list, Bundle};

#[derive(Args)]
pub struct RidgeArgs {
    /// Packed genotype store (.bed or .raw) with .bim/.fam siblings
    #[arg(long)]
    bed: PathBuf,

    /// File of sample IIDs to keep (one per line)
    #[arg(long)]
    keep: Option<PathBuf>,

    /// File of 1-based marker indices to fit (default: all)
    #[arg(long)]
    cols: Option<PathBuf>,

    /// Phenotype file (TSV: IID value); default is fam column 6
    #[arg(long)]
    pheno_file: Option<PathBuf>,

    /// Ridge penalty applied to every marker
    #[arg(long)]
    lambda: f64,

    /// Convergence tolerance
    #[arg(long, default_value = "1e-8")]
    tol: f64,

    /// Maximum number of sweeps
    #[arg(long, default_value = "100")]
    max_iter: usize,

    /// Hold the standardized columns in memory between sweeps
    #[arg(long)]
    cache: bool,

    /// Output TSV path
    #[arg(long)]
    out: PathBuf,
}

fn phenotype_vector(bundle: &Bundle, pheno_file: Option<&Path>) -> Result<Vec<f64>> {
    match pheno_file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read phenotype file: {}", path.display()))?;
            let mut by_iid: HashMap<String, f64> = HashMap::new();
            for (line_num, line) in contents.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 2 {
                    bail!(
                        "Phenotype file line {} has fewer than 2 fields",
                        line_num + 1
                    );
                }
                let value: f64 = fields[1]
                    .parse()
                    .with_context(|| format!("Bad phenotype on line {}", line_num + 1))?;
                by_iid.insert(fields[0].to_string(), value);
            }
            bundle
                .subset_ids()
                .iter()
                .map(|iid| {
                    by_iid
                        .get(iid)
                        .copied()
                        .with_context(|| format!("No phenotype for sample '{}'", iid))
                })
                .collect()
        }
        None => {
            let y: Vec<f64> = bundle.rws.iter().map(|&r| bundle.fam[r - 1].pheno).collect();
            if y.iter().any(|v| v.is_nan()) {
                bail!("Missing phenotype in fam column 6; supply --pheno-file");
            }
            Ok(y)
        }
    }
}

pub fn run(args: RidgeArgs) -> Result<()> {
    info!("=== Ridge marker effects (GSRU) ===");
    let bundle = open_bundle(&args.bed, args.keep.as_deref())?;

    let cls: Vec<usize> = match &args.cols {
        Some(path) => parse_column_list(path)?,
        None => (1..=bundle.store.n_markers()).collect(),
    };
    let y = phenotype_vector(&bundle, args.pheno_file.as_deref())?;

    let summaries = column_summaries(&bundle.store, &bundle.rws, &cls)?;
    let means: Vec<f64> = summaries.iter().map(|s| s.mean()).collect();
    let sds: Vec<f64> = summaries.iter().map(|s| s.sd()).collect();
    let lambda = vec![args.lambda; cls.len()];
    let s0 = vec![0.0; cls.len()];

    let opts = RidgeOptions {
        tol: args.tol,
        max_iter: args.max_iter,
        cache_columns: args.cache,
    };
    let sol = solve_ridge(
        &bundle.store,
        &bundle.rws,
        &cls,
        &means,
        &sds,
        &lambda,
        &y,
        &s0,
        &opts,
    )?;

    info!(
        "{} after {} sweeps (delta {:.3e})",
        if sol.converged {
            "Converged"
        } else {
            "Stopped"
        },
        sol.iterations,
        sol.delta
    );

    let f = std::fs::File::create(&args.out)?;
    let mut w = BufWriter::new(f);
    writeln!(w, "marker\teffect")?;
    for (&col, coef) in cls.iter().zip(sol.coefficients.iter()) {
        writeln!(w, "{}\t{:.10e}", bundle.bim[col - 1].id, coef)?;
    }
    w.flush()?;

    info!("Effects written to {}", args.out.display());
    Ok(())
}
