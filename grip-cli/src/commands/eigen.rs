//! Eigendecomposition of a stored relationship matrix.
//!
//! grip eigen --grm-prefix cohort --out-prefix cohort
//!
//! Reads <prefix>.grm.bin / <prefix>.grm.id, writes <prefix>.eigenval
//! (ascending) and <prefix>.eigenvec.bin (column-major doubles).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use grip_geno::grm_io::{
    read_grm, read_sample_ids, write_eigenvalues, write_eigenvectors,
};
use grip_linalg::sym_eigen;

use super::common::with_suffix;

#[derive(Args)]
pub struct EigenArgs {
    /// Prefix of the stored GRM (<prefix>.grm.bin, <prefix>.grm.id)
    #[arg(long)]
    grm_prefix: PathBuf,

    /// Output file prefix
    #[arg(long)]
    out_prefix: PathBuf,
}

pub fn run(args: EigenArgs) -> Result<()> {
    info!("=== GRM eigendecomposition ===");
    let ids = read_sample_ids(&with_suffix(&args.grm_prefix, ".grm.id"))?;
    let n = ids.len();
    let grm = read_grm(&with_suffix(&args.grm_prefix, ".grm.bin"), n)?;
    info!("Loaded {} x {} GRM", n, n);

    let eig = sym_eigen(&grm)?;

    write_eigenvalues(&eig.values, &with_suffix(&args.out_prefix, ".eigenval"))?;
    write_eigenvectors(
        &eig.vectors,
        &with_suffix(&args.out_prefix, ".eigenvec.bin"),
    )?;

    info!(
        "Spectrum written: smallest {:.4e}, largest {:.4e}",
        eig.values.first().copied().unwrap_or(0.0),
        eig.values.last().copied().unwrap_or(0.0)
    );
    Ok(())
}
