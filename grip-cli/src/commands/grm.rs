//! Build a genomic relationship matrix.
//!
//! grip grm --bed cohort.bed --model additive --out-prefix cohort

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use tracing::info;

use grip_core::{build_grm, GrmModel, GrmOptions};
use grip_geno::grm_io::{write_grm, write_sample_ids};

use super::common::{open_bundle, parse_column_list, with_suffix};

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Additive,
    Dominance,
    EpistasisProduct,
    EpistasisHadamard,
}

impl From<ModelArg> for GrmModel {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::Additive => GrmModel::Additive,
            ModelArg::Dominance => GrmModel::Dominance,
            ModelArg::EpistasisProduct => GrmModel::EpistasisProduct,
            ModelArg::EpistasisHadamard => GrmModel::EpistasisHadamard,
        }
    }
}

#[derive(Args)]
pub struct GrmArgs {
    /// Packed genotype store (.bed or .raw) with .bim/.fam siblings
    #[arg(long)]
    bed: PathBuf,

    /// File of sample IIDs to keep (one per line)
    #[arg(long)]
    keep: Option<PathBuf>,

    /// Genetic model
    #[arg(long, value_enum, default_value = "additive")]
    model: ModelArg,

    /// Markers loaded per panel
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// File of 1-based marker indices (default: all)
    #[arg(long)]
    cols: Option<PathBuf>,

    /// Second marker set for the epistasis product model
    #[arg(long)]
    cols_b: Option<PathBuf>,

    /// Output file prefix (writes <prefix>.grm.bin and <prefix>.grm.id)
    #[arg(long)]
    out_prefix: PathBuf,
}

pub fn run(args: GrmArgs) -> Result<()> {
    info!("=== Genomic relationship matrix ===");
    let bundle = open_bundle(&args.bed, args.keep.as_deref())?;

    let cls: Vec<usize> = match &args.cols {
        Some(path) => parse_column_list(path)?,
        None => (1..=bundle.store.n_markers()).collect(),
    };
    let cls_b = match &args.cols_b {
        Some(path) => Some(parse_column_list(path)?),
        None => None,
    };

    let model: GrmModel = args.model.into();
    let opts = GrmOptions {
        model,
        block_size: args.block_size,
    };
    let grm = build_grm(
        &bundle.store,
        &bundle.rws,
        &cls,
        cls_b.as_deref(),
        &opts,
    )?;

    let bin_path = with_suffix(&args.out_prefix, ".grm.bin");
    let id_path = with_suffix(&args.out_prefix, ".grm.id");
    write_grm(&grm, &bin_path, model == GrmModel::EpistasisHadamard)?;
    write_sample_ids(&bundle.subset_ids(), &id_path)?;

    info!(
        "GRM written: {} x {} doubles to {}",
        grm.nrows(),
        grm.ncols(),
        bin_path.display()
    );
    Ok(())
}
