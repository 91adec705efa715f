//! Per-variant call counts and allele frequencies.
//!
//! grip summary --bed cohort.bed --out cohort.freq.tsv

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use grip_core::column_summaries;

use super::common::{open_bundle, parse_column_list};

#[derive(Args)]
pub struct SummaryArgs {
    /// Packed genotype store (.bed or .raw) with .bim/.fam siblings
    #[arg(long)]
    bed: PathBuf,

    /// File of sample IIDs to keep (one per line)
    #[arg(long)]
    keep: Option<PathBuf>,

    /// File of 1-based marker indices to summarize (default: all)
    #[arg(long)]
    cols: Option<PathBuf>,

    /// Output TSV path
    #[arg(long)]
    out: PathBuf,
}

pub fn run(args: SummaryArgs) -> Result<()> {
    info!("=== Variant summary ===");
    let bundle = open_bundle(&args.bed, args.keep.as_deref())?;

    let cls: Vec<usize> = match &args.cols {
        Some(path) => parse_column_list(path)?,
        None => (1..=bundle.store.n_markers()).collect(),
    };

    let summaries = column_summaries(&bundle.store, &bundle.rws, &cls)?;

    let f = std::fs::File::create(&args.out)?;
    let mut w = BufWriter::new(f);
    writeln!(w, "marker\tchrom\tpos\tn0\tn1\tn2\tn_miss\taf")?;
    for (&col, s) in cls.iter().zip(summaries.iter()) {
        let bim = &bundle.bim[col - 1];
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.6}",
            bim.id, bim.chrom, bim.pos, s.n0, s.n1, s.n2, s.n_miss, s.af
        )?;
    }
    w.flush()?;

    info!("Wrote {} summaries to {}", cls.len(), args.out.display());
    Ok(())
}
