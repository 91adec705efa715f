//! Accumulate polygenic scores from per-variant effect weights.
//!
//! grip score --bed cohort.bed --weights effects.tsv --out scores.tsv
//!
//! Weight file: one line per target marker,
//! `marker_index  direction  w1 [w2 ...]`
//! with a 1-based marker index and direction 1 (keep) or 0 (flip).

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use grip_core::{accumulate_scores, column_summaries, Direction, MissingPolicy};
use grip_linalg::DenseMatrix;

use super::common::open_bundle;

#[derive(Clone, Copy, ValueEnum)]
enum ImputeArg {
    /// Coerce missing calls to zero
    Zero,
    /// Replace missing calls with twice the allele frequency
    Mean,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Packed genotype store (.bed or .raw) with .bim/.fam siblings
    #[arg(long)]
    bed: PathBuf,

    /// File of sample IIDs to keep (one per line)
    #[arg(long)]
    keep: Option<PathBuf>,

    /// Per-variant weight file
    #[arg(long)]
    weights: PathBuf,

    /// Missing-call policy
    #[arg(long, value_enum, default_value = "mean")]
    impute: ImputeArg,

    /// Output TSV path
    #[arg(long)]
    out: PathBuf,
}

struct WeightTable {
    cls: Vec<usize>,
    directions: Vec<Direction>,
    /// nc x nprs effect matrix.
    weights: DenseMatrix,
}

fn parse_weights(path: &Path) -> Result<WeightTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read weight file: {}", path.display()))?;

    let mut cls = Vec::new();
    let mut directions = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut nprs = 0usize;

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            bail!("Weight file line {} has fewer than 3 fields", line_num + 1);
        }
        let col: usize = fields[0]
            .parse()
            .with_context(|| format!("Bad marker index on line {}", line_num + 1))?;
        let dir = match fields[1] {
            "1" => Direction::Keep,
            "0" => Direction::Flip,
            other => bail!("Bad direction '{}' on line {}", other, line_num + 1),
        };
        let ws: Vec<f64> = fields[2..]
            .iter()
            .map(|f| {
                f.parse()
                    .with_context(|| format!("Bad weight on line {}", line_num + 1))
            })
            .collect::<Result<_>>()?;
        if nprs == 0 {
            nprs = ws.len();
        } else if ws.len() != nprs {
            bail!(
                "Weight file line {} has {} effects, expected {}",
                line_num + 1,
                ws.len(),
                nprs
            );
        }
        cls.push(col);
        directions.push(dir);
        rows.push(ws);
    }
    if cls.is_empty() {
        bail!("Weight file {} is empty", path.display());
    }

    let mut weights = DenseMatrix::zeros(cls.len(), nprs);
    for (i, row) in rows.iter().enumerate() {
        for (j, &w) in row.iter().enumerate() {
            weights.set(i, j, w);
        }
    }
    Ok(WeightTable {
        cls,
        directions,
        weights,
    })
}

pub fn run(args: ScoreArgs) -> Result<()> {
    info!("=== Polygenic scores ===");
    let bundle = open_bundle(&args.bed, args.keep.as_deref())?;
    let table = parse_weights(&args.weights)?;
    info!(
        "{} target markers x {} effect columns",
        table.cls.len(),
        table.weights.ncols()
    );

    let summaries = column_summaries(&bundle.store, &bundle.rws, &table.cls)?;
    let afs: Vec<f64> = summaries.iter().map(|s| s.af).collect();

    let missing = match args.impute {
        ImputeArg::Zero => MissingPolicy::Zero,
        ImputeArg::Mean => MissingPolicy::MeanImpute,
    };
    let prs = accumulate_scores(
        &bundle.store,
        &bundle.rws,
        &table.cls,
        &table.weights,
        &afs,
        &table.directions,
        missing,
    )?;

    let f = std::fs::File::create(&args.out)?;
    let mut w = BufWriter::new(f);
    write!(w, "iid")?;
    for j in 0..prs.ncols() {
        write!(w, "\tscore{}", j + 1)?;
    }
    writeln!(w)?;
    for (r, iid) in bundle.subset_ids().iter().enumerate() {
        write!(w, "{}", iid)?;
        for j in 0..prs.ncols() {
            write!(w, "\t{:.6}", prs.get(r, j))?;
        }
        writeln!(w)?;
    }
    w.flush()?;

    info!("Scores written to {}", args.out.display());
    Ok(())
}
