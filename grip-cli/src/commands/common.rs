//! Shared loading logic for the genotype-backed subcommands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use grip_geno::meta::{parse_bim, parse_fam, rows_for_samples, BimEntry, FamEntry};
use grip_geno::{BedFormat, BedStore};

/// A genotype store with its companion metadata and the analysis row
/// subset.
pub struct Bundle {
    pub store: BedStore,
    pub fam: Vec<FamEntry>,
    pub bim: Vec<BimEntry>,
    /// 1-based rows of the analysis subset.
    pub rws: Vec<usize>,
}

impl Bundle {
    /// IIDs of the analysis subset, in `rws` order.
    pub fn subset_ids(&self) -> Vec<String> {
        self.rws
            .iter()
            .map(|&r| self.fam[r - 1].iid.clone())
            .collect()
    }
}

/// Open a `.bed`/`.raw` store with its `.bim`/`.fam` siblings.
///
/// `keep` optionally names a file of IIDs (one per line) selecting and
/// ordering the analysis subset; without it every sample is used in
/// file order.
pub fn open_bundle(bed: &Path, keep: Option<&Path>) -> Result<Bundle> {
    let format = BedFormat::from_path(bed).unwrap_or(BedFormat::Bed);
    let fam = parse_fam(&bed.with_extension("fam"))?;
    let bim = parse_bim(&bed.with_extension("bim"))?;
    if fam.is_empty() || bim.is_empty() {
        bail!("Empty fam or bim file next to {}", bed.display());
    }

    let store = BedStore::open(bed, fam.len(), bim.len(), format)
        .with_context(|| format!("Failed to open genotype store: {}", bed.display()))?;
    info!(
        "Opened {}: {} samples x {} markers",
        bed.display(),
        store.n_samples(),
        store.n_markers()
    );

    let rws = match keep {
        Some(path) => {
            let ids: Vec<String> = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read keep file: {}", path.display()))?
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            let rws = rows_for_samples(&fam, &ids)?;
            info!("Keeping {} of {} samples", rws.len(), fam.len());
            rws
        }
        None => (1..=fam.len()).collect(),
    };

    Ok(Bundle {
        store,
        fam,
        bim,
        rws,
    })
}

/// Parse a column-list file: 1-based marker indices, one per line.
pub fn parse_column_list(path: &Path) -> Result<Vec<usize>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read column list: {}", path.display()))?;
    let mut cols = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let col: usize = line
            .parse()
            .with_context(|| format!("Bad marker index on line {}", line_num + 1))?;
        cols.push(col);
    }
    if cols.is_empty() {
        bail!("Column list {} is empty", path.display());
    }
    Ok(cols)
}

/// Output path helper: `<prefix><suffix>`.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}
