//! Blocked genomic relationship matrix construction.
//!
//! Streams `block_size` standardized columns at a time into a panel
//! `W` and accumulates `G <- G + W * W'`. Finalization divides by
//! `trace(G) / nr` and mirrors the upper triangle onto the lower, so
//! `G[i,j] == G[j,i]` holds exactly.

use rayon::prelude::*;
use tracing::info;

use grip_geno::BedStore;
use grip_linalg::DenseMatrix;

use crate::error::{check_subset, KernelError, Result};
use crate::transform::{ColumnPipeline, Direction, MissingPolicy, Scaling};

/// Genetic model for the relationship matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrmModel {
    Additive,
    /// Caller-pre-encoded dominance dosages; same standardized-panel
    /// path as additive.
    Dominance,
    /// Pairwise epistasis: per-column element-wise product of two
    /// column sets.
    EpistasisProduct,
    /// Additive matrix whose on-disk image is squared element-wise.
    EpistasisHadamard,
}

#[derive(Debug, Clone, Copy)]
pub struct GrmOptions {
    pub model: GrmModel,
    /// Columns loaded per panel.
    pub block_size: usize,
}

impl Default for GrmOptions {
    fn default() -> Self {
        Self {
            model: GrmModel::Additive,
            block_size: 512,
        }
    }
}

/// The standardization every GRM panel column goes through: keep the
/// missing sentinel until scaling zeroes it.
const PANEL_PIPELINE: ColumnPipeline = ColumnPipeline {
    missing: MissingPolicy::Sentinel,
    direction: Direction::Keep,
    scaling: Scaling::Standardize,
};

/// Build the relationship matrix over `(rws, cls1)`.
///
/// `cls2` is required by [`GrmModel::EpistasisProduct`] (same length
/// as `cls1`, paired column-wise) and rejected by the other models.
/// Returns the normalized `nr x nr` matrix; writing it to disk
/// (squared for the Hadamard model) is the caller's concern.
pub fn build_grm(
    store: &BedStore,
    rws: &[usize],
    cls1: &[usize],
    cls2: Option<&[usize]>,
    opts: &GrmOptions,
) -> Result<DenseMatrix> {
    check_subset("row", rws, store.n_samples())?;
    check_subset("column", cls1, store.n_markers())?;
    if opts.block_size == 0 {
        return Err(KernelError::Shape("block size must be positive".into()));
    }
    match (opts.model, cls2) {
        (GrmModel::EpistasisProduct, Some(cls2)) => {
            check_subset("column", cls2, store.n_markers())?;
            if cls2.len() != cls1.len() {
                return Err(KernelError::Shape(format!(
                    "epistasis column sets differ in length: {} vs {}",
                    cls1.len(),
                    cls2.len()
                )));
            }
        }
        (GrmModel::EpistasisProduct, None) => {
            return Err(KernelError::Shape(
                "epistasis product model needs a second column set".into(),
            ));
        }
        (_, Some(_)) => {
            return Err(KernelError::Shape(
                "second column set is only valid for the epistasis product model".into(),
            ));
        }
        (_, None) => {}
    }

    let nr = rws.len();
    let nc = cls1.len();
    info!(
        "Building GRM: {} samples x {} markers, blocks of {}",
        nr, nc, opts.block_size
    );

    let mut g = DenseMatrix::zeros(nr, nr);
    for block in (0..nc).step_by(opts.block_size) {
        let cols = &cls1[block..(block + opts.block_size).min(nc)];
        let mut panel = load_panel(store, rws, cols)?;

        if opts.model == GrmModel::EpistasisProduct {
            let cols2 = &cls2.unwrap()[block..(block + opts.block_size).min(nc)];
            let panel2 = load_panel(store, rws, cols2)?;
            for (w1, w2) in panel.iter_mut().zip(panel2.iter()) {
                for (x, y) in w1.iter_mut().zip(w2.iter()) {
                    *x *= y;
                }
            }
        }

        let w = DenseMatrix::from_columns(&panel);
        let wwt = w.mat_mul(&w.transpose());
        g.add_assign(&wwt);
    }

    finalize(&mut g);
    Ok(g)
}

/// Load and standardize one panel, column-parallel (disjoint slots).
fn load_panel(store: &BedStore, rws: &[usize], cols: &[usize]) -> Result<Vec<Vec<f64>>> {
    cols.par_iter()
        .map(|&col| {
            let full = store.column_dosages(col)?;
            let mut sub: Vec<f64> = rws.iter().map(|&r| full[r - 1]).collect();
            PANEL_PIPELINE.apply(&mut sub, 0.0);
            Ok(sub)
        })
        .collect()
}

/// Divide by `trace / nr` and force exact symmetry.
fn finalize(g: &mut DenseMatrix) {
    let nr = g.nrows();
    let scale = g.trace() / nr as f64;
    if scale != 0.0 {
        g.scale_in_place(1.0 / scale);
    }
    for i in 0..nr {
        for j in (i + 1)..nr {
            let v = g.get(i, j);
            g.set(j, i, v);
        }
    }
}
