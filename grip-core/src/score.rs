//! Polygenic-score accumulation.
//!
//! For each target column the standard per-column pipeline runs, then
//! `prs[:, j] += g * s[col, j]` for every effect vector j. Workers
//! accumulate into private partials that are summed after the
//! parallel region, so the result is invariant under thread count.

use rayon::prelude::*;

use grip_geno::BedStore;
use grip_linalg::DenseMatrix;

use crate::error::{check_len, check_subset, KernelError, Result};
use crate::transform::{subset_rows, ColumnPipeline, Direction, MissingPolicy, Scaling};

/// Accumulate polygenic scores.
///
/// `weights` is `nc x nprs`: row i carries the effect sizes of column
/// `cls[i]` across the score columns. `afs[i]` and `directions[i]`
/// are the per-column frequency and allele direction; `missing` must
/// be [`MissingPolicy::Zero`] or [`MissingPolicy::MeanImpute`].
/// Returns the `nr x nprs` score matrix.
pub fn accumulate_scores(
    store: &BedStore,
    rws: &[usize],
    cls: &[usize],
    weights: &DenseMatrix,
    afs: &[f64],
    directions: &[Direction],
    missing: MissingPolicy,
) -> Result<DenseMatrix> {
    check_subset("row", rws, store.n_samples())?;
    check_subset("column", cls, store.n_markers())?;
    check_len("weights", weights.nrows(), cls.len())?;
    check_len("af", afs.len(), cls.len())?;
    check_len("direction", directions.len(), cls.len())?;
    if missing == MissingPolicy::Sentinel {
        return Err(KernelError::Shape(
            "score accumulation needs a numeric missing policy".into(),
        ));
    }

    let nr = rws.len();
    let nprs = weights.ncols();

    // Column-major per-thread partials, reduced after the loop.
    let flat = cls
        .par_iter()
        .enumerate()
        .map(|(i, &col)| -> Result<(usize, Vec<f64>)> {
            let full = store.column_dosages(col)?;
            let mut g = subset_rows(&full, rws);
            let pipe = ColumnPipeline {
                missing,
                direction: directions[i],
                scaling: Scaling::None,
            };
            pipe.apply(&mut g, afs[i]);
            Ok((i, g))
        })
        .try_fold(
            || vec![0.0f64; nr * nprs],
            |mut acc, item| {
                let (i, g) = item?;
                for j in 0..nprs {
                    let w = weights.get(i, j);
                    if w != 0.0 {
                        let slot = &mut acc[j * nr..(j + 1) * nr];
                        for (out, &gi) in slot.iter_mut().zip(g.iter()) {
                            *out += gi * w;
                        }
                    }
                }
                Ok::<Vec<f64>, KernelError>(acc)
            },
        )
        .try_reduce(
            || vec![0.0f64; nr * nprs],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                Ok::<Vec<f64>, KernelError>(a)
            },
        )?;

    let mut prs = DenseMatrix::zeros(nr, nprs);
    for j in 0..nprs {
        prs.set_col(j, &flat[j * nr..(j + 1) * nr]);
    }
    Ok(prs)
}
