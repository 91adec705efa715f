//! Matrix-free ridge regression by Gauss-Seidel with residual update.
//!
//! Solves `(W'W + diag(lambda)) s = W'y` where W is the standardized
//! genotype matrix, streamed column by column from the store instead
//! of materialized. The residual `e = y - W s` is kept current in
//! place: after each coordinate update `e -= w * (s_new - s_old)`.
//!
//! The coordinate loop is Gauss-Seidel, not Jacobi: each update
//! depends on the residual left by the previous column, so it must
//! not be parallelized across columns. The convergence trajectory is
//! deterministic and independent of thread count.

use grip_geno::BedStore;
use grip_linalg::DenseMatrix;

use crate::error::{check_len, check_subset, Result};
use crate::transform::{standardize_with, subset_rows};

#[derive(Debug, Clone)]
pub struct RidgeOptions {
    /// Convergence tolerance on `sum((s - s_old)^2) / sqrt(nc)`.
    pub tol: f64,
    /// Maximum number of full sweeps.
    pub max_iter: usize,
    /// Materialize the standardized columns once instead of re-reading
    /// the store every sweep. Costs `nr * nc * 8` bytes; numerics are
    /// identical.
    pub cache_columns: bool,
}

impl Default for RidgeOptions {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 100,
            cache_columns: false,
        }
    }
}

/// Result of a ridge solve.
#[derive(Debug, Clone)]
pub struct RidgeSolution {
    /// Marker-effect estimates, one per column in `cls`.
    pub coefficients: Vec<f64>,
    /// Residual `y - W s` over the analysis subset, aligned with
    /// `rws`.
    pub residual: Vec<f64>,
    /// Sweeps completed.
    pub iterations: usize,
    /// Last observed convergence criterion.
    pub delta: f64,
    /// Whether `delta` fell below tolerance within `max_iter`.
    pub converged: bool,
}

/// Solve the ridge system over `(rws, cls)`.
///
/// `means`/`sds` are the per-column moments from a prior summary pass;
/// columns with `sd` at or below the degeneracy floor are zeroed and
/// their coefficients stay fixed. `y` is subset-aligned (length
/// `rws.len()`). `s0` warm-starts the coefficients; entries equal to
/// zero are seeded from the initial residual.
#[allow(clippy::too_many_arguments)]
pub fn solve_ridge(
    store: &BedStore,
    rws: &[usize],
    cls: &[usize],
    means: &[f64],
    sds: &[f64],
    lambda: &[f64],
    y: &[f64],
    s0: &[f64],
    opts: &RidgeOptions,
) -> Result<RidgeSolution> {
    check_subset("row", rws, store.n_samples())?;
    check_subset("column", cls, store.n_markers())?;
    let nc = cls.len();
    let nr = rws.len();
    check_len("mean", means.len(), nc)?;
    check_len("sd", sds.len(), nc)?;
    check_len("lambda", lambda.len(), nc)?;
    check_len("s0", s0.len(), nc)?;
    check_len("y", y.len(), nr)?;

    let read_column = |j: usize| -> Result<Vec<f64>> {
        let full = store.column_dosages(cls[j])?;
        let mut w = subset_rows(&full, rws);
        standardize_with(&mut w, means[j], sds[j]);
        Ok(w)
    };

    let cache: Option<Vec<Vec<f64>>> = if opts.cache_columns {
        Some((0..nc).map(|j| read_column(j)).collect::<Result<_>>()?)
    } else {
        None
    };
    // Borrow from the cache or stream a fresh copy.
    let column = |j: usize, scratch: &mut Vec<f64>| -> Result<()> {
        match &cache {
            Some(cols) => {
                scratch.clear();
                scratch.extend_from_slice(&cols[j]);
            }
            None => *scratch = read_column(j)?,
        }
        Ok(())
    };

    let mut e = y.to_vec();
    let mut s = s0.to_vec();
    let mut dww = vec![0.0f64; nc];

    // Initialization sweep: column norms, seeding of zero entries from
    // the running residual, and entry of every nonzero coefficient into
    // e so that e = y - W*s holds before the first iteration.
    let mut w = Vec::with_capacity(nr);
    for j in 0..nc {
        column(j, &mut w)?;
        dww[j] = DenseMatrix::dot(&w, &w);
        if dww[j] == 0.0 {
            continue;
        }
        if s[j] == 0.0 {
            s[j] = (DenseMatrix::dot(&w, &e) / dww[j]) / nc as f64;
        }
        if s[j] != 0.0 {
            for (ei, &wi) in e.iter_mut().zip(w.iter()) {
                *ei -= wi * s[j];
            }
        }
    }

    let mut s_old = s.clone();
    let mut iterations = 0;
    let mut delta = f64::INFINITY;

    for it in 1..=opts.max_iter {
        for j in 0..nc {
            if dww[j] == 0.0 {
                continue;
            }
            column(j, &mut w)?;
            let lhs = dww[j] + lambda[j];
            let rhs = DenseMatrix::dot(&w, &e) + dww[j] * s[j];
            let s_new = rhs / lhs;
            let step = s_new - s[j];
            for (ei, &wi) in e.iter_mut().zip(w.iter()) {
                *ei -= wi * step;
            }
            s[j] = s_new;
        }

        iterations = it;
        delta = s
            .iter()
            .zip(s_old.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            / (nc as f64).sqrt();
        if delta < opts.tol {
            return Ok(RidgeSolution {
                coefficients: s,
                residual: e,
                iterations,
                delta,
                converged: true,
            });
        }
        s_old.copy_from_slice(&s);
    }

    Ok(RidgeSolution {
        coefficients: s,
        residual: e,
        iterations,
        delta,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grip_geno::codec::encode_codes;
    use grip_geno::{BedFormat, BED_MAGIC};
    use std::io::Write;
    use std::path::Path;

    fn write_store(path: &Path, columns: &[Vec<u8>]) {
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(&BED_MAGIC).unwrap();
        for codes in columns {
            f.write_all(&encode_codes(codes)).unwrap();
        }
    }

    // Two columns chosen so the standardized vectors are orthogonal.
    fn orthogonal_store(dir: &tempfile::TempDir) -> BedStore {
        let path = dir.path().join("orth.bed");
        write_store(&path, &[vec![0u8, 0, 2, 2], vec![0u8, 2, 0, 2]]);
        BedStore::open(&path, 4, 2, BedFormat::Bed).unwrap()
    }

    fn moments(store: &BedStore, rws: &[usize], cls: &[usize]) -> (Vec<f64>, Vec<f64>) {
        let sums = crate::summary::column_summaries(store, rws, cls).unwrap();
        (
            sums.iter().map(|s| s.mean()).collect(),
            sums.iter().map(|s| s.sd()).collect(),
        )
    }

    #[test]
    fn test_ridge_recovers_orthogonal_effects() {
        let dir = tempfile::tempdir().unwrap();
        let store = orthogonal_store(&dir);
        let rws = [1, 2, 3, 4];
        let cls = [1, 2];
        let (means, sds) = moments(&store, &rws, &cls);

        // y = 2*w1 - 1*w2 with w the standardized columns.
        let w1: Vec<f64> = {
            let full = store.column_dosages(1).unwrap();
            let mut v = subset_rows(&full, &rws);
            standardize_with(&mut v, means[0], sds[0]);
            v
        };
        let w2: Vec<f64> = {
            let full = store.column_dosages(2).unwrap();
            let mut v = subset_rows(&full, &rws);
            standardize_with(&mut v, means[1], sds[1]);
            v
        };
        let y: Vec<f64> = w1
            .iter()
            .zip(w2.iter())
            .map(|(a, b)| 2.0 * a - 1.0 * b)
            .collect();

        let sol = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &[0.0, 0.0],
            &y,
            &[0.0, 0.0],
            &RidgeOptions::default(),
        )
        .unwrap();

        assert!(sol.converged);
        assert!((sol.coefficients[0] - 2.0).abs() < 1e-8);
        assert!((sol.coefficients[1] + 1.0).abs() < 1e-8);
        for r in &sol.residual {
            assert!(r.abs() < 1e-8);
        }
    }

    #[test]
    fn test_ridge_shrinks_with_lambda() {
        let dir = tempfile::tempdir().unwrap();
        let store = orthogonal_store(&dir);
        let rws = [1, 2, 3, 4];
        let cls = [1, 2];
        let (means, sds) = moments(&store, &rws, &cls);

        let w1: Vec<f64> = {
            let full = store.column_dosages(1).unwrap();
            let mut v = subset_rows(&full, &rws);
            standardize_with(&mut v, means[0], sds[0]);
            v
        };
        let y: Vec<f64> = w1.iter().map(|a| 3.0 * a).collect();

        // With orthogonal columns and lambda = dww, the fixed point is
        // beta * dww / (dww + lambda) = beta / 2.
        let dww = DenseMatrix::dot(&w1, &w1);
        let sol = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &[dww, dww],
            &y,
            &[0.0, 0.0],
            &RidgeOptions {
                tol: 1e-14,
                max_iter: 500,
                cache_columns: false,
            },
        )
        .unwrap();

        assert!(sol.converged);
        assert!((sol.coefficients[0] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_ridge_fixed_point_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.bed");
        write_store(
            &path,
            &[vec![0u8, 1, 2, 1], vec![2u8, 1, 0, 0], vec![0u8, 2, 1, 1]],
        );
        let store = BedStore::open(&path, 4, 3, BedFormat::Bed).unwrap();
        let rws = [1, 2, 3, 4];
        let cls = [1, 2, 3];
        let (means, sds) = moments(&store, &rws, &cls);
        let lambda = [0.5, 0.5, 0.5];
        let y = [1.0, -1.0, 0.5, 0.0];

        let sol = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &lambda,
            &y,
            &[0.0; 3],
            &RidgeOptions {
                tol: 1e-13,
                max_iter: 2000,
                cache_columns: false,
            },
        )
        .unwrap();
        assert!(sol.converged);

        // At the fixed point, w_j' e == lambda_j * s_j for every j.
        for (j, &col) in cls.iter().enumerate() {
            let full = store.column_dosages(col).unwrap();
            let mut w = subset_rows(&full, &rws);
            standardize_with(&mut w, means[j], sds[j]);
            let we = DenseMatrix::dot(&w, &sol.residual);
            assert!(
                (we - lambda[j] * sol.coefficients[j]).abs() < 1e-6,
                "fixed-point violation at column {}: {} vs {}",
                j,
                we,
                lambda[j] * sol.coefficients[j]
            );
        }
    }

    #[test]
    fn test_ridge_cache_matches_streaming() {
        let dir = tempfile::tempdir().unwrap();
        let store = orthogonal_store(&dir);
        let rws = [1, 2, 3, 4];
        let cls = [1, 2];
        let (means, sds) = moments(&store, &rws, &cls);
        let y = [1.0, 0.0, -1.0, 2.0];

        let base = RidgeOptions {
            tol: 1e-12,
            max_iter: 50,
            cache_columns: false,
        };
        let streamed = solve_ridge(
            &store, &rws, &cls, &means, &sds, &[0.1, 0.1], &y, &[0.0, 0.0], &base,
        )
        .unwrap();
        let cached = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &[0.1, 0.1],
            &y,
            &[0.0, 0.0],
            &RidgeOptions {
                cache_columns: true,
                ..base
            },
        )
        .unwrap();

        assert_eq!(streamed.iterations, cached.iterations);
        for (a, b) in streamed
            .coefficients
            .iter()
            .zip(cached.coefficients.iter())
        {
            assert_eq!(a, b, "cache changed the numerics");
        }
    }

    #[test]
    fn test_degenerate_column_coefficient_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("degen.bed");
        write_store(&path, &[vec![0u8, 0, 2, 2], vec![1u8, 1, 1, 1]]);
        let store = BedStore::open(&path, 4, 2, BedFormat::Bed).unwrap();
        let rws = [1, 2, 3, 4];
        let cls = [1, 2];
        let (means, sds) = moments(&store, &rws, &cls);
        assert_eq!(sds[1], 0.0);

        let sol = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &[0.0, 0.0],
            &[1.0, -1.0, 1.0, -1.0],
            &[0.0, 0.25],
            &RidgeOptions::default(),
        )
        .unwrap();
        // Warm-start value of the degenerate column is untouched.
        assert_eq!(sol.coefficients[1], 0.25);
    }

    #[test]
    fn test_max_iter_returns_state_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.bed");
        write_store(&path, &[vec![0u8, 1, 2, 1], vec![1u8, 2, 0, 1]]);
        let store = BedStore::open(&path, 4, 2, BedFormat::Bed).unwrap();
        let rws = [1, 2, 3, 4];
        let cls = [1, 2];
        let (means, sds) = moments(&store, &rws, &cls);

        let sol = solve_ridge(
            &store,
            &rws,
            &cls,
            &means,
            &sds,
            &[0.1, 0.1],
            &[1.0, 2.0, 3.0, 4.0],
            &[0.0, 0.0],
            &RidgeOptions {
                tol: 0.0,
                max_iter: 3,
                cache_columns: false,
            },
        )
        .unwrap();
        assert!(!sol.converged);
        assert_eq!(sol.iterations, 3);
        assert!(sol.delta.is_finite());
    }
}
