//! Per-column call counts and allele frequencies.

use rayon::prelude::*;

use grip_geno::BedStore;

use crate::error::{check_subset, Result};

/// Counts and frequency for one variant column over the analysis
/// subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub n0: usize,
    pub n1: usize,
    pub n2: usize,
    pub n_miss: usize,
    /// `(n1 + 2*n2) / (2 * (nr - n_miss))`; 0.0 when every selected
    /// call is missing.
    pub af: f64,
}

impl ColumnSummary {
    /// Tally a subset-restricted code vector.
    pub fn from_codes(codes: &[u8]) -> Self {
        let (mut n0, mut n1, mut n2, mut n_miss) = (0usize, 0usize, 0usize, 0usize);
        for &c in codes {
            match c {
                0 => n0 += 1,
                1 => n1 += 1,
                2 => n2 += 1,
                _ => n_miss += 1,
            }
        }
        let n_called = n0 + n1 + n2;
        let af = if n_called == 0 {
            0.0
        } else {
            (n1 + 2 * n2) as f64 / (2.0 * n_called as f64)
        };
        Self {
            n0,
            n1,
            n2,
            n_miss,
            af,
        }
    }

    /// Selected calls, missing included.
    pub fn n_used(&self) -> usize {
        self.n0 + self.n1 + self.n2 + self.n_miss
    }

    /// Mean dosage over non-missing calls (`2 * af`).
    pub fn mean(&self) -> f64 {
        2.0 * self.af
    }

    /// Sample SD over non-missing calls (`n - 1` denominator); 0.0
    /// for columns with fewer than two calls.
    pub fn sd(&self) -> f64 {
        let n = self.n0 + self.n1 + self.n2;
        if n < 2 {
            return 0.0;
        }
        let sum = (self.n1 + 2 * self.n2) as f64;
        let sum_sq = (self.n1 + 4 * self.n2) as f64;
        let mean = sum / n as f64;
        let var = (sum_sq - n as f64 * mean * mean) / (n - 1) as f64;
        var.max(0.0).sqrt()
    }
}

/// Summarize one column over the row subset (1-based indices).
pub fn column_summary(store: &BedStore, rws: &[usize], col: usize) -> Result<ColumnSummary> {
    check_subset("row", rws, store.n_samples())?;
    let codes = store.column_codes(col)?;
    let sub: Vec<u8> = rws.iter().map(|&r| codes[r - 1]).collect();
    Ok(ColumnSummary::from_codes(&sub))
}

/// Summarize a set of columns in parallel.
///
/// Output slot `i` belongs to `cls[i]` alone, so the result is
/// invariant under thread count.
pub fn column_summaries(
    store: &BedStore,
    rws: &[usize],
    cls: &[usize],
) -> Result<Vec<ColumnSummary>> {
    check_subset("row", rws, store.n_samples())?;
    check_subset("column", cls, store.n_markers())?;

    cls.par_iter()
        .map(|&col| column_summary(store, rws, col))
        .collect()
}
