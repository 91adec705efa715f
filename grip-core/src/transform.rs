//! Per-column dosage pipeline: missing-value policy, allele-direction
//! flip, and mean/SD standardization.
//!
//! Every kernel funnels decoded columns through this pipeline. Order
//! of operations is fixed: missing policy, then direction flip, then
//! scaling. A column whose selected calls are all missing comes out
//! all-zero regardless of the other knobs.

use grip_geno::codec::MISSING_DOSAGE;

/// SD below this is a degenerate (monomorphic) column; its scaled
/// output is all zero.
pub const SD_FLOOR: f64 = 1e-5;

/// What to do with missing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Coerce missing to 0 for numeric use.
    Zero,
    /// Replace missing with `2 * af`; the frequency is computed from
    /// the subset when the supplied value is 0.
    MeanImpute,
    /// Keep the 3.0 sentinel; the scaling step zeroes it. Used by the
    /// relationship-matrix path.
    Sentinel,
}

/// Allele direction relative to the reference coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Keep,
    /// Re-allele: `g <- 2 - g`.
    Flip,
}

/// Column scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    None,
    /// Subtract the subset mean and divide by the subset SD
    /// (`n - 1` denominator).
    Standardize,
}

/// The per-column transform pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPipeline {
    pub missing: MissingPolicy,
    pub direction: Direction,
    pub scaling: Scaling,
}

impl ColumnPipeline {
    /// Apply the pipeline to a subset-restricted dosage vector.
    ///
    /// `af` is the per-column allele frequency used for mean
    /// imputation; pass 0.0 to have it computed from the subset.
    pub fn apply(&self, g: &mut [f64], af: f64) {
        let nr = g.len();
        let n_miss = g.iter().filter(|&&x| x >= MISSING_DOSAGE).count();
        if n_miss == nr {
            g.fill(0.0);
            return;
        }

        match self.missing {
            MissingPolicy::Zero => {
                for x in g.iter_mut() {
                    if *x >= MISSING_DOSAGE {
                        *x = 0.0;
                    }
                }
            }
            MissingPolicy::MeanImpute => {
                let af = if af > 0.0 { af } else { subset_af(g) };
                let fill = 2.0 * af;
                for x in g.iter_mut() {
                    if *x >= MISSING_DOSAGE {
                        *x = fill;
                    }
                }
            }
            MissingPolicy::Sentinel => {}
        }

        if self.direction == Direction::Flip {
            // The sentinel must survive to the scaling step; flipping
            // it would alias it onto a valid dosage.
            for x in g.iter_mut() {
                if *x < MISSING_DOSAGE {
                    *x = 2.0 - *x;
                }
            }
        }

        if self.scaling == Scaling::Standardize {
            standardize(g);
        }
    }
}

/// Allele frequency over the non-missing entries of a subset vector.
pub fn subset_af(g: &[f64]) -> f64 {
    let (sum, n) = g.iter().fold((0.0, 0usize), |(s, n), &x| {
        if x < MISSING_DOSAGE {
            (s + x, n + 1)
        } else {
            (s, n)
        }
    });
    if n == 0 {
        0.0
    } else {
        sum / (2.0 * n as f64)
    }
}

/// Center on the non-missing mean, zero the missing entries, divide by
/// the sample SD. Degenerate columns (SD at or below the floor) come
/// out all zero.
pub fn standardize(g: &mut [f64]) {
    let (sum, n) = g.iter().fold((0.0, 0usize), |(s, n), &x| {
        if x < MISSING_DOSAGE {
            (s + x, n + 1)
        } else {
            (s, n)
        }
    });
    if n == 0 {
        g.fill(0.0);
        return;
    }
    let mean = sum / n as f64;

    let mut sum_sq = 0.0;
    for x in g.iter_mut() {
        if *x < MISSING_DOSAGE {
            *x -= mean;
            sum_sq += *x * *x;
        } else {
            *x = 0.0;
        }
    }

    let sd = if n > 1 {
        (sum_sq / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    if sd > SD_FLOOR {
        for x in g.iter_mut() {
            *x /= sd;
        }
    } else {
        g.fill(0.0);
    }
}

/// Center and scale with externally supplied moments: subtract `mean`
/// from non-missing entries, zero the missing, divide by `sd`. Used by
/// the ridge solver, which takes per-column moments from a prior
/// summary pass. Degenerate columns come out all zero.
pub fn standardize_with(g: &mut [f64], mean: f64, sd: f64) {
    if sd <= SD_FLOOR {
        g.fill(0.0);
        return;
    }
    for x in g.iter_mut() {
        if *x < MISSING_DOSAGE {
            *x = (*x - mean) / sd;
        } else {
            *x = 0.0;
        }
    }
}

/// Gather a full-length column down to the analysis row subset
/// (1-based indices).
pub fn subset_rows(g_full: &[f64], rws: &[usize]) -> Vec<f64> {
    rws.iter().map(|&r| g_full[r - 1]).collect()
}
