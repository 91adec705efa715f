//! Symmetric eigendecomposition binding.
//!
//! Thin wrapper around faer's self-adjoint eigendecomposition. No
//! custom algorithm: the contract is defined by the math, the backend
//! does the work.

use crate::dense::DenseMatrix;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinalgError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Eigendecomposition of a real symmetric matrix.
pub struct SymEigen {
    /// Eigenvalues in ascending order.
    pub values: Vec<f64>,
    /// Eigenvector columns, ordered to match `values`.
    pub vectors: DenseMatrix,
}

/// Compute eigenvalues and eigenvectors of a real symmetric matrix.
///
/// Eigenvalues come back ascending; column `j` of `vectors` is the
/// eigenvector for `values[j]`.
pub fn sym_eigen(a: &DenseMatrix) -> Result<SymEigen, LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let mat = a.as_faer();
    let evd = mat.selfadjoint_eigendecomposition(faer::Side::Lower);
    let s = evd.s();
    let u = evd.u();

    // Sort into ascending order, carrying the eigenvector columns along.
    let mut order: Vec<usize> = (0..n).collect();
    let raw: Vec<f64> = (0..n).map(|i| s.column_vector().read(i)).collect();
    order.sort_by(|&i, &j| raw[i].partial_cmp(&raw[j]).unwrap());

    let values: Vec<f64> = order.iter().map(|&i| raw[i]).collect();
    let mut vectors = DenseMatrix::zeros(n, n);
    for (dst, &src) in order.iter().enumerate() {
        for i in 0..n {
            vectors.set(i, dst, u.read(i, src));
        }
    }

    Ok(SymEigen { values, vectors })
}
