//! grip-linalg: dense linear algebra backend for grip.
//!
//! Wraps faer's column-major `Mat<f64>` with the operations the
//! genotype kernels need, and binds the symmetric eigendecomposition
//! used for GRM spectra.

pub mod decomposition;
pub mod dense;

pub use decomposition::{sym_eigen, LinalgError, SymEigen};
pub use dense::DenseMatrix;
