//! Typed errors for the packed genotype store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PLINK bed store: bad magic bytes")]
    BadMagic,

    #[error("store length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("column {col} out of range (1..={n_markers})")]
    ColumnOutOfRange { col: usize, n_markers: usize },

    #[error("packed buffer too short: {len} bytes for {n} calls")]
    TruncatedBuffer { len: usize, n: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;
