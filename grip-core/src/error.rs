//! Typed errors for the numeric kernels.

use thiserror::Error;

use grip_geno::StoreError;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("shape error: {0}")]
    Shape(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;

/// Validate a 1-based subset vector against an axis length.
pub(crate) fn check_subset(what: &str, subset: &[usize], len: usize) -> Result<()> {
    if subset.is_empty() {
        return Err(KernelError::Shape(format!("empty {} selection", what)));
    }
    for &idx in subset {
        if idx == 0 || idx > len {
            return Err(KernelError::Shape(format!(
                "{} index {} out of range (1..={})",
                what, idx, len
            )));
        }
    }
    Ok(())
}

/// Validate that a companion vector matches the selection length.
pub(crate) fn check_len(what: &str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(KernelError::Shape(format!(
            "{} has length {}, expected {}",
            what, got, expected
        )));
    }
    Ok(())
}
