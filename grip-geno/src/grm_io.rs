//! Dense GRM and eigendecomposition blob I/O.
//!
//! The GRM goes to disk as a pair of files:
//! - `<prefix>.grm.bin`: `n * n * 8` bytes of native-endian IEEE-754
//!   doubles, written column by column.
//! - `<prefix>.grm.id`: sample IDs, one per line, in row order.
//!
//! Eigen output uses the same convention: `.eigenval` text plus a
//! column-major `.eigenvec.bin` blob.

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use grip_linalg::dense::DenseMatrix;

/// Write a GRM column by column.
///
/// With `squared` set, each value is squared on the way out; this is
/// the on-disk convention for the Hadamard-epistasis relationship
/// matrix.
pub fn write_grm(grm: &DenseMatrix, path: &Path, squared: bool) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create GRM file: {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for j in 0..grm.ncols() {
        for i in 0..grm.nrows() {
            let mut v = grm.get(i, j);
            if squared {
                v *= v;
            }
            w.write_all(&v.to_ne_bytes())?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Read an `n x n` GRM blob written by [`write_grm`].
pub fn read_grm(path: &Path, n: usize) -> Result<DenseMatrix> {
    let mut f = std::fs::File::open(path)
        .with_context(|| format!("Failed to open GRM file: {}", path.display()))?;
    let expected = n * n * 8;
    let mut buf = Vec::with_capacity(expected);
    f.read_to_end(&mut buf)?;
    if buf.len() != expected {
        bail!(
            "GRM file {} has {} bytes, expected {} for n={}",
            path.display(),
            buf.len(),
            expected,
            n
        );
    }
    let mut grm = DenseMatrix::zeros(n, n);
    for j in 0..n {
        for i in 0..n {
            let off = (j * n + i) * 8;
            let v = f64::from_ne_bytes(buf[off..off + 8].try_into().unwrap());
            grm.set(i, j, v);
        }
    }
    Ok(grm)
}

/// Write the sample-ID sidecar, one IID per line.
pub fn write_sample_ids(ids: &[String], path: &Path) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create ID file: {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for id in ids {
        writeln!(w, "{}", id)?;
    }
    w.flush()?;
    Ok(())
}

/// Read the sample-ID sidecar.
pub fn read_sample_ids(path: &Path) -> Result<Vec<String>> {
    Ok(std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ID file: {}", path.display()))?
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Write eigenvalues, one per line, in the order given (ascending by
/// contract).
pub fn write_eigenvalues(values: &[f64], path: &Path) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("Failed to create eigenvalue file: {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for v in values {
        writeln!(w, "{:.10e}", v)?;
    }
    w.flush()?;
    Ok(())
}

/// Write eigenvector columns as a column-major double blob.
pub fn write_eigenvectors(vectors: &DenseMatrix, path: &Path) -> Result<()> {
    write_grm(vectors, path, false)
}
