//! Column-addressed access to a packed genotype store.
//!
//! A store holds M variant columns of exactly `ceil(N/4)` bytes each,
//! optionally preceded by the 3-byte PLINK magic. The file is
//! memory-mapped, so every column read is positional: a shared
//! `BedStore` can be read from any number of worker threads without
//! seek coordination.

use std::path::Path;

use memmap2::Mmap;

use crate::codec::{self, bytes_per_column};
use crate::error::{Result, StoreError};

/// PLINK bed magic prefix: two signature bytes plus the SNP-major
/// mode byte.
pub const BED_MAGIC: [u8; 3] = [0x6C, 0x1B, 0x01];

/// On-disk layout of a packed store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedFormat {
    /// 3-byte magic prefix, then packed columns (`.bed`).
    Bed,
    /// Packed columns only, no prefix (`.raw`).
    Raw,
}

impl BedFormat {
    /// Sniff the layout from a case-sensitive filename suffix.
    ///
    /// This side-channel belongs in the outer wrapper only; kernels
    /// always receive the format explicitly.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<BedFormat> {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("bed") => Some(BedFormat::Bed),
            Some("raw") => Some(BedFormat::Raw),
            _ => None,
        }
    }

    /// Bytes to skip before the first column.
    pub fn header_len(self) -> usize {
        match self {
            BedFormat::Bed => BED_MAGIC.len(),
            BedFormat::Raw => 0,
        }
    }
}

/// Memory-mapped packed genotype store with 1-based column access.
pub struct BedStore {
    mmap: Mmap,
    n_samples: usize,
    n_markers: usize,
    bytes_per_col: usize,
    header: usize,
}

impl BedStore {
    /// Open and validate a store of known dimensions.
    ///
    /// For [`BedFormat::Bed`] the magic prefix is checked; for both
    /// layouts the total length must be exactly
    /// `header + n_markers * ceil(n_samples/4)`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        n_samples: usize,
        n_markers: usize,
        format: BedFormat,
    ) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };

        let header = format.header_len();
        if format == BedFormat::Bed {
            if mmap.len() < header {
                return Err(StoreError::LengthMismatch {
                    expected: header,
                    actual: mmap.len(),
                });
            }
            if mmap[..header] != BED_MAGIC {
                return Err(StoreError::BadMagic);
            }
        }

        let bytes_per_col = bytes_per_column(n_samples);
        let expected = header + n_markers * bytes_per_col;
        if mmap.len() != expected {
            return Err(StoreError::LengthMismatch {
                expected,
                actual: mmap.len(),
            });
        }

        Ok(Self {
            mmap,
            n_samples,
            n_markers,
            bytes_per_col,
            header,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_markers(&self) -> usize {
        self.n_markers
    }

    pub fn bytes_per_col(&self) -> usize {
        self.bytes_per_col
    }

    /// Raw packed bytes of variant column `col` (1-based).
    pub fn column(&self, col: usize) -> Result<&[u8]> {
        if col == 0 || col > self.n_markers {
            return Err(StoreError::ColumnOutOfRange {
                col,
                n_markers: self.n_markers,
            });
        }
        let start = self.header + (col - 1) * self.bytes_per_col;
        Ok(&self.mmap[start..start + self.bytes_per_col])
    }

    /// Decode column `col` to integer codes `{0, 1, 2, 3}`.
    pub fn column_codes(&self, col: usize) -> Result<Vec<u8>> {
        codec::decode_into_codes(self.column(col)?, self.n_samples)
    }

    /// Decode column `col` to dosages `{0.0, 1.0, 2.0, 3.0}`.
    pub fn column_dosages(&self, col: usize) -> Result<Vec<f64>> {
        codec::decode_into_dosages(self.column(col)?, self.n_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_codes;
    use std::io::Write;

    fn write_store(path: &Path, columns: &[Vec<u8>], format: BedFormat) {
        let mut f = std::fs::File::create(path).unwrap();
        if format == BedFormat::Bed {
            f.write_all(&BED_MAGIC).unwrap();
        }
        for codes in columns {
            f.write_all(&encode_codes(codes)).unwrap();
        }
    }

    #[test]
    fn test_open_and_read_bed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.bed");
        let cols = vec![vec![0u8, 1, 2, 3, 0], vec![2u8, 2, 1, 0, 3]];
        write_store(&path, &cols, BedFormat::Bed);

        let store = BedStore::open(&path, 5, 2, BedFormat::Bed).unwrap();
        assert_eq!(store.bytes_per_col(), 2);
        assert_eq!(store.column_codes(1).unwrap(), cols[0]);
        assert_eq!(store.column_codes(2).unwrap(), cols[1]);
        assert_eq!(
            store.column_dosages(2).unwrap(),
            vec![2.0, 2.0, 1.0, 0.0, 3.0]
        );
    }

    #[test]
    fn test_open_raw_no_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.raw");
        write_store(&path, &[vec![1u8, 1, 1, 1]], BedFormat::Raw);

        let store = BedStore::open(&path, 4, 1, BedFormat::Raw).unwrap();
        assert_eq!(store.column_codes(1).unwrap(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bed");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0xDE, 0xAD, 0x01, 0x00]).unwrap();
        drop(f);

        assert!(matches!(
            BedStore::open(&path, 4, 1, BedFormat::Bed),
            Err(StoreError::BadMagic)
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bed");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&BED_MAGIC).unwrap();
        f.write_all(&[0u8]).unwrap();
        drop(f);

        // Two columns of 5 samples need 2 bytes each.
        assert!(matches!(
            BedStore::open(&path, 5, 2, BedFormat::Bed),
            Err(StoreError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_column_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.raw");
        write_store(&path, &[vec![0u8, 0, 0, 0]], BedFormat::Raw);

        let store = BedStore::open(&path, 4, 1, BedFormat::Raw).unwrap();
        assert!(store.column(0).is_err());
        assert!(store.column(2).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(BedFormat::from_path("x/geno.bed"), Some(BedFormat::Bed));
        assert_eq!(BedFormat::from_path("geno.raw"), Some(BedFormat::Raw));
        assert_eq!(BedFormat::from_path("geno.txt"), None);
    }
}
