//! grip-geno: packed genotype store and metadata I/O for grip.
//!
//! Provides the 2-bit codec, the memory-mapped column-addressed
//! `BedStore`, `.fam`/`.bim` metadata parsing, and dense GRM blob I/O.

pub mod codec;
pub mod error;
pub mod grm_io;
pub mod meta;
pub mod store;

pub use error::StoreError;
pub use store::{BedFormat, BedStore, BED_MAGIC};
