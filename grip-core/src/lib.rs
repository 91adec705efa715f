//! grip-core: numeric kernels over packed genotype stores.
//!
//! Implements the per-column transform pipeline, allele-frequency
//! summaries, blocked GRM construction, polygenic-score accumulation,
//! the matrix-free GSRU ridge solver, and random-window set
//! statistics.

pub mod error;
pub mod grm;
pub mod ridge;
pub mod score;
pub mod sets;
pub mod summary;
pub mod transform;

pub use error::{KernelError, Result};
pub use grm::{build_grm, GrmModel, GrmOptions};
pub use ridge::{solve_ridge, RidgeOptions, RidgeSolution};
pub use score::accumulate_scores;
pub use sets::window_permutation_counts;
pub use summary::{column_summaries, column_summary, ColumnSummary};
pub use transform::{ColumnPipeline, Direction, MissingPolicy, Scaling};
