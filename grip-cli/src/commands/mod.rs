pub mod common;
pub mod eigen;
pub mod grm;
pub mod ridge;
pub mod score;
pub mod summary;
