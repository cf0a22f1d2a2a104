#![deny(missing_docs)]

//! Sparse integer matrices in triplet form, their text wire format, and the
//! rank engine with exact, modular and estimated modes.

mod rank;
mod sparse;

pub use rank::{estimate_rank, exact_rank, modular_rank, RankMode, RankResult};
pub use sparse::SparseMatrix;
