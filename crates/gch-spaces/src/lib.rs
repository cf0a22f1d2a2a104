#![deny(missing_docs)]

//! Graph vector spaces: the family capability trait, basis construction with
//! the odd-automorphism filter, direct sums with start-index bookkeeping and
//! degree slices.

mod basis;
mod cache;
mod space;
mod sum;

pub use basis::{format_basis, parse_basis, parse_basis_header};
pub use cache::BasisCache;
pub use space::GraphVectorSpace;
pub use sum::{DegreeSlice, SortKey, SumVectorSpace};
