#![deny(missing_docs)]

//! The ordinary graph complex: connected simple graphs with at least
//! trivalent vertices, graded by vertices and loops, with the contract-edges
//! differential. Also home of the two edge-parity sign recipes shared by the
//! decorated families.

mod complex;
mod operators;
mod sign;
mod space;

pub use complex::ordinary_contract_complex;
pub use operators::ContractEdgesOp;
pub use sign::{even_edge_sign, odd_edge_sign};
pub use space::OrdinaryGvs;
