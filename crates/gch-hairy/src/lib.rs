#![deny(missing_docs)]

//! The hairy graph complex: internal graphs decorated with unnumbered
//! degree-one hair vertices, graded by vertices, loops and hairs, carrying
//! the contract-edges and edge-to-one-hair differentials.

mod complex;
mod operators;
mod space;

pub use complex::{hairy_complex, HairyDifferential};
pub use operators::{ContractEdgesOp, EdgeToOneHairOp};
pub use space::HairyGvs;
