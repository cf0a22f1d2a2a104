#![deny(missing_docs)]

//! The wo-hairy graph complex: simple graphs with numbered hairs plus
//! epsilon- and omega-decorations, as used for weight-graded cohomology.
//! Omega decorations are odd. The epsilon vertex may carry one tadpole,
//! which is explicit in the family's bookkeeping while the stored graph6
//! string keeps the historical edge-count-shortfall encoding.

mod complex;
mod operators;
mod space;

pub use complex::{wohairy_complex, WoHairyDifferential};
pub use operators::{ContractEdgesOp, EpsToOmegaOp};
pub use space::WoHairyGvs;
