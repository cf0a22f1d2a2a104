#![deny(missing_docs)]

//! The graph complex orchestrator: composes a sum vector space with its
//! operator collections, drives the build → rank → cohomology pipeline, and
//! runs the square-zero and pairwise (anti-)commutativity tests.

mod commutativity;
mod complex;
mod info;

pub use commutativity::test_commutativity;
pub use complex::{CohomologyTable, GraphComplex, PipelineOpts};
pub use info::{ComplexInfo, OperatorInfo, SpaceInfo};
