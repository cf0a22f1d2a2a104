#![deny(missing_docs)]

//! Graph operators: sparse matrix construction from a family-supplied image
//! map, operator collections and differentials with their composition tests,
//! and the symmetric-group isotypical projector.

mod collection;
mod operator;
mod projector;

pub use collection::{
    CohomologyEntry, Differential, OperatorCollection, PairOutcome, SquareZeroReport,
};
pub use operator::{GraphOperator, RankStatus};
pub use projector::{
    character, irreducible_dimension, partitions_of, HairAction, RestrictedOperator,
    SymmProjector,
};
