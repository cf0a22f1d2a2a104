use std::ops::Range;
use std::sync::Arc;

use gch_complex::GraphComplex;
use gch_op::{Differential, OperatorCollection};
use gch_spaces::{GraphVectorSpace, SumVectorSpace};
use itertools::Itertools;

use crate::operators::ContractEdgesOp;
use crate::space::OrdinaryGvs;

/// Assembles the ordinary graph complex with the contract-edges
/// differential over the given parameter ranges.
pub fn ordinary_contract_complex(
    v_range: Range<usize>,
    l_range: Range<usize>,
    even_edges: bool,
) -> GraphComplex {
    let members: Vec<Arc<dyn GraphVectorSpace>> = v_range
        .clone()
        .cartesian_product(l_range.clone())
        .map(|(v, l)| Arc::new(OrdinaryGvs::new(v, l, even_edges)) as Arc<dyn GraphVectorSpace>)
        .collect();
    let operators = v_range
        .cartesian_product(l_range)
        .map(|(v, l)| {
            Arc::new(ContractEdgesOp::new(v, l, even_edges)) as Arc<dyn gch_op::GraphOperator>
        })
        .collect();
    let differential = Differential::new(OperatorCollection::new("contract edges", operators));
    let parity = if even_edges { "even edges" } else { "odd edges" };
    GraphComplex::new(
        format!("ordinary graph complex ({parity})"),
        SumVectorSpace::new(members),
        vec![Arc::new(differential)],
    )
}
