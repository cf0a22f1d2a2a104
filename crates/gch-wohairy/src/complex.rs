use std::ops::Range;
use std::sync::Arc;

use gch_complex::GraphComplex;
use gch_op::{Differential, GraphOperator, OperatorCollection};
use gch_spaces::{GraphVectorSpace, SumVectorSpace};
use itertools::Itertools;

use crate::operators::{ContractEdgesOp, EpsToOmegaOp};
use crate::space::WoHairyGvs;

/// Differentials available on the wo-hairy complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WoHairyDifferential {
    /// Contract internal, epsilon and omega edges.
    Contract,
    /// Turn one epsilon decoration into an omega.
    EpsToOmega,
}

/// Assembles the wo-hairy graph complex over the given parameter ranges.
pub fn wohairy_complex(
    v_range: Range<usize>,
    l_range: Range<usize>,
    h_range: Range<usize>,
    w_range: Range<usize>,
    differentials: &[WoHairyDifferential],
) -> GraphComplex {
    let parameter_grid: Vec<(usize, usize, usize, usize)> = v_range
        .cartesian_product(l_range)
        .cartesian_product(h_range.cartesian_product(w_range))
        .map(|((v, l), (h, w))| (v, l, h, w))
        .collect();
    let members: Vec<Arc<dyn GraphVectorSpace>> = parameter_grid
        .iter()
        .map(|&(v, l, h, w)| Arc::new(WoHairyGvs::new(v, l, h, w)) as Arc<dyn GraphVectorSpace>)
        .collect();
    let mut collections = Vec::new();
    for choice in differentials {
        match choice {
            WoHairyDifferential::Contract => {
                let operators: Vec<Arc<dyn GraphOperator>> = parameter_grid
                    .iter()
                    .map(|&(v, l, h, w)| {
                        Arc::new(ContractEdgesOp::new(v, l, h, w)) as Arc<dyn GraphOperator>
                    })
                    .collect();
                collections.push(Arc::new(Differential::new(OperatorCollection::new(
                    "contract edges",
                    operators,
                ))));
            }
            WoHairyDifferential::EpsToOmega => {
                let operators: Vec<Arc<dyn GraphOperator>> = parameter_grid
                    .iter()
                    .map(|&(v, l, h, w)| {
                        Arc::new(EpsToOmegaOp::new(v, l, h, w)) as Arc<dyn GraphOperator>
                    })
                    .collect();
                collections.push(Arc::new(Differential::new(OperatorCollection::new(
                    "eps to omega",
                    operators,
                ))));
            }
        }
    }
    GraphComplex::new(
        "wohairy graph complex",
        SumVectorSpace::new(members),
        collections,
    )
}
