use std::ops::Range;
use std::sync::Arc;

use gch_complex::GraphComplex;
use gch_op::{Differential, GraphOperator, OperatorCollection};
use gch_spaces::{GraphVectorSpace, SumVectorSpace};
use itertools::Itertools;

use crate::operators::{ContractEdgesOp, EdgeToOneHairOp};
use crate::space::HairyGvs;

/// Differentials available on the hairy complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairyDifferential {
    /// Contract internal edges.
    Contract,
    /// Replace an internal edge by a hair.
    EdgeToOneHair,
}

/// Assembles the hairy graph complex over the given parameter ranges with
/// the requested differentials.
pub fn hairy_complex(
    v_range: Range<usize>,
    l_range: Range<usize>,
    h_range: Range<usize>,
    even_edges: bool,
    even_hairs: bool,
    differentials: &[HairyDifferential],
) -> GraphComplex {
    let parameter_grid: Vec<(usize, usize, usize)> = v_range
        .clone()
        .cartesian_product(l_range.clone())
        .cartesian_product(h_range.clone())
        .map(|((v, l), h)| (v, l, h))
        .collect();
    let members: Vec<Arc<dyn GraphVectorSpace>> = parameter_grid
        .iter()
        .map(|&(v, l, h)| {
            Arc::new(HairyGvs::new(v, l, h, even_edges, even_hairs))
                as Arc<dyn GraphVectorSpace>
        })
        .collect();
    let mut collections = Vec::new();
    for choice in differentials {
        match choice {
            HairyDifferential::Contract => {
                let operators: Vec<Arc<dyn GraphOperator>> = parameter_grid
                    .iter()
                    .map(|&(v, l, h)| {
                        Arc::new(ContractEdgesOp::new(v, l, h, even_edges, even_hairs))
                            as Arc<dyn GraphOperator>
                    })
                    .collect();
                collections.push(Arc::new(Differential::new(OperatorCollection::new(
                    "contract edges",
                    operators,
                ))));
            }
            HairyDifferential::EdgeToOneHair => {
                let operators: Vec<Arc<dyn GraphOperator>> = parameter_grid
                    .iter()
                    .map(|&(v, l, h)| {
                        Arc::new(EdgeToOneHairOp::new(v, l, h, even_edges, even_hairs))
                            as Arc<dyn GraphOperator>
                    })
                    .collect();
                collections.push(Arc::new(Differential::new(OperatorCollection::new(
                    "edge to one hair",
                    operators,
                ))));
            }
        }
    }
    let parity = format!(
        "{}, {}",
        if even_edges { "even edges" } else { "odd edges" },
        if even_hairs { "even hairs" } else { "odd hairs" }
    );
    GraphComplex::new(
        format!("hairy graph complex ({parity})"),
        SumVectorSpace::new(members),
        collections,
    )
}
