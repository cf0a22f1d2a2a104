use std::sync::Arc;

use gch_core::Perm;
use gch_graph::{Graph, LabelledGraph};
use gch_op::GraphOperator;
use gch_spaces::GraphVectorSpace;

use crate::space::OrdinaryGvs;

/// Contract-edges operator on ordinary graphs: the image of a graph is the
/// signed sum of its single-edge contractions.
pub struct ContractEdgesOp {
    domain: Arc<OrdinaryGvs>,
    target: Arc<OrdinaryGvs>,
}

impl ContractEdgesOp {
    /// Creates the operator with domain `(v, l)` and target `(v−1, l)`.
    pub fn new(n_vertices: usize, n_loops: usize, even_edges: bool) -> Self {
        Self {
            domain: Arc::new(OrdinaryGvs::new(n_vertices, n_loops, even_edges)),
            target: Arc::new(OrdinaryGvs::new(
                n_vertices.saturating_sub(1),
                n_loops,
                even_edges,
            )),
        }
    }

    /// Contraction matches spaces differing by exactly one vertex.
    pub fn is_match(domain: &OrdinaryGvs, target: &OrdinaryGvs) -> bool {
        domain.n_vertices() == target.n_vertices() + 1
            && domain.n_loops() == target.n_loops()
            && domain.even_edges() == target.even_edges()
    }

    /// Contracts one labelled edge of `graph`, keeping the bookkeeping of
    /// the family's sign conventions; `None` when a parallel edge collapses
    /// (the image vanishes).
    fn contract_edge(&self, graph: &Graph, u: usize, v: usize) -> Option<(Graph, i64)> {
        let n = graph.order();
        // Move u to position 0 and v to position 1; the remaining vertices
        // keep their relative order.
        let mut images = Vec::with_capacity(n);
        images.push(u);
        images.push(v);
        images.extend((0..n).filter(|&j| j != u && j != v));
        let to_front = Perm::new(images).inverse();
        let mut sign = self.domain.perm_sign(graph, &to_front);
        let fronted = graph.relabel(&to_front);
        let mut surgery = LabelledGraph::from_graph(&fronted);
        let dropped = surgery.merge(0, 1);
        if dropped != 1 {
            // A parallel edge collapsed alongside the contracted one.
            return None;
        }
        let (contracted, labels) = surgery.to_graph();
        if !self.domain.even_edges() {
            sign *= Perm::shifted(&labels).sign();
        }
        Some((contracted, sign))
    }
}

impl GraphOperator for ContractEdgesOp {
    fn domain(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.domain) as Arc<dyn GraphVectorSpace>
    }

    fn target(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.target) as Arc<dyn GraphVectorSpace>
    }

    fn operator_type(&self) -> &'static str {
        "contract edges"
    }

    fn matrix_key(&self) -> String {
        format!(
            "ordinary/{}/contractD{}_{}.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops()
        )
    }

    fn rank_key(&self) -> String {
        format!(
            "ordinary/{}/contractD{}_{}_rank.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops()
        )
    }

    fn get_work_estimate(&self) -> u64 {
        self.domain.n_edges().max(0) as u64 * self.domain.get_work_estimate()
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        graph
            .edges()
            .into_iter()
            .filter_map(|(u, v)| self.contract_edge(graph, u, v))
            .collect()
    }
}
