use std::sync::Arc;

use gch_core::Perm;
use gch_graph::{Graph, LabelledGraph};
use gch_op::GraphOperator;
use gch_spaces::GraphVectorSpace;

use crate::space::HairyGvs;

/// Contract-edges operator on hairy graphs. Only internal edges are
/// contracted; hair edges stay untouched.
pub struct ContractEdgesOp {
    domain: Arc<HairyGvs>,
    target: Arc<HairyGvs>,
}

impl ContractEdgesOp {
    /// Creates the operator with domain `(v, l, h)` and target `(v−1, l, h)`.
    pub fn new(
        n_vertices: usize,
        n_loops: usize,
        n_hairs: usize,
        even_edges: bool,
        even_hairs: bool,
    ) -> Self {
        Self {
            domain: Arc::new(HairyGvs::new(
                n_vertices, n_loops, n_hairs, even_edges, even_hairs,
            )),
            target: Arc::new(HairyGvs::new(
                n_vertices.saturating_sub(1),
                n_loops,
                n_hairs,
                even_edges,
                even_hairs,
            )),
        }
    }

    fn contract_edge(&self, graph: &Graph, u: usize, v: usize) -> Option<(Graph, i64)> {
        let n = graph.order();
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
            "hairy/{}/contractD{}_{}_{}.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs()
        )
    }

    fn rank_key(&self) -> String {
        format!(
            "hairy/{}/contractD{}_{}_{}_rank.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs()
        )
    }

    fn get_work_estimate(&self) -> u64 {
        self.domain.n_edges().max(0) as u64 * self.domain.get_work_estimate()
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        let internal = self.domain.n_vertices();
        graph
            .edges()
            .into_iter()
            .filter(|&(u, v)| u < internal && v < internal)
            .filter_map(|(u, v)| self.contract_edge(graph, u, v))
            .collect()
    }
}

/// Edge-to-one-hair operator: delete an internal edge and attach a fresh
/// hair to one of its former endpoints, lowering the loop order.
///
/// Sign convention (documented choice): with odd edges the deleted edge
/// contributes the signature of moving its label past the surviving labels;
/// the two attachment choices carry opposite signs under even edges (the
/// deleted edge was oriented) and equal signs under odd edges.
pub struct EdgeToOneHairOp {
    domain: Arc<HairyGvs>,
    target: Arc<HairyGvs>,
}

impl EdgeToOneHairOp {
    /// Creates the operator with domain `(v, l, h)` and target
    /// `(v, l−1, h+1)`.
    pub fn new(
        n_vertices: usize,
        n_loops: usize,
        n_hairs: usize,
        even_edges: bool,
        even_hairs: bool,
    ) -> Self {
        Self {
            domain: Arc::new(HairyGvs::new(
                n_vertices, n_loops, n_hairs, even_edges, even_hairs,
            )),
            target: Arc::new(HairyGvs::new(
                n_vertices,
                n_loops.saturating_sub(1),
                n_hairs + 1,
                even_edges,
                even_hairs,
            )),
        }
    }

    fn cut_edge(&self, graph: &Graph, index: usize, u: usize, v: usize) -> Vec<(Graph, i64)> {
        let internal = self.domain.n_vertices();
        let total = graph.order();
        // The deleted label moves to the front of the edge list: its
        // signature is (−1)^index under odd edges.
        let label_sign = if self.domain.even_edges() {
            1
        } else if index % 2 == 0 {
            1
        } else {
            -1
        };
        let mut images = Vec::new();
        for (end_sign, keep) in [(1i64, u), (-1i64, v)] {
            let mut surgery = LabelledGraph::from_graph(graph);
            surgery.delete_edge(u, v);
            // Existing hairs keep their slots; the fresh hair joins the end
            // of the hair block.
            surgery.add_vertex(total);
            surgery.add_edge(keep, total, graph.size());
            let (image, _) = surgery.to_graph();
            let attach_sign = if self.domain.even_edges() {
                end_sign
            } else {
                1
            };
            debug_assert_eq!(image.order(), internal + self.domain.n_hairs() + 1);
            images.push((image, label_sign * attach_sign));
        }
        images
    }
}

impl GraphOperator for EdgeToOneHairOp {
    fn domain(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.domain) as Arc<dyn GraphVectorSpace>
    }

    fn target(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.target) as Arc<dyn GraphVectorSpace>
    }

    fn operator_type(&self) -> &'static str {
        "edge to one hair"
    }

    fn matrix_key(&self) -> String {
        format!(
            "hairy/{}/et1hD{}_{}_{}.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs()
        )
    }

    fn rank_key(&self) -> String {
        format!(
            "hairy/{}/et1hD{}_{}_{}_rank.txt",
            self.domain.sub_dir(),
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs()
        )
    }

    fn get_work_estimate(&self) -> u64 {
        self.domain.n_edges().max(0) as u64 * self.domain.get_work_estimate()
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        let internal = self.domain.n_vertices();
        graph
            .edges()
            .into_iter()
            .enumerate()
            .filter(|&(_, (u, v))| u < internal && v < internal)
            .flat_map(|(index, (u, v))| self.cut_edge(graph, index, u, v))
            .collect()
    }
}
