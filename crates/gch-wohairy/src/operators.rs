use std::sync::Arc;

use gch_core::Perm;
use gch_graph::{Graph, LabelledGraph};
use gch_op::GraphOperator;
use gch_spaces::GraphVectorSpace;

use crate::space::WoHairyGvs;

/// Contract-edges operator on wo-hairy graphs.
///
/// Internal-internal and internal-epsilon edges contract by merging the
/// endpoints; contracting an internal-omega edge turns the internal vertex
/// into epsilon after reconnecting one of its remaining edges to the omega.
/// Edges touching numbered hairs never contract. Signs follow the labelled
/// edge order: `(−1)^i` for the contracted edge, a factor −1 in the presence
/// of the epsilon tadpole, and the signature of the surviving labels.
pub struct ContractEdgesOp {
    domain: Arc<WoHairyGvs>,
    target: Arc<WoHairyGvs>,
}

impl ContractEdgesOp {
    /// Creates the operator with domain `(v, l, h, w)` and target
    /// `(v−1, l, h, w)`.
    pub fn new(n_vertices: usize, n_loops: usize, n_hairs: usize, n_ws: usize) -> Self {
        Self {
            domain: Arc::new(WoHairyGvs::new(n_vertices, n_loops, n_hairs, n_ws)),
            target: Arc::new(WoHairyGvs::new(
                n_vertices.saturating_sub(1),
                n_loops,
                n_hairs,
                n_ws,
            )),
        }
    }

    /// Merge-contraction of an edge whose upper endpoint is internal or
    /// epsilon. Keeps the higher index so the special vertices survive.
    fn contract_plain(
        &self,
        graph: &Graph,
        u: usize,
        v: usize,
        base_sign: i64,
    ) -> Option<(Graph, i64)> {
        let mut surgery = LabelledGraph::from_graph(graph);
        let dropped = surgery.merge(v, u);
        if dropped != 1 {
            return None;
        }
        let (contracted, labels) = surgery.to_graph();
        let sign = base_sign * Perm::shifted(&labels).sign();
        Some((contracted, sign))
    }

    /// Contraction of an internal-omega edge: delete the edge, reconnect one
    /// remaining edge of `u` to the omega, then merge `u` into epsilon.
    fn contract_into_omega(
        &self,
        graph: &Graph,
        index: usize,
        u: usize,
        omega: usize,
        base_sign: i64,
        previous_has_tadpole: bool,
    ) -> Vec<(Graph, i64)> {
        let eps = self.domain.eps_index();
        let previous_size = graph.size();
        let mut surgery = LabelledGraph::from_graph(graph);
        surgery.delete_edge(u, omega);
        // Merging u into epsilon may close a new tadpole exactly when u and
        // epsilon are adjacent.
        let new_has_tadpole = surgery.has_edge(u, eps);
        if new_has_tadpole && previous_has_tadpole {
            return Vec::new();
        }
        let mut sign = base_sign;
        if new_has_tadpole {
            let k = match surgery.edge_label(u, eps) {
                Some(k) => k,
                None => return Vec::new(),
            };
            surgery.delete_edge(u, eps);
            sign *= if (k % 2 == 0) == (k < index) { 1 } else { -1 };
        }
        let mut images = Vec::new();
        for neighbour in surgery.neighbors(u) {
            let mut branch = surgery.clone();
            let label = match branch.edge_label(u, neighbour) {
                Some(label) => label,
                None => continue,
            };
            branch.delete_edge(u, neighbour);
            branch.add_edge(neighbour, omega, label);
            branch.merge(eps, u);
            let expected_drop = if new_has_tadpole { 2 } else { 1 };
            if previous_size - branch.size() != expected_drop {
                continue;
            }
            let (contracted, labels) = branch.to_graph();
            let branch_sign = sign * Perm::shifted(&labels).sign();
            images.push((contracted, branch_sign));
        }
        images
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
            "wohairy/contractD{}_{}_{}_{}.txt",
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs(),
            self.domain.n_ws()
        )
    }

    fn rank_key(&self) -> String {
        format!(
            "wohairy/contractD{}_{}_{}_{}_rank.txt",
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs(),
            self.domain.n_ws()
        )
    }

    fn get_work_estimate(&self) -> u64 {
        self.domain.n_edges().max(0) as u64 * self.domain.get_work_estimate()
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        let eps = self.domain.eps_index();
        let first_hair = eps + 1 + self.domain.n_ws();
        let previous_has_tadpole = self.domain.eps_tadpole(graph);
        let mut images = Vec::new();
        for (index, (u, v)) in graph.edges().into_iter().enumerate() {
            // Hair edges never contract.
            if u >= first_hair || v >= first_hair {
                continue;
            }
            let mut sign = if index % 2 == 0 { 1 } else { -1 };
            if previous_has_tadpole {
                sign = -sign;
            }
            if v <= eps {
                // Internal-internal or internal-epsilon: keep the higher
                // endpoint so epsilon survives.
                if let Some(image) = self.contract_plain(graph, u, v, sign) {
                    images.push(image);
                }
            } else if u < eps {
                // Internal-omega. Epsilon-omega edges never contract.
                images.extend(self.contract_into_omega(
                    graph,
                    index,
                    u,
                    v,
                    sign,
                    previous_has_tadpole,
                ));
            }
        }
        images
    }
}

/// Operator turning one epsilon decoration into an omega.
///
/// A fresh omega vertex is inserted right after epsilon and one epsilon edge
/// is reconnected to it; the global sign is `(−1)^{edges}`.
pub struct EpsToOmegaOp {
    domain: Arc<WoHairyGvs>,
    target: Arc<WoHairyGvs>,
}

impl EpsToOmegaOp {
    /// Creates the operator with domain `(v, l, h, w)` and target
    /// `(v, l, h, w+1)`.
    pub fn new(n_vertices: usize, n_loops: usize, n_hairs: usize, n_ws: usize) -> Self {
        Self {
            domain: Arc::new(WoHairyGvs::new(n_vertices, n_loops, n_hairs, n_ws)),
            target: Arc::new(WoHairyGvs::new(n_vertices, n_loops, n_hairs, n_ws + 1)),
        }
    }
}

impl GraphOperator for EpsToOmegaOp {
    fn domain(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.domain) as Arc<dyn GraphVectorSpace>
    }

    fn target(&self) -> Arc<dyn GraphVectorSpace> {
        Arc::clone(&self.target) as Arc<dyn GraphVectorSpace>
    }

    fn operator_type(&self) -> &'static str {
        "eps to omega"
    }

    fn matrix_key(&self) -> String {
        format!(
            "wohairy/epstowD{}_{}_{}_{}.txt",
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs(),
            self.domain.n_ws()
        )
    }

    fn rank_key(&self) -> String {
        format!(
            "wohairy/epstowD{}_{}_{}_{}_rank.txt",
            self.domain.n_vertices(),
            self.domain.n_loops(),
            self.domain.n_hairs(),
            self.domain.n_ws()
        )
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        let eps = self.domain.eps_index();
        let sign = if graph.size() % 2 == 0 { 1 } else { -1 };
        // Open a slot for the new omega right after epsilon.
        let shift: Vec<usize> = (0..graph.order())
            .map(|s| if s > eps { s + 1 } else { s })
            .collect();
        let new_omega = eps + 1;
        let mut shifted = LabelledGraph::from_graph(graph);
        shifted.relabel(&shift);
        shifted.add_vertex(new_omega);
        let mut images = Vec::new();
        for neighbour in shifted.neighbors(eps) {
            let mut branch = shifted.clone();
            let label = match branch.edge_label(eps, neighbour) {
                Some(label) => label,
                None => continue,
            };
            branch.delete_edge(eps, neighbour);
            branch.add_edge(neighbour, new_omega, label);
            let (image, _) = branch.to_graph();
            images.push((image, sign));
        }
        images
    }
}
