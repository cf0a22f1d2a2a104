use gch_core::Perm;
use gch_graph::{connected_graphs, Graph, Partition};
use gch_spaces::GraphVectorSpace;

use crate::sign::{even_edge_sign, odd_edge_sign};

/// Ordinary graph vector space: connected simple graphs with the given
/// number of vertices and loops, every vertex at least trivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinaryGvs {
    n_vertices: usize,
    n_loops: usize,
    even_edges: bool,
}

impl OrdinaryGvs {
    /// Creates the space descriptor.
    pub fn new(n_vertices: usize, n_loops: usize, even_edges: bool) -> Self {
        Self {
            n_vertices,
            n_loops,
            even_edges,
        }
    }

    /// Number of vertices.
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Number of loops.
    pub fn n_loops(&self) -> usize {
        self.n_loops
    }

    /// Edge parity of the family.
    pub fn even_edges(&self) -> bool {
        self.even_edges
    }

    /// Number of edges: `loops + vertices − 1`.
    pub fn n_edges(&self) -> i64 {
        self.n_loops as i64 + self.n_vertices as i64 - 1
    }

    pub(crate) fn sub_dir(&self) -> &'static str {
        if self.even_edges {
            "evenedge"
        } else {
            "oddedge"
        }
    }
}

impl GraphVectorSpace for OrdinaryGvs {
    fn family(&self) -> &'static str {
        "ordinary"
    }

    fn parameters(&self) -> Vec<(&'static str, i64)> {
        vec![
            ("vertices", self.n_vertices as i64),
            ("loops", self.n_loops as i64),
            ("even_edges", i64::from(self.even_edges)),
        ]
    }

    fn basis_key(&self) -> String {
        format!(
            "ordinary/{}/gra{}_{}.g6",
            self.sub_dir(),
            self.n_vertices,
            self.n_loops
        )
    }

    fn is_valid(&self) -> bool {
        let v = self.n_vertices as i64;
        let e = self.n_edges();
        3 * v <= 2 * e && v > 0 && e >= 0 && e <= v * (v - 1) / 2
    }

    fn get_partition(&self) -> Partition {
        vec![(0..self.n_vertices).collect()]
    }

    fn get_work_estimate(&self) -> u64 {
        if !self.is_valid() {
            return 0;
        }
        // Candidate count over the symmetry order: C(v(v−1)/2, e) / v!.
        let slots = (self.n_vertices * (self.n_vertices - 1) / 2) as u64;
        let e = self.n_edges() as u64;
        let mut candidates = 1u128;
        for k in 0..e.min(slots) {
            candidates = candidates.saturating_mul((slots - k) as u128) / (k as u128 + 1);
        }
        let mut symmetry = 1u128;
        for k in 1..=self.n_vertices as u128 {
            symmetry = symmetry.saturating_mul(k);
        }
        ((candidates / symmetry).min(u64::MAX as u128) as u64).max(1)
    }

    fn get_generating_graphs(&self) -> Box<dyn Iterator<Item = Graph> + '_> {
        if !self.is_valid() {
            return Box::new(std::iter::empty());
        }
        Box::new(connected_graphs(self.n_vertices, self.n_edges() as usize, 3).into_iter())
    }

    fn perm_sign(&self, graph: &Graph, p: &Perm) -> i64 {
        if self.even_edges {
            even_edge_sign(graph, p)
        } else {
            odd_edge_sign(graph, p)
        }
    }
}
