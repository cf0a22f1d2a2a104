use gch_core::Perm;
use gch_graph::{simple_graphs, Graph, Partition};
use gch_op::HairAction;
use gch_ordinary::odd_edge_sign;
use gch_spaces::GraphVectorSpace;
use itertools::Itertools;

/// Wo-hairy graph vector space.
///
/// Vertex layout: internal vertices `0..v`, the epsilon vertex at `v`, the
/// omega vertices at `v+1..v+1+w`, and the numbered hairs at the end. Omega
/// vertices and hairs have degree exactly one; `n_edges = loops + vertices`
/// counts everything except hair edges. The epsilon vertex may carry one
/// tadpole, which is not stored in the graph: [`WoHairyGvs::eps_tadpole`]
/// recovers it from the edge-count shortfall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoHairyGvs {
    n_vertices: usize,
    n_loops: usize,
    n_hairs: usize,
    n_ws: usize,
}

impl WoHairyGvs {
    /// Creates the space descriptor.
    pub fn new(n_vertices: usize, n_loops: usize, n_hairs: usize, n_ws: usize) -> Self {
        Self {
            n_vertices,
            n_loops,
            n_hairs,
            n_ws,
        }
    }

    /// Number of internal vertices.
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Number of loops.
    pub fn n_loops(&self) -> usize {
        self.n_loops
    }

    /// Number of numbered hairs.
    pub fn n_hairs(&self) -> usize {
        self.n_hairs
    }

    /// Number of omega decorations.
    pub fn n_ws(&self) -> usize {
        self.n_ws
    }

    /// Number of internal, epsilon and omega edges: `loops + vertices`.
    pub fn n_edges(&self) -> i64 {
        self.n_loops as i64 + self.n_vertices as i64
    }

    /// Index of the epsilon vertex.
    pub fn eps_index(&self) -> usize {
        self.n_vertices
    }

    /// Total number of vertices of a member graph.
    pub fn total_vertices(&self) -> usize {
        self.n_vertices + 1 + self.n_ws + self.n_hairs
    }

    /// Returns true when the graph carries the implicit epsilon tadpole:
    /// the stored edge count falls one short of `n_edges + n_hairs`.
    pub fn eps_tadpole(&self, graph: &Graph) -> bool {
        (graph.size() as i64) < self.n_edges() + self.n_hairs as i64
    }

    /// Builds candidate graphs for one tadpole state.
    ///
    /// Core graphs live on the internal, epsilon and omega vertices with
    /// `n_edges − t` edges and omega degree at most one; numbered hairs then
    /// attach anywhere that keeps every omega univalent and every internal
    /// vertex trivalent, and the whole graph must be connected once epsilon
    /// and all omegas are identified.
    fn candidates_with_tadpole(&self, tadpole: bool) -> Vec<Graph> {
        let v = self.n_vertices;
        let w = self.n_ws;
        let h = self.n_hairs;
        let core_order = v + 1 + w;
        let eps = self.eps_index();
        let core_edges = self.n_edges() - i64::from(tadpole);
        if core_edges < 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for core in simple_graphs(core_order, core_edges as usize, 0) {
            if (eps + 1..core_order).any(|omega| core.degree(omega) > 1) {
                continue;
            }
            // Each numbered hair picks its attachment vertex.
            for attachment in (0..h).map(|_| 0..core_order).multi_cartesian_product() {
                if let Some(graph) = self.decorate(&core, &attachment, tadpole) {
                    out.push(graph);
                }
            }
            if h == 0 {
                if let Some(graph) = self.decorate(&core, &[], tadpole) {
                    out.push(graph);
                }
            }
        }
        out
    }

    fn decorate(&self, core: &Graph, attachment: &[usize], tadpole: bool) -> Option<Graph> {
        let v = self.n_vertices;
        let w = self.n_ws;
        let eps = self.eps_index();
        let core_order = v + 1 + w;
        let mut hair_count = vec![0usize; core_order];
        for &target in attachment {
            hair_count[target] += 1;
        }
        // Omegas are single decorations, internal vertices at least
        // trivalent counting everything incident.
        if (eps + 1..core_order).any(|omega| core.degree(omega) + hair_count[omega] != 1) {
            return None;
        }
        if (0..v).any(|i| core.degree(i) + hair_count[i] < 3) {
            return None;
        }
        // At least one epsilon or omega decoration.
        let eps_degree = core.degree(eps) + hair_count[eps] + 2 * usize::from(tadpole);
        if w == 0 && eps_degree == 0 {
            return None;
        }
        // Connected once epsilon and the omegas are identified.
        let mut merged = Graph::new(core_order + attachment.len());
        for (a, b) in core.edges() {
            let a = if a > eps { eps } else { a };
            let b = if b > eps { eps } else { b };
            if a != b {
                merged.add_edge(a, b);
            }
        }
        for (hair, &target) in attachment.iter().enumerate() {
            let target = if target > eps { eps } else { target };
            merged.add_edge(target, core_order + hair);
        }
        // Ignore the unused omega slots when checking connectivity.
        let mut reachable = merged.clone();
        for omega in eps + 1..core_order {
            reachable.add_edge(eps, omega);
        }
        if !reachable.is_connected() {
            return None;
        }

        let mut graph = Graph::new(self.total_vertices());
        for (a, b) in core.edges() {
            graph.add_edge(a, b);
        }
        for (hair, &target) in attachment.iter().enumerate() {
            graph.add_edge(target, core_order + hair);
        }
        Some(graph)
    }
}

impl GraphVectorSpace for WoHairyGvs {
    fn family(&self) -> &'static str {
        "wohairy"
    }

    fn parameters(&self) -> Vec<(&'static str, i64)> {
        vec![
            ("vertices", self.n_vertices as i64),
            ("loops", self.n_loops as i64),
            ("hairs", self.n_hairs as i64),
            ("ws", self.n_ws as i64),
        ]
    }

    fn basis_key(&self) -> String {
        format!(
            "wohairy/wogra{}_{}_{}_{}.g6",
            self.n_vertices, self.n_loops, self.n_hairs, self.n_ws
        )
    }

    fn is_valid(&self) -> bool {
        let v = self.n_vertices as i64;
        let e = self.n_edges();
        3 * v + self.n_ws as i64 <= 2 * e + self.n_hairs as i64 && e >= 0
    }

    fn get_partition(&self) -> Partition {
        let v = self.n_vertices;
        let w = self.n_ws;
        let mut cells: Partition = vec![
            (0..v).collect(),
            vec![v],
            (v + 1..v + 1 + w).collect(),
        ];
        for hair in v + 1 + w..self.total_vertices() {
            cells.push(vec![hair]);
        }
        cells
    }

    fn get_work_estimate(&self) -> u64 {
        if !self.is_valid() {
            return 0;
        }
        let core_order = (self.n_vertices + 1 + self.n_ws) as u64;
        core_order
            .saturating_pow(self.n_hairs as u32)
            .saturating_mul(1 + self.n_edges().max(0) as u64)
    }

    fn get_generating_graphs(&self) -> Box<dyn Iterator<Item = Graph> + '_> {
        if !self.is_valid() {
            return Box::new(std::iter::empty());
        }
        let mut candidates = self.candidates_with_tadpole(false);
        candidates.extend(self.candidates_with_tadpole(true));
        Box::new(candidates.into_iter())
    }

    fn perm_sign(&self, graph: &Graph, p: &Perm) -> i64 {
        // The odd-edge recipe on the whole graph, times the signature of the
        // block after epsilon (omega decorations are odd).
        let mut sign = odd_edge_sign(graph, p);
        if self.n_ws > 0 {
            let tail = &p.images()[self.n_vertices + 1..];
            if !tail.is_empty() {
                sign *= Perm::shifted(tail).sign();
            }
        }
        sign
    }
}

impl HairAction for WoHairyGvs {
    fn n_hairs(&self) -> usize {
        self.n_hairs
    }

    fn vertex_permutation(&self, hair_perm: &Perm) -> Perm {
        let fixed = self.n_vertices + 1 + self.n_ws;
        let mut images: Vec<usize> = (0..fixed).collect();
        images.extend(hair_perm.images().iter().map(|&j| fixed + j));
        Perm::new(images)
    }
}
