use gch_core::Perm;
use gch_graph::{connected_graphs, Graph, Partition};
use gch_ordinary::{even_edge_sign, odd_edge_sign};
use gch_spaces::GraphVectorSpace;
use itertools::Itertools;

/// Hairy graph vector space.
///
/// A member graph consists of `n_vertices` internal vertices followed by
/// `n_hairs` interchangeable hair vertices of degree one; internal vertices
/// are at least trivalent counting their hairs. `n_edges` counts internal
/// edges only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HairyGvs {
    n_vertices: usize,
    n_loops: usize,
    n_hairs: usize,
    even_edges: bool,
    even_hairs: bool,
}

impl HairyGvs {
    /// Creates the space descriptor.
    pub fn new(
        n_vertices: usize,
        n_loops: usize,
        n_hairs: usize,
        even_edges: bool,
        even_hairs: bool,
    ) -> Self {
        Self {
            n_vertices,
            n_loops,
            n_hairs,
            even_edges,
            even_hairs,
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

    /// Number of hairs.
    pub fn n_hairs(&self) -> usize {
        self.n_hairs
    }

    /// Edge parity.
    pub fn even_edges(&self) -> bool {
        self.even_edges
    }

    /// Hair parity.
    pub fn even_hairs(&self) -> bool {
        self.even_hairs
    }

    /// Number of internal edges: `loops + vertices − 1`.
    pub fn n_edges(&self) -> i64 {
        self.n_loops as i64 + self.n_vertices as i64 - 1
    }

    pub(crate) fn sub_dir(&self) -> String {
        format!(
            "{}_{}",
            if self.even_edges { "evenedge" } else { "oddedge" },
            if self.even_hairs { "evenhair" } else { "oddhair" }
        )
    }

    /// Distributes hairs over the internal graph and appends the hair
    /// vertices; yields one graph per multiset of attachment points that
    /// leaves every internal vertex trivalent.
    fn decorate(&self, internal: &Graph) -> Vec<Graph> {
        let v = self.n_vertices;
        let h = self.n_hairs;
        let mut out = Vec::new();
        for attachment in (0..v).combinations_with_replacement(h) {
            let mut hair_count = vec![0usize; v];
            for &w in &attachment {
                hair_count[w] += 1;
            }
            if (0..v).any(|w| internal.degree(w) + hair_count[w] < 3) {
                continue;
            }
            let mut decorated = Graph::new(v + h);
            for (a, b) in internal.edges() {
                decorated.add_edge(a, b);
            }
            for (hair, &w) in attachment.iter().enumerate() {
                decorated.add_edge(w, v + hair);
            }
            out.push(decorated);
        }
        out
    }
}

impl GraphVectorSpace for HairyGvs {
    fn family(&self) -> &'static str {
        "hairy"
    }

    fn parameters(&self) -> Vec<(&'static str, i64)> {
        vec![
            ("vertices", self.n_vertices as i64),
            ("loops", self.n_loops as i64),
            ("hairs", self.n_hairs as i64),
            ("even_edges", i64::from(self.even_edges)),
            ("even_hairs", i64::from(self.even_hairs)),
        ]
    }

    fn basis_key(&self) -> String {
        format!(
            "hairy/{}/gra{}_{}_{}.g6",
            self.sub_dir(),
            self.n_vertices,
            self.n_loops,
            self.n_hairs
        )
    }

    fn is_valid(&self) -> bool {
        let v = self.n_vertices as i64;
        let e = self.n_edges();
        let h = self.n_hairs as i64;
        3 * v <= 2 * e + h
            && v > 0
            && self.n_loops as i64 >= 0
            && h >= 0
            && e >= 0
            && e <= v * (v - 1) / 2
    }

    fn get_partition(&self) -> Partition {
        vec![
            (0..self.n_vertices).collect(),
            (self.n_vertices..self.n_vertices + self.n_hairs).collect(),
        ]
    }

    fn get_work_estimate(&self) -> u64 {
        if !self.is_valid() {
            return 0;
        }
        // Internal candidates times the hair placements.
        let internal = OrdinaryWorkEstimate {
            n_vertices: self.n_vertices,
            n_edges: self.n_edges() as u64,
        }
        .estimate();
        internal.saturating_mul((self.n_vertices as u64).saturating_pow(self.n_hairs as u32))
    }

    fn get_generating_graphs(&self) -> Box<dyn Iterator<Item = Graph> + '_> {
        if !self.is_valid() {
            return Box::new(std::iter::empty());
        }
        let min_degree = if self.n_vertices == 1 { 0 } else { 1 };
        let internals = connected_graphs(self.n_vertices, self.n_edges() as usize, min_degree);
        Box::new(
            internals
                .into_iter()
                .flat_map(move |internal| self.decorate(&internal)),
        )
    }

    fn perm_sign(&self, graph: &Graph, p: &Perm) -> i64 {
        // Ordinary sign on the whole graph, hairs included.
        let mut sign = if self.even_edges {
            even_edge_sign(graph, p)
        } else {
            odd_edge_sign(graph, p)
        };
        // The hair-block signature enters when hair parity equals edge
        // parity.
        if self.even_hairs == self.even_edges {
            let hair_block = &p.images()[self.n_vertices..];
            if !hair_block.is_empty() {
                sign *= Perm::shifted(hair_block).sign();
            }
        }
        sign
    }
}

struct OrdinaryWorkEstimate {
    n_vertices: usize,
    n_edges: u64,
}

impl OrdinaryWorkEstimate {
    fn estimate(&self) -> u64 {
        let slots = (self.n_vertices * self.n_vertices.saturating_sub(1) / 2) as u64;
        let mut candidates = 1u128;
        for k in 0..self.n_edges.min(slots) {
            candidates = candidates.saturating_mul((slots - k) as u128) / (k as u128 + 1);
        }
        candidates.min(u64::MAX as u128) as u64
    }
}
