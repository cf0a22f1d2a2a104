use gch_core::Perm;
use gch_graph::{Graph, LabelledGraph};

/// Sign of relabelling `graph` by `p` under the even-edge convention.
///
/// The sign is the vertex-permutation signature times −1 for every edge
/// whose orientation flips; edges are oriented from the larger towards the
/// smaller endpoint.
pub fn even_edge_sign(graph: &Graph, p: &Perm) -> i64 {
    let mut sign = p.sign();
    for (u, v) in graph.edges() {
        if p.image(u) > p.image(v) {
            sign = -sign;
        }
    }
    sign
}

/// Sign of relabelling `graph` by `p` under the odd-edge convention.
///
/// Edges are labelled lexicographically, the graph is relabelled, and the
/// sign is the signature of the induced permutation of edge labels.
pub fn odd_edge_sign(graph: &Graph, p: &Perm) -> i64 {
    let mut surgery = LabelledGraph::from_graph(graph);
    surgery.relabel(p.images());
    let (_, labels) = surgery.to_graph();
    Perm::new(labels).sign()
}
