use crate::graph::Graph;

/// Enumerates connected simple graphs on `n` labelled vertices with exactly
/// `n_edges` edges and minimum degree at least `min_degree`.
///
/// This fills the rôle nauty's `geng` plays for basis generation: the output
/// may contain several representatives of one isomorphism class; callers
/// deduplicate through canonicalisation. Backtracks over the edge positions
/// in lexicographic order with a degree-deficit bound.
pub fn connected_graphs(n: usize, n_edges: usize, min_degree: usize) -> Vec<Graph> {
    enumerate(n, n_edges, min_degree, true)
}

/// Like [`connected_graphs`], but keeps disconnected graphs too. Used by
/// families whose decorations reconnect the components afterwards.
pub fn simple_graphs(n: usize, n_edges: usize, min_degree: usize) -> Vec<Graph> {
    enumerate(n, n_edges, min_degree, false)
}

fn enumerate(n: usize, n_edges: usize, min_degree: usize, connected: bool) -> Vec<Graph> {
    let max_edges = n * n.saturating_sub(1) / 2;
    if n_edges > max_edges || min_degree * n > 2 * n_edges {
        return Vec::new();
    }
    if n == 0 {
        return if n_edges == 0 {
            vec![Graph::new(0)]
        } else {
            Vec::new()
        };
    }
    let positions: Vec<(usize, usize)> = (0..n)
        .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
        .collect();
    let mut out = Vec::new();
    let mut degrees = vec![0usize; n];
    let mut chosen: Vec<(usize, usize)> = Vec::with_capacity(n_edges);
    extend(
        &positions,
        0,
        n_edges,
        min_degree,
        connected,
        &mut degrees,
        &mut chosen,
        &mut out,
    );
    out
}

#[allow(clippy::too_many_arguments)]
fn extend(
    positions: &[(usize, usize)],
    from: usize,
    remaining: usize,
    min_degree: usize,
    connected: bool,
    degrees: &mut Vec<usize>,
    chosen: &mut Vec<(usize, usize)>,
    out: &mut Vec<Graph>,
) {
    if remaining == 0 {
        if degrees.iter().all(|&d| d >= min_degree) {
            let mut graph = Graph::new(degrees.len());
            for &(u, v) in chosen.iter() {
                graph.add_edge(u, v);
            }
            if !connected || graph.is_connected() {
                out.push(graph);
            }
        }
        return;
    }
    if positions.len() - from < remaining {
        return;
    }
    // Every placed edge repairs at most two units of degree deficit.
    let deficit: usize = degrees
        .iter()
        .map(|&d| min_degree.saturating_sub(d))
        .sum();
    if deficit > 2 * remaining {
        return;
    }
    // A vertex whose remaining incident positions cannot close its deficit
    // dooms the branch.
    for v in 0..degrees.len() {
        let need = min_degree.saturating_sub(degrees[v]);
        if need == 0 {
            continue;
        }
        let available = positions[from..]
            .iter()
            .filter(|&&(a, b)| a == v || b == v)
            .count();
        if available < need {
            return;
        }
    }
    let (u, v) = positions[from];
    // Take the edge.
    degrees[u] += 1;
    degrees[v] += 1;
    chosen.push((u, v));
    extend(positions, from + 1, remaining - 1, min_degree, connected, degrees, chosen, out);
    chosen.pop();
    degrees[u] -= 1;
    degrees[v] -= 1;
    // Skip the edge.
    extend(positions, from + 1, remaining, min_degree, connected, degrees, chosen, out);
}
