use crate::graph::Graph;

/// A graph mid-surgery: vertices live in fixed slots, edges carry labels.
///
/// Family operators (edge contraction, hair moves) work on this form: edges
/// are first enumerated lexicographically, then vertices are merged, deleted
/// or reconnected, and finally the graph is compacted back to `{0,…,k−1}`
/// with the surviving labels read off in the new lexicographic edge order.
/// The label sequence determines the edge-permutation sign of the operation.
#[derive(Debug, Clone)]
pub struct LabelledGraph {
    live: Vec<bool>,
    edges: Vec<(usize, usize, usize)>,
}

impl LabelledGraph {
    /// Starts surgery on `graph`, labelling edges `0..E` in lexicographic
    /// order.
    pub fn from_graph(graph: &Graph) -> Self {
        let edges = graph
            .edges()
            .into_iter()
            .enumerate()
            .map(|(label, (u, v))| (u, v, label))
            .collect();
        Self {
            live: vec![true; graph.order()],
            edges,
        }
    }

    /// Number of live vertices.
    pub fn order(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    /// Returns true when `{u, v}` is an edge.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        let (u, v) = ordered(u, v);
        self.edges.iter().any(|&(a, b, _)| (a, b) == (u, v))
    }

    /// The label of edge `{u, v}`, if present.
    pub fn edge_label(&self, u: usize, v: usize) -> Option<usize> {
        let (u, v) = ordered(u, v);
        self.edges
            .iter()
            .find(|&&(a, b, _)| (a, b) == (u, v))
            .map(|&(_, _, label)| label)
    }

    /// Removes the edge `{u, v}` if present.
    pub fn delete_edge(&mut self, u: usize, v: usize) {
        let (u, v) = ordered(u, v);
        self.edges.retain(|&(a, b, _)| (a, b) != (u, v));
    }

    /// Adds an edge with an explicit label. The endpoints must be live and
    /// the edge absent.
    pub fn add_edge(&mut self, u: usize, v: usize, label: usize) {
        debug_assert!(self.live[u] && self.live[v] && u != v);
        debug_assert!(!self.has_edge(u, v));
        let (u, v) = ordered(u, v);
        self.edges.push((u, v, label));
    }

    /// Marks a fresh slot as live, growing the slot table as needed.
    pub fn add_vertex(&mut self, slot: usize) {
        if slot >= self.live.len() {
            self.live.resize(slot + 1, false);
        }
        debug_assert!(!self.live[slot]);
        self.live[slot] = true;
    }

    /// Neighbours of `u` in ascending order.
    pub fn neighbors(&self, u: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .edges
            .iter()
            .filter_map(|&(a, b, _)| {
                if a == u {
                    Some(b)
                } else if b == u {
                    Some(a)
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Moves every live slot `s` to `map[s]`. The map must be injective on
    /// live slots; slots beyond the table keep their position.
    pub fn relabel(&mut self, map: &[usize]) {
        let target = |s: usize| -> usize {
            if s < map.len() {
                map[s]
            } else {
                s
            }
        };
        let top = self
            .live
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l)
            .map(|(s, _)| target(s))
            .max()
            .map_or(0, |m| m + 1);
        let mut live = vec![false; top.max(self.live.len())];
        for (s, &l) in self.live.iter().enumerate() {
            if l {
                live[target(s)] = true;
            }
        }
        for edge in &mut self.edges {
            let (u, v) = ordered(target(edge.0), target(edge.1));
            edge.0 = u;
            edge.1 = v;
        }
        self.live = live;
    }

    /// Merges `remove` into `keep`: edges at `remove` are redirected to
    /// `keep`, loops are discarded and parallel edges collapse onto their
    /// first occurrence. Returns the number of edges dropped.
    pub fn merge(&mut self, keep: usize, remove: usize) -> usize {
        let before = self.edges.len();
        let mut seen: Vec<(usize, usize)> = Vec::with_capacity(before);
        let mut merged: Vec<(usize, usize, usize)> = Vec::with_capacity(before);
        for &(a, b, label) in &self.edges {
            let a = if a == remove { keep } else { a };
            let b = if b == remove { keep } else { b };
            if a == b {
                continue;
            }
            let (a, b) = ordered(a, b);
            if seen.contains(&(a, b)) {
                continue;
            }
            seen.push((a, b));
            merged.push((a, b, label));
        }
        self.edges = merged;
        self.live[remove] = false;
        before - self.edges.len()
    }

    /// Compacts the live slots to `{0,…,k−1}` in ascending order and returns
    /// the resulting graph together with the edge labels read in the new
    /// lexicographic edge order.
    pub fn to_graph(&self) -> (Graph, Vec<usize>) {
        let slots: Vec<usize> = self
            .live
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l)
            .map(|(s, _)| s)
            .collect();
        let mut position = vec![usize::MAX; self.live.len()];
        for (idx, &s) in slots.iter().enumerate() {
            position[s] = idx;
        }
        let mut graph = Graph::new(slots.len());
        let mut relocated: Vec<(usize, usize, usize)> = self
            .edges
            .iter()
            .map(|&(u, v, label)| {
                let (u, v) = ordered(position[u], position[v]);
                (u, v, label)
            })
            .collect();
        relocated.sort_unstable();
        let labels = relocated.iter().map(|&(_, _, label)| label).collect();
        for &(u, v, _) in &relocated {
            graph.add_edge(u, v);
        }
        (graph, labels)
    }

}

fn ordered(u: usize, v: usize) -> (usize, usize) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> Graph {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g
    }

    #[test]
    fn merge_counts_dropped_edges() {
        // Contracting an edge of the triangle collapses the third side.
        let g = triangle_with_tail();
        let mut lg = LabelledGraph::from_graph(&g);
        let dropped = lg.merge(0, 1);
        // Loop (0,1) plus the parallel copy of (0,2).
        assert_eq!(dropped, 2);
        assert_eq!(lg.order(), 3);
    }

    #[test]
    fn compaction_preserves_labels() {
        let g = triangle_with_tail();
        let mut lg = LabelledGraph::from_graph(&g);
        // Contract the tail edge (2,3): labels 0,1,2 survive in order.
        let dropped = lg.merge(2, 3);
        assert_eq!(dropped, 1);
        let (h, labels) = lg.to_graph();
        assert_eq!(h.order(), 3);
        assert_eq!(h.size(), 3);
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn relabel_with_gap_then_add_vertex() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let mut lg = LabelledGraph::from_graph(&g);
        // Open a gap at slot 1.
        lg.relabel(&[0, 2, 3]);
        lg.add_vertex(1);
        lg.add_edge(0, 1, 7);
        let (h, labels) = lg.to_graph();
        assert_eq!(h.order(), 4);
        assert_eq!(labels, vec![7, 0, 1]);
    }
}
