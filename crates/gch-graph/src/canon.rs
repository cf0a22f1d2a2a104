use gch_core::Perm;

use crate::graph::Graph;
use crate::graph6::to_graph6;

/// An ordered list of disjoint vertex cells covering the vertex set.
///
/// The cells encode vertex rôles (internal, epsilon, omega, numbered hair);
/// canonical labelling and automorphisms only permute vertices within their
/// cell.
pub type Partition = Vec<Vec<usize>>;

/// Result of canonicalising a graph under a coloured partition.
#[derive(Debug, Clone)]
pub struct CanonicalForm {
    /// The canonical representative of the isomorphism class.
    pub graph: Graph,
    /// graph6 encoding of the canonical representative.
    pub g6: String,
    /// Certificate permutation: vertex `i` of the input maps to label
    /// `perm[i]` of the canonical representative.
    pub perm: Perm,
}

/// Computes the canonical form of `(graph, partition)` together with the
/// certificate permutation.
///
/// The canonical representative is the relabelling with the smallest
/// adjacency encoding among all labellings reachable by permuting vertices
/// within their cells; it is found by equitable refinement plus
/// individualisation backtracking.
pub fn canonical_form(graph: &Graph, partition: &Partition) -> CanonicalForm {
    canonical_form_with_automorphisms(graph, partition).0
}

/// One search pass yielding both the canonical form and the automorphism
/// group; basis construction needs the two together for every candidate.
pub fn canonical_form_with_automorphisms(
    graph: &Graph,
    partition: &Partition,
) -> (CanonicalForm, Vec<Perm>) {
    let search = Search::run(graph, partition);
    // The search visits at least one leaf; the identity stands in for the
    // empty tree.
    let (key_graph, perm) = search
        .best
        .unwrap_or_else(|| (graph.clone(), Perm::identity(graph.order())));
    (
        CanonicalForm {
            g6: to_graph6(&key_graph),
            graph: key_graph,
            perm,
        },
        search.automorphisms,
    )
}

/// Enumerates the automorphism group of `(graph, partition)`.
///
/// The returned permutations are exactly the non-identity automorphisms; the
/// list generates the full group, which stays small for the graph sizes the
/// engine handles.
pub fn automorphism_generators(graph: &Graph, partition: &Partition) -> Vec<Perm> {
    Search::run(graph, partition).automorphisms
}

struct Search<'a> {
    graph: &'a Graph,
    best: Option<(Graph, Perm)>,
    automorphisms: Vec<Perm>,
}

impl<'a> Search<'a> {
    fn run(graph: &'a Graph, partition: &Partition) -> Self {
        debug_assert_eq!(
            partition.iter().map(Vec::len).sum::<usize>(),
            graph.order(),
            "partition must cover the vertex set"
        );
        let mut search = Self {
            graph,
            best: None,
            automorphisms: Vec::new(),
        };
        if graph.order() == 0 {
            search.best = Some((Graph::new(0), Perm::identity(0)));
            return search;
        }
        let cells: Vec<Vec<usize>> = partition.iter().filter(|c| !c.is_empty()).cloned().collect();
        search.recurse(cells);
        search
    }

    fn recurse(&mut self, cells: Vec<Vec<usize>>) {
        let cells = refine(self.graph, cells);
        match cells.iter().position(|cell| cell.len() > 1) {
            Some(pos) => {
                let cell = cells[pos].clone();
                for &v in &cell {
                    let mut next: Vec<Vec<usize>> = cells[..pos].to_vec();
                    next.push(vec![v]);
                    next.push(cell.iter().copied().filter(|&w| w != v).collect());
                    next.extend(cells[pos + 1..].iter().cloned());
                    self.recurse(next);
                }
            }
            None => self.visit_leaf(&cells),
        }
    }

    fn visit_leaf(&mut self, cells: &[Vec<usize>]) {
        let mut images = vec![0usize; self.graph.order()];
        for (label, cell) in cells.iter().enumerate() {
            images[cell[0]] = label;
        }
        let perm = Perm::new(images);
        let relabelled = self.graph.relabel(&perm);
        match &self.best {
            None => self.best = Some((relabelled, perm)),
            Some((best_graph, best_perm)) => {
                match relabelled.adjacency_key().cmp(best_graph.adjacency_key()) {
                    std::cmp::Ordering::Less => {
                        self.best = Some((relabelled, perm));
                        self.automorphisms.clear();
                    }
                    std::cmp::Ordering::Equal => {
                        // Two labellings with the same image differ by an
                        // automorphism of the input graph.
                        self.automorphisms.push(best_perm.inverse().compose(&perm));
                    }
                    std::cmp::Ordering::Greater => {}
                }
            }
        }
    }
}

/// Refines the partition to an equitable one: every cell has uniform
/// neighbour counts into every other cell. Splitting is deterministic
/// (ascending neighbour count, preserving relative order) so that the
/// refinement is isomorphism-invariant.
fn refine(graph: &Graph, mut cells: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    loop {
        let mut split_at: Option<(usize, Vec<Vec<usize>>)> = None;
        'scan: for s in 0..cells.len() {
            let splitter: u64 = cells[s].iter().fold(0u64, |m, &v| m | 1 << v);
            for c in 0..cells.len() {
                if cells[c].len() <= 1 {
                    continue;
                }
                let counts: Vec<u32> = cells[c]
                    .iter()
                    .map(|&v| (graph.adjacency_mask(v) & splitter).count_ones())
                    .collect();
                let mut distinct: Vec<u32> = counts.clone();
                distinct.sort_unstable();
                distinct.dedup();
                if distinct.len() > 1 {
                    let parts: Vec<Vec<usize>> = distinct
                        .iter()
                        .map(|&d| {
                            cells[c]
                                .iter()
                                .zip(&counts)
                                .filter(|&(_, &cnt)| cnt == d)
                                .map(|(&v, _)| v)
                                .collect()
                        })
                        .collect();
                    split_at = Some((c, parts));
                    break 'scan;
                }
            }
        }
        match split_at {
            Some((c, parts)) => {
                cells.splice(c..=c, parts);
            }
            None => return cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn cycle(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 0..n {
            g.add_edge(i, (i + 1) % n);
        }
        g
    }

    fn single_cell(n: usize) -> Partition {
        vec![(0..n).collect()]
    }

    #[test]
    fn cycle_automorphisms_form_the_dihedral_group() {
        let g = cycle(5);
        let auts = automorphism_generators(&g, &single_cell(5));
        // Non-identity elements of D5.
        assert_eq!(auts.len(), 9);
        for a in &auts {
            assert_eq!(g.relabel(a), g);
        }
    }

    #[test]
    fn canonical_form_is_relabelling_invariant() {
        let g = cycle(6);
        let base = canonical_form(&g, &single_cell(6));
        for p in (0..6).permutations(6).take(120) {
            let perm = Perm::new(p);
            let h = g.relabel(&perm);
            let c = canonical_form(&h, &single_cell(6));
            assert_eq!(c.g6, base.g6);
            // The certificate actually maps onto the canonical graph.
            assert_eq!(h.relabel(&c.perm), c.graph);
        }
    }

    #[test]
    fn partition_restricts_the_group() {
        // A path 0-1-2: swapping the endpoints is the only symmetry, and it
        // dies once the endpoints live in different cells.
        let mut g = Graph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let free = automorphism_generators(&g, &single_cell(3));
        assert_eq!(free.len(), 1);
        let pinned = automorphism_generators(&g, &vec![vec![0], vec![1, 2]]);
        assert!(pinned.is_empty());
    }

    #[test]
    fn distinct_classes_get_distinct_strings() {
        let c6 = canonical_form(&cycle(6), &single_cell(6));
        let mut two_triangles = Graph::new(6);
        for base in [0, 3] {
            two_triangles.add_edge(base, base + 1);
            two_triangles.add_edge(base + 1, base + 2);
            two_triangles.add_edge(base, base + 2);
        }
        let other = canonical_form(&two_triangles, &single_cell(6));
        assert_ne!(c6.g6, other.g6);
    }
}
