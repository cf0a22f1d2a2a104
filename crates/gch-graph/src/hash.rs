use sha2::{Digest, Sha256};

use crate::canon::{canonical_form, Partition};
use crate::graph::Graph;

/// Computes a structural hash of `(graph, partition)`.
///
/// Two graphs receive the same hash exactly when they are isomorphic
/// respecting the partition; the digest is taken over the canonical graph6
/// string together with the cell sizes.
pub fn canonical_hash(graph: &Graph, partition: &Partition) -> String {
    let canon = canonical_form(graph, partition);
    let mut hasher = Sha256::new();
    hasher.update(canon.g6.as_bytes());
    for cell in partition {
        hasher.update((cell.len() as u64).to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gch_core::Perm;

    #[test]
    fn hash_is_invariant_under_relabelling() {
        let mut g = Graph::new(4);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        let partition = vec![vec![0, 1, 2, 3]];
        let h = g.relabel(&Perm::new(vec![3, 1, 0, 2]));
        assert_eq!(
            canonical_hash(&g, &partition),
            canonical_hash(&h, &partition)
        );
    }
}
