use gch_core::{GchError, Perm};
use gch_graph::{
    automorphism_generators, canonical_form, canonical_form_with_automorphisms, Graph, Partition,
};
use gch_store::Store;
use indexmap::IndexMap;

use crate::basis::{format_basis, parse_basis, parse_basis_header};

/// Capability contract every graph vector space family implements.
///
/// A space is a descriptor: construction never touches the store, and all
/// content (the basis) is materialised lazily through [`build_basis`]. Two
/// spaces denote the same instance exactly when family tag and parameter
/// list agree.
///
/// [`build_basis`]: GraphVectorSpace::build_basis
pub trait GraphVectorSpace: Send + Sync {
    /// Family tag, e.g. `"ordinary"`.
    fn family(&self) -> &'static str;

    /// Ordered parameter-name/value pairs identifying the instance.
    fn parameters(&self) -> Vec<(&'static str, i64)>;

    /// Store key of the basis file.
    fn basis_key(&self) -> String;

    /// Whether the parameters satisfy the family's validity predicates.
    fn is_valid(&self) -> bool;

    /// The coloured vertex partition respected by canonical labelling.
    fn get_partition(&self) -> Partition;

    /// Scheduling weight; never affects correctness.
    fn get_work_estimate(&self) -> u64;

    /// Lazily enumerates candidate graphs. The sequence may contain several
    /// representatives per isomorphism class and is consumed once per build.
    fn get_generating_graphs(&self) -> Box<dyn Iterator<Item = Graph> + '_>;

    /// Family sign of relabelling a basis graph by `p`.
    fn perm_sign(&self, graph: &Graph, p: &Perm) -> i64;

    /// Human readable description.
    fn name(&self) -> String {
        let params: Vec<String> = self
            .parameters()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("<{} {}>", self.family(), params.join(", "))
    }

    /// Descriptor identity: family and parameter list.
    fn is_same_space(&self, other: &dyn GraphVectorSpace) -> bool {
        self.family() == other.family() && self.parameters() == other.parameters()
    }

    /// Canonicalises a graph in this space's partition and returns the
    /// canonical graph6 string together with the certificate sign.
    fn graph_to_canon_g6(&self, graph: &Graph) -> (String, i64) {
        let canon = canonical_form(graph, &self.get_partition());
        let sign = self.perm_sign(graph, &canon.perm);
        (canon.g6, sign)
    }

    /// Returns true when some automorphism of the graph acts with sign −1;
    /// such classes vanish in the vector space.
    fn has_odd_automorphisms(&self, graph: &Graph, partition: &Partition) -> bool {
        automorphism_generators(graph, partition)
            .iter()
            .any(|aut| self.perm_sign(graph, aut) == -1)
    }

    /// Returns true when the basis file exists.
    fn basis_built(&self, store: &dyn Store) -> bool {
        store.exists(&self.basis_key())
    }

    /// Builds the basis file: enumerate candidates, canonicalise, reject odd
    /// classes, deduplicate and store the sorted list. Existing files are
    /// kept unless `ignore_existing` is set; invalid spaces produce nothing.
    fn build_basis(&self, store: &dyn Store, ignore_existing: bool) -> Result<(), GchError> {
        if !self.is_valid() {
            return Ok(());
        }
        let key = self.basis_key();
        if store.exists(&key) && !ignore_existing {
            return Ok(());
        }
        let partition = self.get_partition();
        let mut basis: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        for graph in self.get_generating_graphs() {
            let (canon, automorphisms) = canonical_form_with_automorphisms(&graph, &partition);
            if basis.contains(&canon.g6) {
                continue;
            }
            if automorphisms
                .iter()
                .any(|aut| self.perm_sign(&graph, aut) == -1)
            {
                continue;
            }
            basis.insert(canon.g6);
        }
        let basis: Vec<String> = basis.into_iter().collect();
        store.put(&key, format_basis(&basis).as_bytes())
    }

    /// The dimension: 0 for invalid spaces, otherwise the basis header.
    fn get_dimension(&self, store: &dyn Store) -> Result<usize, GchError> {
        if !self.is_valid() {
            return Ok(0);
        }
        let bytes = store.get(&self.basis_key())?;
        parse_basis_header(&String::from_utf8_lossy(&bytes))
    }

    /// The basis as canonical graph6 strings, in stored order. Invalid
    /// spaces yield the empty list.
    fn get_basis(&self, store: &dyn Store) -> Result<Vec<String>, GchError> {
        if !self.is_valid() {
            return Ok(Vec::new());
        }
        let bytes = store.get(&self.basis_key())?;
        parse_basis(&String::from_utf8_lossy(&bytes))
    }

    /// The lookup from canonical string to basis position.
    fn basis_lookup(&self, store: &dyn Store) -> Result<IndexMap<String, usize>, GchError> {
        Ok(self
            .get_basis(store)?
            .into_iter()
            .enumerate()
            .map(|(index, g6)| (g6, index))
            .collect())
    }
}
