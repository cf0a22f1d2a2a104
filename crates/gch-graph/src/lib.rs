#![deny(missing_docs)]

//! Small dense simple graphs, graph6 encoding, coloured-partition canonical
//! labelling with permutation certificates, automorphism enumeration, and the
//! generators that enumerate candidate graphs for basis construction.

mod canon;
mod enumerate;
mod graph;
mod graph6;
mod hash;
mod surgery;

pub use canon::{
    automorphism_generators, canonical_form, canonical_form_with_automorphisms, CanonicalForm,
    Partition,
};
pub use enumerate::{connected_graphs, simple_graphs};
pub use graph::{Graph, MAX_VERTICES};
pub use graph6::{from_graph6, to_graph6};
pub use hash::canonical_hash;
pub use surgery::LabelledGraph;
