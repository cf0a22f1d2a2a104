use std::sync::Arc;

use gch_core::{Config, Perm};
use gch_graph::{connected_graphs, Graph, Partition};
use gch_linalg::{RankMode, SparseMatrix};
use gch_op::{Differential, GraphOperator, OperatorCollection, RankStatus};
use gch_spaces::GraphVectorSpace;
use gch_store::{FsStore, Store};
use tempfile::TempDir;

/// Toy family: isomorphism classes of connected graphs on `n` vertices with
/// `edges` edges, all signs +1.
struct ToySpace {
    n: usize,
    edges: usize,
}

impl ToySpace {
    fn arc(n: usize, edges: usize) -> Arc<dyn GraphVectorSpace> {
        Arc::new(Self { n, edges })
    }
}

impl GraphVectorSpace for ToySpace {
    fn family(&self) -> &'static str {
        "toy"
    }

    fn parameters(&self) -> Vec<(&'static str, i64)> {
        vec![("vertices", self.n as i64), ("edges", self.edges as i64)]
    }

    fn basis_key(&self) -> String {
        format!("toy/gra{}_{}.g6", self.n, self.edges)
    }

    fn is_valid(&self) -> bool {
        self.n >= 1 && self.edges >= self.n.saturating_sub(1)
    }

    fn get_partition(&self) -> Partition {
        vec![(0..self.n).collect()]
    }

    fn get_work_estimate(&self) -> u64 {
        (self.n * self.edges) as u64
    }

    fn get_generating_graphs(&self) -> Box<dyn Iterator<Item = Graph> + '_> {
        Box::new(connected_graphs(self.n, self.edges, 1).into_iter())
    }

    fn perm_sign(&self, _graph: &Graph, _p: &Perm) -> i64 {
        1
    }
}

/// Deletes one edge at a time; disconnected images fall outside the target
/// basis and must be projected away by the builder.
struct DeleteEdgeOp {
    n: usize,
    edges: usize,
}

impl GraphOperator for DeleteEdgeOp {
    fn domain(&self) -> Arc<dyn GraphVectorSpace> {
        ToySpace::arc(self.n, self.edges)
    }

    fn target(&self) -> Arc<dyn GraphVectorSpace> {
        ToySpace::arc(self.n, self.edges - 1)
    }

    fn operator_type(&self) -> &'static str {
        "delete edge"
    }

    fn matrix_key(&self) -> String {
        format!("toy/deleteD{}_{}.txt", self.n, self.edges)
    }

    fn rank_key(&self) -> String {
        format!("toy/deleteD{}_{}_rank.txt", self.n, self.edges)
    }

    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)> {
        graph
            .edges()
            .into_iter()
            .map(|(u, v)| {
                let mut image = graph.clone();
                image.remove_edge(u, v);
                (image, 1)
            })
            .collect()
    }
}

fn cycle(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for i in 0..n {
        g.add_edge(i, (i + 1) % n);
    }
    g
}

fn paw() -> Graph {
    let mut g = Graph::new(4);
    g.add_edge(0, 1);
    g.add_edge(0, 2);
    g.add_edge(1, 2);
    g.add_edge(2, 3);
    g
}

fn path(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for i in 0..n - 1 {
        g.add_edge(i, i + 1);
    }
    g
}

fn star(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for i in 1..n {
        g.add_edge(0, i);
    }
    g
}

#[test]
fn matrix_entries_match_hand_count_and_project_lost_images() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = DeleteEdgeOp { n: 4, edges: 4 };
    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();

    let matrix = op.get_matrix(&store).unwrap();
    assert_eq!(matrix.shape(), (2, 2));

    let domain = op.domain();
    let target = op.target();
    let row_of = |g: &Graph| domain.basis_lookup(&store).unwrap()[&domain.graph_to_canon_g6(g).0];
    let col_of = |g: &Graph| target.basis_lookup(&store).unwrap()[&target.graph_to_canon_g6(g).0];

    let c4_row = row_of(&cycle(4));
    let paw_row = row_of(&paw());
    let path_col = col_of(&path(4));
    let star_col = col_of(&star(4));

    // C4 loses any of its 4 edges and always becomes the path; the paw
    // becomes the path twice, the star once, and its pendant-edge deletion
    // disconnects and is dropped.
    let expected = SparseMatrix::from_entries(
        2,
        2,
        vec![
            (c4_row, path_col, 4),
            (paw_row, path_col, 2),
            (paw_row, star_col, 1),
        ],
    )
    .unwrap();
    assert_eq!(matrix, expected);
    assert!(!op.is_trivial(&store).unwrap());
}

#[test]
fn matrix_file_round_trips_and_rebuild_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = DeleteEdgeOp { n: 4, edges: 4 };
    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    let first = store.get(&op.matrix_key()).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    assert_eq!(store.get(&op.matrix_key()).unwrap(), first);
    op.build_matrix(&store, true, false).unwrap();
    assert_eq!(store.get(&op.matrix_key()).unwrap(), first);
    let parsed = SparseMatrix::from_text(&String::from_utf8_lossy(&first)).unwrap();
    assert_eq!(parsed, op.get_matrix(&store).unwrap());
    // The transposed view swaps the shape and round-trips back.
    let transposed = op.get_matrix_transposed(&store).unwrap();
    assert_eq!(transposed.shape(), (2, 2));
    assert_eq!(transposed.transposed(), parsed);
}

#[test]
fn missing_basis_skips_or_raises() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = DeleteEdgeOp { n: 4, edges: 4 };
    // skip_if_no_basis swallows the missing prerequisite.
    op.build_matrix(&store, false, true).unwrap();
    assert!(!op.matrix_built(&store));
    // Without the flag it surfaces.
    let err = op.build_matrix(&store, false, false).unwrap_err();
    assert!(err.is_not_built());
}

#[test]
fn rank_lifecycle() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let config = Config::with_data_dir(dir.path());
    let op = DeleteEdgeOp { n: 4, edges: 4 };

    // No matrix yet: inconclusive, no file.
    assert_eq!(
        op.compute_rank(&store, RankMode::Exact, &config, false).unwrap(),
        RankStatus::Inconclusive
    );
    assert!(!store.exists(&op.rank_key()));

    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    let status = op
        .compute_rank(&store, RankMode::Exact, &config, false)
        .unwrap();
    assert!(matches!(status, RankStatus::Computed(_)));
    assert_eq!(op.get_rank(&store).unwrap().reported(), 2);

    // Second run reuses the cached file.
    assert_eq!(
        op.compute_rank(&store, RankMode::Exact, &config, false).unwrap(),
        RankStatus::Reused
    );

    // Modular ranks agree with the exact value at every prime.
    let status = op
        .compute_rank(&store, RankMode::Modular { n_primes: 6 }, &config, true)
        .unwrap();
    let RankStatus::Computed(result) = status else {
        panic!("expected a fresh modular rank");
    };
    assert_eq!(result.reported(), 2);
    assert!(result.disagreeing_primes().is_empty());
}

/// Operator whose matrix is injected directly into the store; used to drive
/// the composition-test classification.
struct InjectedOp {
    tag: &'static str,
    domain: (usize, usize),
    target: (usize, usize),
}

impl GraphOperator for InjectedOp {
    fn domain(&self) -> Arc<dyn GraphVectorSpace> {
        ToySpace::arc(self.domain.0, self.domain.1)
    }

    fn target(&self) -> Arc<dyn GraphVectorSpace> {
        ToySpace::arc(self.target.0, self.target.1)
    }

    fn operator_type(&self) -> &'static str {
        "injected"
    }

    fn matrix_key(&self) -> String {
        format!("toy/injected_{}.txt", self.tag)
    }

    fn rank_key(&self) -> String {
        format!("toy/injected_{}_rank.txt", self.tag)
    }

    fn operate_on(&self, _graph: &Graph) -> Vec<(Graph, i64)> {
        Vec::new()
    }
}

#[test]
fn square_zero_classification() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let config = Config::with_data_dir(dir.path());
    for (n, e) in [(4, 4), (4, 3), (5, 4)] {
        ToySpace::arc(n, e).build_basis(&store, false).unwrap();
    }

    // a: (4,4) -> (4,3), b: (4,3) -> (5,4); only b∘a is defined.
    let a = Arc::new(InjectedOp {
        tag: "a",
        domain: (4, 4),
        target: (4, 3),
    });
    let b = Arc::new(InjectedOp {
        tag: "b",
        domain: (4, 3),
        target: (5, 4),
    });

    // Missing matrices: inconclusive.
    let diff = Differential::new(OperatorCollection::new(
        "injected",
        vec![a.clone(), b.clone()],
    ));
    let report = diff.square_zero_test(&store, &config).unwrap();
    assert_eq!(report.inconclusive, 1);
    assert_eq!(report.failed(), 0);

    // A·B = 0 with both factors nonzero: success. The (5,4) space holds the
    // three trees on five vertices, so B is 2x3.
    let ma = SparseMatrix::from_entries(2, 2, vec![(0, 0, 1), (0, 1, -1), (1, 0, 1), (1, 1, -1)])
        .unwrap();
    let mb = SparseMatrix::from_entries(
        2,
        3,
        vec![(0, 0, 1), (0, 1, 1), (0, 2, 1), (1, 0, 1), (1, 1, 1), (1, 2, 1)],
    )
    .unwrap();
    store.put(&a.matrix_key(), ma.to_text().as_bytes()).unwrap();
    store.put(&b.matrix_key(), mb.to_text().as_bytes()).unwrap();
    let report = diff.square_zero_test(&store, &config).unwrap();
    assert_eq!(report.success, 1);
    assert_eq!(report.failed(), 0);
    report.into_result().unwrap();

    // Breaking the cancellation turns the pair into a failure.
    let bad = SparseMatrix::from_entries(2, 3, vec![(0, 0, 1), (1, 1, 1)]).unwrap();
    store.put(&b.matrix_key(), bad.to_text().as_bytes()).unwrap();
    let report = diff.square_zero_test(&store, &config).unwrap();
    assert_eq!(report.failed(), 1);
    assert!(report.into_result().is_err());

    // A zero factor makes the pair trivial.
    let zero = SparseMatrix::zero(2, 3);
    store.put(&b.matrix_key(), zero.to_text().as_bytes()).unwrap();
    let report = diff.square_zero_test(&store, &config).unwrap();
    assert_eq!(report.trivial, 1);
}

#[test]
fn cohomology_dim_accounts_for_both_ranks() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let config = Config::with_data_dir(dir.path());
    let op = Arc::new(DeleteEdgeOp { n: 4, edges: 4 });
    let domain = op.domain();
    let target = op.target();
    domain.build_basis(&store, false).unwrap();
    target.build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();

    let diff = Differential::new(OperatorCollection::new("delete", vec![op.clone()]));

    // Rank missing: unknown, not a guess.
    assert_eq!(
        diff.cohomology_dim(domain.as_ref(), &store).unwrap(),
        None
    );
    op.compute_rank(&store, RankMode::Exact, &config, false)
        .unwrap();
    // dim 2 − rank 2 (outgoing) = 0 at the domain; dim 2 − rank 2
    // (incoming) = 0 at the target.
    assert_eq!(
        diff.cohomology_dim(domain.as_ref(), &store).unwrap(),
        Some(0)
    );
    assert_eq!(
        diff.cohomology_dim(target.as_ref(), &store).unwrap(),
        Some(0)
    );

    // A rank exceeding the dimension marks corrupt data and is fatal.
    store.put(&op.rank_key(), b"7\n").unwrap();
    let err = diff.cohomology_dim(domain.as_ref(), &store).unwrap_err();
    assert!(matches!(err, gch_core::GchError::Test(_)));
}
