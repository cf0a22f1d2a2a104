use std::sync::Arc;

use gch_complex::{ComplexInfo, PipelineOpts};
use gch_core::Config;
use gch_linalg::RankMode;
use gch_op::GraphOperator;
use gch_ordinary::{ordinary_contract_complex, ContractEdgesOp, OrdinaryGvs};
use gch_spaces::GraphVectorSpace;
use gch_store::FsStore;
use tempfile::TempDir;

#[test]
fn wheel_space_holds_exactly_the_complete_graph() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    // V=4, L=3 means six edges on four vertices: only K4 qualifies, and it
    // carries no odd automorphism under even edges.
    let vs = OrdinaryGvs::new(4, 3, true);
    assert!(vs.is_valid());
    vs.build_basis(&store, false).unwrap();
    assert_eq!(vs.get_dimension(&store).unwrap(), 1);

    // A vertex transposition double-transposes the six edges of K4, so the
    // induced edge permutation is even and the class survives odd edges
    // as well.
    let odd = OrdinaryGvs::new(4, 3, false);
    odd.build_basis(&store, false).unwrap();
    assert_eq!(odd.get_dimension(&store).unwrap(), 1);
}

#[test]
fn odd_automorphism_kills_a_class_in_both_parities() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    // K5 minus two disjoint edges lives at five vertices, four loops.
    // Swapping the endpoints of a removed edge transposes three edge pairs
    // (odd) and flips no orientation (vertex sign −1), so the class dies
    // under either convention; it must not appear in the bases.
    let mut probe = gch_graph::Graph::new(5);
    for u in 0..5 {
        for v in u + 1..5 {
            probe.add_edge(u, v);
        }
    }
    probe.remove_edge(0, 1);
    probe.remove_edge(2, 3);
    for even_edges in [true, false] {
        let vs = OrdinaryGvs::new(5, 4, even_edges);
        assert!(vs.is_valid());
        assert!(vs.has_odd_automorphisms(&probe, &vs.get_partition()));
        vs.build_basis(&store, false).unwrap();
        let (canon, _) = vs.graph_to_canon_g6(&probe);
        assert!(
            !vs.get_basis(&store).unwrap().contains(&canon),
            "class with an odd automorphism must vanish (even_edges={even_edges})"
        );
    }
}

#[test]
fn contraction_out_of_the_wheel_space_is_zero_by_one() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = ContractEdgesOp::new(4, 3, true);
    // The target (3 vertices, 5 edges) is overfull, hence invalid.
    assert!(!op.target().is_valid());
    assert!(!op.is_valid());
    op.domain().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    assert!(!op.matrix_built(&store), "invalid operators build no file");
    assert_eq!(op.get_shape(&store).unwrap(), (1, 0));
}

fn run_square_zero(even_edges: bool) {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn gch_store::Store> = Arc::new(FsStore::new(dir.path()));
    let config = Config::with_data_dir(dir.path());
    let complex = ordinary_contract_complex(3..7, 3..6, even_edges);
    let opts = PipelineOpts::default();
    assert!(complex
        .build_basis(Arc::clone(&store), &config, &opts)
        .all_completed());
    assert!(complex.build_matrix(Arc::clone(&store), &opts).all_completed());
    let reports = complex.square_zero_test(store.as_ref(), &config).unwrap();
    for (name, report) in reports {
        assert_eq!(report.failed(), 0, "{name}: {}", report.summary());
        assert!(
            report.success + report.trivial > 0,
            "{name}: no pair was even considered"
        );
        assert_eq!(report.inconclusive, 0, "{name}: matrices missing");
    }
}

#[test]
fn contract_differential_squares_to_zero_odd_edges() {
    run_square_zero(false);
}

#[test]
fn contract_differential_squares_to_zero_even_edges() {
    run_square_zero(true);
}

#[test]
fn contract_differential_squares_to_zero_on_a_full_chain() {
    // The smallest window with two composable valid operators: seven
    // vertices, five loops, contracting down through six and five vertices.
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn gch_store::Store> = Arc::new(FsStore::new(dir.path()));
    let config = Config::with_data_dir(dir.path());
    let complex = ordinary_contract_complex(5..8, 5..6, false);
    let opts = PipelineOpts::default();
    assert!(complex
        .build_basis(Arc::clone(&store), &config, &opts)
        .all_completed());
    assert!(complex.build_matrix(Arc::clone(&store), &opts).all_completed());
    for (name, report) in complex.square_zero_test(store.as_ref(), &config).unwrap() {
        assert_eq!(report.failed(), 0, "{name}: {}", report.summary());
        assert_eq!(report.inconclusive, 0, "{name}: matrices missing");
    }
}

#[test]
#[ignore = "full published parameter window; minutes in a debug build"]
fn contract_differential_squares_to_zero_full_window() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn gch_store::Store> = Arc::new(FsStore::new(dir.path()));
    let config = Config::with_data_dir(dir.path());
    let complex = ordinary_contract_complex(3..8, 3..7, false);
    let opts = PipelineOpts::default();
    assert!(complex
        .build_basis(Arc::clone(&store), &config, &opts)
        .all_completed());
    assert!(complex.build_matrix(Arc::clone(&store), &opts).all_completed());
    for (name, report) in complex.square_zero_test(store.as_ref(), &config).unwrap() {
        assert_eq!(report.failed(), 0, "{name}: {}", report.summary());
    }
}

#[test]
fn cohomology_pipeline_and_euler_characteristic() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn gch_store::Store> = Arc::new(FsStore::new(dir.path()));
    let config = Config::with_data_dir(dir.path());
    let complex = ordinary_contract_complex(3..7, 3..5, true);
    let opts = PipelineOpts::default();
    assert!(complex
        .build_basis(Arc::clone(&store), &config, &opts)
        .all_completed());
    assert!(complex.build_matrix(Arc::clone(&store), &opts).all_completed());
    assert!(complex
        .compute_rank(Arc::clone(&store), RankMode::Exact, &config, &opts)
        .all_completed());

    let tables = complex.compute_cohomology(store.as_ref()).unwrap();
    assert_eq!(tables.len(), 1);

    // The wheel class survives at (4, 3): both neighbouring operators are
    // invalid, so dim H equals the full dimension 1.
    let wheel = OrdinaryGvs::new(4, 3, true);
    let diff = &complex.differentials()[0];
    assert_eq!(
        diff.cohomology_dim(&wheel, store.as_ref()).unwrap(),
        Some(1)
    );

    // The info dump reflects the built state and survives a JSON round
    // trip through the store.
    let info = ComplexInfo::collect(&complex, store.as_ref());
    assert_eq!(info.spaces.len(), 4 * 2);
    assert!(info.spaces.iter().any(|s| s.dim == Some(1)));
    info.write(store.as_ref(), "info/ordinary.json").unwrap();
    let bytes = store.get("info/ordinary.json").unwrap();
    let parsed: ComplexInfo = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed.name, info.name);
    assert_eq!(parsed.cohomology.len(), 1);

    // Per loop order, the alternating sums of space dimensions and of
    // cohomology dimensions agree once every rank is known.
    for l in 3..5usize {
        let mut euler_spaces = 0i64;
        let mut euler_cohomology = 0i64;
        for v in 3..7usize {
            let vs = OrdinaryGvs::new(v, l, true);
            let sign = if v % 2 == 0 { 1 } else { -1 };
            euler_spaces += sign * vs.get_dimension(store.as_ref()).unwrap() as i64;
            let h = diff
                .cohomology_dim(&vs, store.as_ref())
                .unwrap()
                .expect("all ranks are built");
            euler_cohomology += sign * h as i64;
        }
        assert_eq!(euler_spaces, euler_cohomology, "loop order {l}");
    }
}
