use std::sync::Arc;

use gch_complex::PipelineOpts;
use gch_core::Config;
use gch_graph::from_graph6;
use gch_linalg::RankMode;
use gch_op::{GraphOperator, HairAction, RestrictedOperator, SymmProjector};
use gch_spaces::GraphVectorSpace;
use gch_store::FsStore;
use gch_wohairy::{wohairy_complex, ContractEdgesOp, EpsToOmegaOp, WoHairyDifferential, WoHairyGvs};
use tempfile::TempDir;

#[test]
fn small_space_has_the_four_tadpole_classes() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    // One internal vertex, two loops, two numbered hairs, one omega. Every
    // admissible graph needs the epsilon tadpole, and with all cells
    // singleton no class can vanish.
    let vs = WoHairyGvs::new(1, 2, 2, 1);
    assert!(vs.is_valid());
    vs.build_basis(&store, false).unwrap();
    assert_eq!(vs.get_dimension(&store).unwrap(), 4);

    for g6 in vs.get_basis(&store).unwrap() {
        let graph = from_graph6(&g6).unwrap();
        assert!(vs.eps_tadpole(&graph), "{g6} should carry the tadpole");
        // Omega and hairs are univalent, the internal vertex trivalent.
        assert_eq!(graph.degree(2), 1);
        assert_eq!(graph.degree(3), 1);
        assert_eq!(graph.degree(4), 1);
        assert!(graph.degree(0) >= 3);
    }
}

#[test]
fn projector_is_idempotent_up_to_scale() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let vs = Arc::new(WoHairyGvs::new(1, 2, 2, 1));
    vs.build_basis(&store, false).unwrap();

    let projector = |rep: usize| {
        SymmProjector::new(
            Arc::clone(&vs) as Arc<dyn GraphVectorSpace>,
            Arc::clone(&vs) as Arc<dyn HairAction>,
            rep,
            format!("wohairy/projectionO1_2_2_1_{rep}.txt"),
            format!("wohairy/projectionO1_2_2_1_{rep}_rank.txt"),
        )
        .unwrap()
    };

    let symmetric = projector(0);
    let alternating = projector(1);
    symmetric.build_matrix(&store, false).unwrap();
    alternating.build_matrix(&store, false).unwrap();

    let p = symmetric.get_matrix(&store).unwrap();
    let q = alternating.get_matrix(&store).unwrap();
    assert_eq!(p.shape(), (4, 4));

    // P² = (h!/dim λ)·P for both irreducibles of S₂, and the two
    // projectors annihilate each other.
    assert_eq!(symmetric.idempotent_scale(), 2);
    assert_eq!(alternating.idempotent_scale(), 2);
    assert_eq!(p.multiply(&p).unwrap(), p.add_scaled(&p, 1).unwrap());
    assert_eq!(q.multiply(&q).unwrap(), q.add_scaled(&q, 1).unwrap());
    assert!(p.multiply(&q).unwrap().is_zero());
}

#[test]
fn restricted_operator_ranks_split_the_differential() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let config = Config::with_data_dir(dir.path());
    let op = Arc::new(ContractEdgesOp::new(1, 2, 2, 1));
    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();

    let vs = Arc::new(WoHairyGvs::new(1, 2, 2, 1));
    let mut restricted_rank_sum = 0usize;
    for rep in 0..2 {
        let projector = SymmProjector::new(
            Arc::clone(&vs) as Arc<dyn GraphVectorSpace>,
            Arc::clone(&vs) as Arc<dyn HairAction>,
            rep,
            format!("wohairy/projectionO1_2_2_1_{rep}.txt"),
            format!("wohairy/projectionO1_2_2_1_{rep}_rank.txt"),
        )
        .unwrap();
        projector.build_matrix(&store, false).unwrap();
        let restricted = RestrictedOperator::new(
            Arc::clone(&op) as Arc<dyn GraphOperator>,
            projector,
            format!("wohairy/contractD1_2_2_1_r{rep}.txt"),
            format!("wohairy/contractD1_2_2_1_r{rep}_rank.txt"),
        )
        .unwrap();
        restricted.build_matrix(&store, false).unwrap();
        restricted
            .compute_rank(&store, RankMode::Exact, &config, false)
            .unwrap();
        restricted_rank_sum += restricted.get_rank(&store).unwrap().reported();
    }
    // The two isotypical pieces cannot carry more rank than the full
    // differential times the component count.
    op.compute_rank(&store, RankMode::Exact, &config, false)
        .unwrap();
    let full_rank = op.get_rank(&store).unwrap().reported();
    assert!(restricted_rank_sum >= full_rank);
    assert!(restricted_rank_sum <= 2 * full_rank);
}

#[test]
fn eps_to_omega_builds_between_omega_counts() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = EpsToOmegaOp::new(1, 2, 2, 1);
    assert!(op.is_valid());
    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    let matrix = op.get_matrix(&store).unwrap();
    assert_eq!(matrix.shape(), op.get_shape(&store).unwrap());
    assert_eq!(matrix.shape().0, 4);
}

#[test]
fn contract_builds_between_vertex_counts() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let op = ContractEdgesOp::new(2, 1, 2, 1);
    assert!(op.is_valid());
    op.domain().build_basis(&store, false).unwrap();
    op.target().build_basis(&store, false).unwrap();
    op.build_matrix(&store, false, false).unwrap();
    let matrix = op.get_matrix(&store).unwrap();
    assert_eq!(matrix.shape(), op.get_shape(&store).unwrap());
}

#[test]
#[ignore = "acceptance check over a wider parameter window"]
fn wohairy_contract_squares_to_zero() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn gch_store::Store> = Arc::new(FsStore::new(dir.path()));
    let config = Config::with_data_dir(dir.path());
    let complex = wohairy_complex(
        1..4,
        0..3,
        1..3,
        1..2,
        &[WoHairyDifferential::Contract],
    );
    let opts = PipelineOpts::default();
    assert!(complex
        .build_basis(Arc::clone(&store), &config, &opts)
        .all_completed());
    assert!(complex.build_matrix(Arc::clone(&store), &opts).all_completed());
    for (name, report) in complex.square_zero_test(store.as_ref(), &config).unwrap() {
        assert_eq!(report.failed(), 0, "{name}: {}", report.summary());
    }
}
