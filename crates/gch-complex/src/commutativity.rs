use gch_core::{Config, GchError};
use gch_linalg::SparseMatrix;
use gch_op::{GraphOperator, OperatorCollection, PairOutcome, SquareZeroReport};
use gch_store::Store;

/// Tests whether two operator collections commute or anti-commute.
///
/// Quadruples `(p_a, p_b, q_a, q_b)` with `p_a, p_b ∈ P`, `q_a, q_b ∈ Q` are
/// enumerated such that both composites `q_b ∘ p_a` and `p_b ∘ q_a` run
/// between the same two spaces; in the row-vector convention the tested sum
/// is `M(p_a)·M(q_b) + ε·M(q_a)·M(p_b)` with `ε = +1` for anti-commuting and
/// `−1` for commuting pairs. Quadruples with invalid or trivial legs are
/// classified exactly like square-zero pairs.
pub fn test_commutativity(
    p: &OperatorCollection,
    q: &OperatorCollection,
    commute: bool,
    store: &dyn Store,
    config: &Config,
) -> Result<SquareZeroReport, GchError> {
    let epsilon: i64 = if commute { -1 } else { 1 };
    let mut report = SquareZeroReport::default();
    for p_a in p.operators() {
        for q_a in q.operators() {
            if !p_a.domain().is_same_space(q_a.domain().as_ref()) {
                continue;
            }
            for p_b in p.operators() {
                if !p_b.domain().is_same_space(q_a.target().as_ref()) {
                    continue;
                }
                for q_b in q.operators() {
                    if !q_b.domain().is_same_space(p_a.target().as_ref())
                        || !p_b.target().is_same_space(q_b.target().as_ref())
                    {
                        continue;
                    }
                    let outcome = quadruple_outcome(
                        p_a.as_ref(),
                        p_b.as_ref(),
                        q_a.as_ref(),
                        q_b.as_ref(),
                        epsilon,
                        store,
                        config,
                    )?;
                    report.record(outcome, || {
                        format!(
                            "{} / {} against {} / {}",
                            p_a.name(),
                            p_b.name(),
                            q_a.name(),
                            q_b.name()
                        )
                    });
                }
            }
        }
    }
    Ok(report)
}

fn quadruple_outcome(
    p_a: &dyn GraphOperator,
    p_b: &dyn GraphOperator,
    q_a: &dyn GraphOperator,
    q_b: &dyn GraphOperator,
    epsilon: i64,
    store: &dyn Store,
    config: &Config,
) -> Result<PairOutcome, GchError> {
    let path1_valid = p_a.is_valid() && q_b.is_valid();
    let path2_valid = q_a.is_valid() && p_b.is_valid();
    if !path1_valid && !path2_valid {
        return Ok(PairOutcome::Trivial);
    }

    let path1 = if path1_valid {
        match path_product(p_a, q_b, store)? {
            PathState::Missing => return Ok(PairOutcome::Inconclusive),
            state => state,
        }
    } else {
        PathState::Trivial
    };
    let path2 = if path2_valid {
        match path_product(q_a, p_b, store)? {
            PathState::Missing => return Ok(PairOutcome::Inconclusive),
            state => state,
        }
    } else {
        PathState::Trivial
    };

    let vanished = match (path1, path2) {
        (PathState::Trivial, PathState::Trivial) => return Ok(PairOutcome::Trivial),
        (PathState::Product(product), PathState::Trivial)
        | (PathState::Trivial, PathState::Product(product)) => {
            (product.norm_one() as f64) < config.square_zero_eps
        }
        (PathState::Product(first), PathState::Product(second)) => {
            let combined = first.add_scaled(&second, epsilon)?;
            (combined.norm_one() as f64) < config.square_zero_eps
        }
        (PathState::Missing, _) | (_, PathState::Missing) => unreachable!("handled above"),
    };
    if vanished {
        Ok(PairOutcome::Success)
    } else {
        Ok(PairOutcome::Failure)
    }
}

enum PathState {
    /// A leg is the zero map; the composite vanishes identically.
    Trivial,
    /// A matrix file is absent.
    Missing,
    /// The composite matrix.
    Product(SparseMatrix),
}

fn path_product(
    first: &dyn GraphOperator,
    second: &dyn GraphOperator,
    store: &dyn Store,
) -> Result<PathState, GchError> {
    if !first.matrix_built(store) || !second.matrix_built(store) {
        return Ok(PathState::Missing);
    }
    if first.is_trivial(store)? || second.is_trivial(store)? {
        return Ok(PathState::Trivial);
    }
    let product = first.get_matrix(store)?.multiply(&second.get_matrix(store)?)?;
    Ok(PathState::Product(product))
}
