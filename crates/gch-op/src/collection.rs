use std::sync::Arc;

use gch_core::{Config, ErrorInfo, GchError};
use gch_exec::{run_jobs, CancelFlag, Job, RunReport};
use gch_linalg::RankMode;
use gch_spaces::{BasisCache, GraphVectorSpace};
use gch_store::Store;
use serde::{Deserialize, Serialize};

use crate::operator::GraphOperator;

/// Classification of a composition test on one pair (or quadruple) of
/// operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairOutcome {
    /// At least one operand is invalid or the zero map.
    Trivial,
    /// The composition vanishes.
    Success,
    /// At least one matrix file is missing.
    Inconclusive,
    /// The composition does not vanish.
    Failure,
}

/// Aggregated outcome of a square-zero or commutativity run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SquareZeroReport {
    /// Pairs that were trivially zero.
    pub trivial: usize,
    /// Pairs whose composition vanished.
    pub success: usize,
    /// Pairs with missing matrices.
    pub inconclusive: usize,
    /// Descriptions of the failing pairs.
    pub failures: Vec<String>,
}

impl SquareZeroReport {
    /// Records one outcome.
    pub fn record(&mut self, outcome: PairOutcome, description: impl FnOnce() -> String) {
        match outcome {
            PairOutcome::Trivial => self.trivial += 1,
            PairOutcome::Success => self.success += 1,
            PairOutcome::Inconclusive => self.inconclusive += 1,
            PairOutcome::Failure => self.failures.push(description()),
        }
    }

    /// Number of failing pairs.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// One-line summary in the order trivial/success/inconclusive/failed.
    pub fn summary(&self) -> String {
        format!(
            "trivial: {}, success: {}, inconclusive: {}, failed: {}",
            self.trivial,
            self.success,
            self.inconclusive,
            self.failed()
        )
    }

    /// Folds the failures into a hard error.
    pub fn into_result(self) -> Result<(), GchError> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(GchError::Test(
            ErrorInfo::new("square-zero", "composition test failed")
                .with_context("failed", self.failures.len().to_string())
                .with_context("first", self.failures[0].clone()),
        ))
    }
}

/// Cohomology dimension at one member space of a graded differential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohomologyEntry {
    /// Description of the member space.
    pub space: String,
    /// The dimension, or `None` when a basis or rank is missing.
    pub dim: Option<usize>,
}

/// Ordered set of operators sharing one algebraic rôle.
pub struct OperatorCollection {
    name: String,
    operators: Vec<Arc<dyn GraphOperator>>,
}

impl OperatorCollection {
    /// Creates a named collection.
    pub fn new(name: impl Into<String>, operators: Vec<Arc<dyn GraphOperator>>) -> Self {
        Self {
            name: name.into(),
            operators,
        }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operators in collection order.
    pub fn operators(&self) -> &[Arc<dyn GraphOperator>] {
        &self.operators
    }

    /// The composition predicate: `b ∘ a` is defined when the domain of `b`
    /// is the target of `a`.
    pub fn matches(a: &dyn GraphOperator, b: &dyn GraphOperator) -> bool {
        b.domain().is_same_space(a.target().as_ref())
    }

    /// Builds every operator matrix across `n_jobs` workers.
    ///
    /// The operators share one basis memo: neighbouring operators read the
    /// same endpoint bases, and the memo only mirrors immutable store
    /// content.
    pub fn build_matrices(
        &self,
        store: Arc<dyn Store>,
        ignore_existing: bool,
        skip_if_no_basis: bool,
        n_jobs: usize,
        cancel: &CancelFlag,
        progress: bool,
    ) -> RunReport {
        let mut ordered: Vec<Arc<dyn GraphOperator>> = self.operators.clone();
        ordered.sort_by_key(|op| op.get_work_estimate());
        let cache = Arc::new(BasisCache::new());
        let jobs: Vec<(String, Job)> = ordered
            .into_iter()
            .map(|op| {
                let store = Arc::clone(&store);
                let cache = Arc::clone(&cache);
                let label = op.name();
                let job: Job = Box::new(move || {
                    op.build_matrix_cached(
                        store.as_ref(),
                        ignore_existing,
                        skip_if_no_basis,
                        cache.as_ref(),
                    )
                });
                (label, job)
            })
            .collect();
        run_jobs(jobs, n_jobs, cancel, progress)
    }

    /// Computes every operator rank across `n_jobs` workers.
    pub fn compute_ranks(
        &self,
        store: Arc<dyn Store>,
        mode: RankMode,
        config: &Config,
        ignore_existing: bool,
        n_jobs: usize,
        cancel: &CancelFlag,
        progress: bool,
    ) -> RunReport {
        let jobs: Vec<(String, Job)> = self
            .operators
            .iter()
            .map(|op| {
                let op = Arc::clone(op);
                let store = Arc::clone(&store);
                let config = config.clone();
                let label = op.name();
                let job: Job = Box::new(move || {
                    op.compute_rank(store.as_ref(), mode, &config, ignore_existing)
                        .map(|_| ())
                });
                (label, job)
            })
            .collect();
        run_jobs(jobs, n_jobs, cancel, progress)
    }
}

/// An operator collection whose composition squares to zero.
pub struct Differential {
    collection: OperatorCollection,
}

impl Differential {
    /// Wraps a collection as a differential.
    pub fn new(collection: OperatorCollection) -> Self {
        Self { collection }
    }

    /// The underlying collection.
    pub fn collection(&self) -> &OperatorCollection {
        &self.collection
    }

    /// The differential's name.
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Verifies `d² = 0` on every composable pair.
    ///
    /// Pairs with an invalid or zero operand are trivial, pairs with missing
    /// matrices inconclusive; everything else must vanish under the
    /// configured threshold (exact integer arithmetic compares to zero).
    pub fn square_zero_test(
        &self,
        store: &dyn Store,
        config: &Config,
    ) -> Result<SquareZeroReport, GchError> {
        let mut report = SquareZeroReport::default();
        let ops = self.collection.operators();
        for a in ops {
            for b in ops {
                if !OperatorCollection::matches(a.as_ref(), b.as_ref()) {
                    continue;
                }
                let outcome = Self::composition_outcome(a.as_ref(), b.as_ref(), store, config)?;
                report.record(outcome, || format!("{} then {}", a.name(), b.name()));
            }
        }
        Ok(report)
    }

    fn composition_outcome(
        a: &dyn GraphOperator,
        b: &dyn GraphOperator,
        store: &dyn Store,
        config: &Config,
    ) -> Result<PairOutcome, GchError> {
        if !a.is_valid() || !b.is_valid() {
            return Ok(PairOutcome::Trivial);
        }
        if !a.matrix_built(store) || !b.matrix_built(store) {
            return Ok(PairOutcome::Inconclusive);
        }
        if a.is_trivial(store)? || b.is_trivial(store)? {
            return Ok(PairOutcome::Trivial);
        }
        let product = a.get_matrix(store)?.multiply(&b.get_matrix(store)?)?;
        if (product.norm_one() as f64) < config.square_zero_eps {
            Ok(PairOutcome::Success)
        } else {
            Ok(PairOutcome::Failure)
        }
    }

    /// Cohomology dimension at `vs` with a throwaway basis memo; see
    /// [`Differential::cohomology_dim_cached`].
    pub fn cohomology_dim(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
    ) -> Result<Option<usize>, GchError> {
        self.cohomology_dim_cached(vs, store, &BasisCache::new())
    }

    /// Cohomology dimension at `vs`: `dim V − rank(d_out) − rank(d_in)`.
    ///
    /// Invalid or zero operators contribute rank 0; a missing basis or rank
    /// yields `None` rather than a guess; a negative result is fatal. The
    /// space dimension is read through the memo.
    pub fn cohomology_dim_cached(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
        cache: &BasisCache,
    ) -> Result<Option<usize>, GchError> {
        if !vs.is_valid() {
            return Ok(Some(0));
        }
        let dim = match cache.dimension(vs, store) {
            Ok(dim) => dim,
            Err(err) if err.is_not_built() => return Ok(None),
            Err(err) => return Err(err),
        };
        let out = self
            .collection
            .operators()
            .iter()
            .find(|op| op.domain().is_same_space(vs));
        let into = self
            .collection
            .operators()
            .iter()
            .find(|op| op.target().is_same_space(vs));
        let mut total_rank = 0usize;
        for op in [out, into].into_iter().flatten() {
            if !op.is_valid() {
                continue;
            }
            if op.matrix_built(store) && op.is_trivial(store)? {
                continue;
            }
            match op.get_rank(store) {
                Ok(rank) => total_rank += rank.reported(),
                Err(err) if err.is_not_built() => return Ok(None),
                Err(err) => return Err(err),
            }
        }
        if total_rank > dim {
            return Err(GchError::Test(
                ErrorInfo::new("negative-cohomology", "rank sum exceeds the dimension")
                    .with_context("space", vs.name())
                    .with_context("dim", dim.to_string())
                    .with_context("rank_sum", total_rank.to_string())
                    .with_hint("a rank or basis file is corrupt"),
            ));
        }
        Ok(Some(dim - total_rank))
    }

    /// Cohomology dimensions across a list of member spaces, sharing one
    /// basis memo over the whole sweep.
    pub fn cohomology_dims(
        &self,
        members: &[Arc<dyn GraphVectorSpace>],
        store: &dyn Store,
    ) -> Result<Vec<CohomologyEntry>, GchError> {
        let cache = BasisCache::new();
        members
            .iter()
            .map(|vs| {
                Ok(CohomologyEntry {
                    space: vs.name(),
                    dim: self.cohomology_dim_cached(vs.as_ref(), store, &cache)?,
                })
            })
            .collect()
    }
}
