use std::sync::Arc;

use gch_core::{Config, GchError};
use gch_exec::{CancelFlag, RunReport};
use gch_linalg::RankMode;
use gch_op::{CohomologyEntry, Differential, SquareZeroReport};
use gch_spaces::SumVectorSpace;
use gch_store::Store;
use serde::{Deserialize, Serialize};

/// Knobs shared by every pipeline step.
#[derive(Debug, Clone)]
pub struct PipelineOpts {
    /// Rebuild artefacts even when the store already holds them.
    pub ignore_existing: bool,
    /// Worker count for independent jobs.
    pub n_jobs: usize,
    /// Emit per-job progress lines (single-worker runs only).
    pub progress: bool,
    /// Skip operators whose endpoint bases are missing instead of failing.
    pub skip_if_no_basis: bool,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            ignore_existing: false,
            n_jobs: 1,
            progress: false,
            skip_if_no_basis: false,
        }
    }
}

/// Cohomology dimensions of one differential across the complex's members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohomologyTable {
    /// The differential's name.
    pub differential: String,
    /// One entry per member space, in sum order.
    pub entries: Vec<CohomologyEntry>,
}

/// A graph complex: a sum vector space together with its operator
/// collections interpreted as differentials.
pub struct GraphComplex {
    name: String,
    sum: SumVectorSpace,
    differentials: Vec<Arc<Differential>>,
    cancel: CancelFlag,
}

impl GraphComplex {
    /// Creates a complex over the given sum space and differentials.
    pub fn new(
        name: impl Into<String>,
        sum: SumVectorSpace,
        differentials: Vec<Arc<Differential>>,
    ) -> Self {
        Self {
            name: name.into(),
            sum,
            differentials,
            cancel: CancelFlag::new(),
        }
    }

    /// The complex's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying sum vector space.
    pub fn sum(&self) -> &SumVectorSpace {
        &self.sum
    }

    /// The differentials in declaration order.
    pub fn differentials(&self) -> &[Arc<Differential>] {
        &self.differentials
    }

    /// The cooperative cancellation flag shared by all pipeline steps.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Builds every member basis.
    pub fn build_basis(
        &self,
        store: Arc<dyn Store>,
        config: &Config,
        opts: &PipelineOpts,
    ) -> RunReport {
        self.sum.build_basis(
            store,
            config,
            opts.ignore_existing,
            opts.n_jobs,
            &self.cancel,
            opts.progress,
        )
    }

    /// Builds every operator matrix of every differential.
    pub fn build_matrix(&self, store: Arc<dyn Store>, opts: &PipelineOpts) -> RunReport {
        let mut merged = RunReport::default();
        for differential in &self.differentials {
            let report = differential.collection().build_matrices(
                Arc::clone(&store),
                opts.ignore_existing,
                opts.skip_if_no_basis,
                opts.n_jobs,
                &self.cancel,
                opts.progress,
            );
            merged.completed += report.completed;
            merged.skipped += report.skipped;
            merged.failed.extend(report.failed);
        }
        merged
    }

    /// Computes every operator rank of every differential.
    pub fn compute_rank(
        &self,
        store: Arc<dyn Store>,
        mode: RankMode,
        config: &Config,
        opts: &PipelineOpts,
    ) -> RunReport {
        let mut merged = RunReport::default();
        for differential in &self.differentials {
            let report = differential.collection().compute_ranks(
                Arc::clone(&store),
                mode,
                config,
                opts.ignore_existing,
                opts.n_jobs,
                &self.cancel,
                opts.progress,
            );
            merged.completed += report.completed;
            merged.skipped += report.skipped;
            merged.failed.extend(report.failed);
        }
        merged
    }

    /// Runs the square-zero test on every differential. Any failing pair is
    /// fatal for the complex; the caller decides when to abort.
    pub fn square_zero_test(
        &self,
        store: &dyn Store,
        config: &Config,
    ) -> Result<Vec<(String, SquareZeroReport)>, GchError> {
        self.differentials
            .iter()
            .map(|differential| {
                let report = differential.square_zero_test(store, config)?;
                Ok((differential.name().to_string(), report))
            })
            .collect()
    }

    /// Computes the cohomology table of every differential.
    pub fn compute_cohomology(
        &self,
        store: &dyn Store,
    ) -> Result<Vec<CohomologyTable>, GchError> {
        self.differentials
            .iter()
            .map(|differential| {
                let entries = differential.cohomology_dims(self.sum.members(), store)?;
                Ok(CohomologyTable {
                    differential: differential.name().to_string(),
                    entries,
                })
            })
            .collect()
    }

    /// Tests pairwise anti-commutativity of all differential pairs.
    pub fn test_pairwise_anti_commutativity(
        &self,
        store: &dyn Store,
        config: &Config,
    ) -> Result<Vec<(String, SquareZeroReport)>, GchError> {
        let mut reports = Vec::new();
        for (i, p) in self.differentials.iter().enumerate() {
            for q in self.differentials.iter().skip(i + 1) {
                let report = crate::commutativity::test_commutativity(
                    p.collection(),
                    q.collection(),
                    false,
                    store,
                    config,
                )?;
                reports.push((format!("{} / {}", p.name(), q.name()), report));
            }
        }
        Ok(reports)
    }
}
