use std::sync::Arc;

use gch_core::{Config, ErrorInfo, GchError};
use gch_exec::{run_jobs, CancelFlag, Job, RunReport};
use gch_store::Store;

use crate::space::GraphVectorSpace;

/// Sort key used when scheduling basis builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Order members by their work estimate.
    WorkEstimate,
    /// Order members by their (already built) dimension.
    Dimension,
}

/// Ordered direct sum of graph vector spaces.
///
/// The member order is fixed at construction; start indices and the total
/// dimension follow that order.
pub struct SumVectorSpace {
    members: Vec<Arc<dyn GraphVectorSpace>>,
}

impl SumVectorSpace {
    /// Creates the sum of the given members.
    pub fn new(members: Vec<Arc<dyn GraphVectorSpace>>) -> Self {
        Self { members }
    }

    /// The members in sum order.
    pub fn members(&self) -> &[Arc<dyn GraphVectorSpace>] {
        &self.members
    }

    /// Total dimension: the sum over members, counting invalid or unbuilt
    /// members through their own dimension semantics.
    pub fn dim(&self, store: &dyn Store) -> Result<usize, GchError> {
        let mut total = 0usize;
        for member in &self.members {
            total += member.get_dimension(store)?;
        }
        Ok(total)
    }

    /// Returns true when the sum contains the given space.
    pub fn contains(&self, vs: &dyn GraphVectorSpace) -> bool {
        self.members.iter().any(|m| m.is_same_space(vs))
    }

    /// Offset of a member's basis inside the concatenated sum basis.
    pub fn start_index(
        &self,
        vs: &dyn GraphVectorSpace,
        store: &dyn Store,
    ) -> Result<usize, GchError> {
        let mut offset = 0usize;
        for member in &self.members {
            if member.is_same_space(vs) {
                return Ok(offset);
            }
            offset += member.get_dimension(store)?;
        }
        Err(GchError::Graph(
            ErrorInfo::new("sum-member", "space is not a member of the sum")
                .with_context("space", vs.name()),
        ))
    }

    /// Members sorted for scheduling. Unknown dimensions sort last via the
    /// configured maximum.
    pub fn members_sorted(
        &self,
        key: SortKey,
        store: &dyn Store,
        config: &Config,
    ) -> Vec<Arc<dyn GraphVectorSpace>> {
        let mut with_keys: Vec<(u64, Arc<dyn GraphVectorSpace>)> = self
            .members
            .iter()
            .map(|m| {
                let weight = match key {
                    SortKey::WorkEstimate => m.get_work_estimate(),
                    SortKey::Dimension => m
                        .get_dimension(store)
                        .map(|d| d as u64)
                        .unwrap_or(config.max_sort_value),
                };
                (weight, Arc::clone(m))
            })
            .collect();
        with_keys.sort_by_key(|&(w, _)| w);
        with_keys.into_iter().map(|(_, m)| m).collect()
    }

    /// Builds every member basis, scheduling across `n_jobs` workers.
    pub fn build_basis(
        &self,
        store: Arc<dyn Store>,
        config: &Config,
        ignore_existing: bool,
        n_jobs: usize,
        cancel: &CancelFlag,
        progress: bool,
    ) -> RunReport {
        let jobs: Vec<(String, Job)> = self
            .members_sorted(SortKey::WorkEstimate, store.as_ref(), config)
            .into_iter()
            .map(|member| {
                let store = Arc::clone(&store);
                let label = member.name();
                let job: Job =
                    Box::new(move || member.build_basis(store.as_ref(), ignore_existing));
                (label, job)
            })
            .collect();
        run_jobs(jobs, n_jobs, cancel, progress)
    }
}

/// A sum vector space pinned to an integer degree.
///
/// A slice of degree `d` owns exactly `d + 1` members; consumers may only
/// read it once every valid member has a built basis. Both conditions are
/// fatal when violated.
pub struct DegreeSlice {
    degree: i64,
    sum: SumVectorSpace,
}

impl DegreeSlice {
    /// Creates a degree slice, checking the member-count invariant.
    pub fn new(degree: i64, members: Vec<Arc<dyn GraphVectorSpace>>) -> Result<Self, GchError> {
        let expected = degree + 1;
        if degree < 0 || members.len() as i64 != expected {
            return Err(GchError::Graph(
                ErrorInfo::new("degree-slice", "a degree-d slice owns exactly d+1 members")
                    .with_context("degree", degree.to_string())
                    .with_context("members", members.len().to_string()),
            ));
        }
        Ok(Self {
            degree,
            sum: SumVectorSpace::new(members),
        })
    }

    /// The degree of the slice.
    pub fn degree(&self) -> i64 {
        self.degree
    }

    /// The underlying sum.
    pub fn sum(&self) -> &SumVectorSpace {
        &self.sum
    }

    /// Checks that every valid member has a built basis; consumers call this
    /// before reading the slice.
    pub fn verify_built(&self, store: &dyn Store) -> Result<(), GchError> {
        for member in self.sum.members() {
            if member.is_valid() && !member.basis_built(store) {
                return Err(GchError::NotBuilt(
                    ErrorInfo::new("degree-slice", "member basis missing")
                        .with_context("degree", self.degree.to_string())
                        .with_context("member", member.name())
                        .with_hint("build the slice bases before reading it"),
                ));
            }
        }
        Ok(())
    }
}
