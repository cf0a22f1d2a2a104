#![deny(missing_docs)]

//! Work queue over independent closures.
//!
//! Jobs communicate only through the store; no shared mutable state crosses
//! job boundaries. Cancellation is cooperative: a cancelled run lets the
//! in-flight closures finish and skips the rest, so atomic store writes keep
//! the on-disk state consistent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gch_core::{ErrorInfo, GchError};
use rayon::prelude::*;

/// A unit of independent work.
pub type Job = Box<dyn FnOnce() -> Result<(), GchError> + Send>;

/// Shared cooperative cancellation flag, checked at job boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; running jobs finish, queued jobs are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a batch of jobs. Failures are collected, not short-circuited,
/// so the store accumulates as much valid data as possible.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of jobs that ran to completion.
    pub completed: usize,
    /// Labels and errors of jobs that ran and failed.
    pub failed: Vec<(String, GchError)>,
    /// Number of jobs skipped because of cancellation.
    pub skipped: usize,
}

impl RunReport {
    /// Returns true when every scheduled job completed.
    pub fn all_completed(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }

    /// Folds the failures into a single error, if any.
    pub fn into_result(self) -> Result<(), GchError> {
        if let Some((label, err)) = self.failed.into_iter().next() {
            let info = ErrorInfo::new("jobs-failed", "at least one build job failed")
                .with_context("first_failure", label)
                .with_context("detail", err.to_string());
            return Err(GchError::Store(info));
        }
        Ok(())
    }
}

/// Runs labelled jobs with up to `n_jobs` workers.
///
/// With a single worker the queue runs inline and may emit one progress line
/// per job on stderr; with more workers no progress is reported. No ordering
/// is guaranteed among workers.
pub fn run_jobs(
    jobs: Vec<(String, Job)>,
    n_jobs: usize,
    cancel: &CancelFlag,
    progress: bool,
) -> RunReport {
    let total = jobs.len();
    let mut report = RunReport::default();
    if n_jobs <= 1 {
        for (index, (label, job)) in jobs.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.skipped += 1;
                continue;
            }
            if progress {
                eprintln!("[{}/{}] {}", index + 1, total, label);
            }
            match job() {
                Ok(()) => report.completed += 1,
                Err(err) => report.failed.push((label, err)),
            }
        }
        return report;
    }

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(n_jobs).build() {
        Ok(pool) => pool,
        Err(err) => {
            report.failed.push((
                "thread-pool".to_string(),
                GchError::Store(ErrorInfo::new("thread-pool", err.to_string())),
            ));
            report.skipped = total;
            return report;
        }
    };
    let outcomes: Vec<(String, Option<Result<(), GchError>>)> = pool.install(|| {
        jobs.into_par_iter()
            .map(|(label, job)| {
                if cancel.is_cancelled() {
                    return (label, None);
                }
                (label, Some(job()))
            })
            .collect()
    });
    for (label, outcome) in outcomes {
        match outcome {
            None => report.skipped += 1,
            Some(Ok(())) => report.completed += 1,
            Some(Err(err)) => report.failed.push((label, err)),
        }
    }
    report
}
