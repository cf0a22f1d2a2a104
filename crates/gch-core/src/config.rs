//! Explicit configuration threaded through constructors.
//!
//! Everything that used to be a module-level constant in older computations
//! of this kind (data directories, numeric thresholds, the prime list) lives
//! here so that tests can run against throwaway directories.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The six large primes used for modular rank computations.
///
/// All lie near 3·10⁹ and below 2³², so products of two residues fit in u64.
pub const RANK_PRIMES: [u64; 6] = [
    3_036_995_833,
    3_036_996_247,
    3_036_996_491,
    3_036_997_217,
    3_036_997_631,
    3_036_997_933,
];

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the persistent store.
    pub data_dir: PathBuf,
    /// Threshold below which a composition test counts as zero.
    pub square_zero_eps: f64,
    /// Singular value threshold for the estimated rank mode.
    pub estimate_rank_eps: f64,
    /// Primes used for modular rank computation, in the order they are drawn.
    pub primes: Vec<u64>,
    /// Sort key substitute when a dimension or work estimate is unknown.
    pub max_sort_value: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            square_zero_eps: 1e-6,
            estimate_rank_eps: 1e-4,
            primes: RANK_PRIMES.to_vec(),
            max_sort_value: u64::MAX,
        }
    }
}

impl Config {
    /// Returns a configuration rooted at the given data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Returns the first `n` primes of the configured list.
    pub fn primes_for(&self, n: usize) -> &[u64] {
        let n = n.min(self.primes.len());
        &self.primes[..n]
    }
}
