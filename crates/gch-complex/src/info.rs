use chrono::{SecondsFormat, Utc};
use gch_core::{ErrorInfo, GchError};
use gch_op::GraphOperator;
use gch_store::Store;
use serde::{Deserialize, Serialize};

use crate::complex::{CohomologyTable, GraphComplex};

/// Summary of one member space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceInfo {
    /// Description of the space.
    pub name: String,
    /// Whether the parameters are valid.
    pub valid: bool,
    /// Whether the basis file exists.
    pub built: bool,
    /// Dimension, when readable.
    pub dim: Option<usize>,
}

/// Summary of one operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorInfo {
    /// Description of the operator.
    pub name: String,
    /// Whether both endpoints are valid.
    pub valid: bool,
    /// Whether the matrix file exists.
    pub built: bool,
    /// Shape as `(domain dim, target dim)`, when readable.
    pub shape: Option<(usize, usize)>,
    /// Cached rank, when readable.
    pub rank: Option<usize>,
}

/// Human-oriented dump of a complex's state. Written as JSON; nothing in the
/// core reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexInfo {
    /// The complex's name.
    pub name: String,
    /// RFC 3339 timestamp of the dump.
    pub generated_at: String,
    /// Member space summaries in sum order.
    pub spaces: Vec<SpaceInfo>,
    /// Operator summaries per differential.
    pub operators: Vec<OperatorInfo>,
    /// Cohomology tables, when computable.
    pub cohomology: Vec<CohomologyTable>,
}

impl ComplexInfo {
    /// Collects the current state of a complex from the store.
    pub fn collect(complex: &GraphComplex, store: &dyn Store) -> Self {
        let spaces = complex
            .sum()
            .members()
            .iter()
            .map(|vs| SpaceInfo {
                name: vs.name(),
                valid: vs.is_valid(),
                built: vs.basis_built(store),
                dim: vs.get_dimension(store).ok(),
            })
            .collect();
        let operators = complex
            .differentials()
            .iter()
            .flat_map(|d| d.collection().operators())
            .map(|op| OperatorInfo {
                name: op.name(),
                valid: op.is_valid(),
                built: op.matrix_built(store),
                shape: op.get_shape(store).ok(),
                rank: op.get_rank(store).ok().map(|r| r.reported()),
            })
            .collect();
        let cohomology = complex.compute_cohomology(store).unwrap_or_default();
        Self {
            name: complex.name().to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            spaces,
            operators,
            cohomology,
        }
    }

    /// Writes the dump under the given store key as pretty JSON.
    pub fn write(&self, store: &dyn Store, key: &str) -> Result<(), GchError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            GchError::Store(ErrorInfo::new("info-serialize", err.to_string()))
        })?;
        store.put(key, json.as_bytes())
    }
}
