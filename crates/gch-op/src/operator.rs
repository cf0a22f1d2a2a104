use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Arc;

use gch_core::{derive_substream_seed, Config, ErrorInfo, GchError};
use gch_graph::{from_graph6, Graph};
use gch_linalg::{RankMode, RankResult, SparseMatrix};
use gch_spaces::{BasisCache, GraphVectorSpace};
use gch_store::Store;
use rayon::prelude::*;
use siphasher::sip::SipHasher13;

/// Outcome of a rank computation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankStatus {
    /// A fresh rank was computed and written.
    Computed(RankResult),
    /// An existing rank file was kept.
    Reused,
    /// The matrix file is missing; nothing was written.
    Inconclusive,
}

/// Capability contract for an operator between two graph vector spaces.
///
/// An operator is a descriptor holding the parameter tuples of its endpoint
/// spaces; the matrix is materialised into the store on demand. On basis
/// graphs the operator is defined by [`operate_on`]: the image of `G` is the
/// signed sum of the returned `(graph, coefficient)` pairs.
///
/// Matrix convention: rows index the domain basis, columns the target basis,
/// so the composition `b ∘ a` corresponds to the product `M(a) · M(b)`.
///
/// [`operate_on`]: GraphOperator::operate_on
pub trait GraphOperator: Send + Sync {
    /// The space the operator acts on.
    fn domain(&self) -> Arc<dyn GraphVectorSpace>;

    /// The space the operator maps into.
    fn target(&self) -> Arc<dyn GraphVectorSpace>;

    /// Rôle tag, e.g. `"contract edges"`.
    fn operator_type(&self) -> &'static str;

    /// Store key of the matrix file.
    fn matrix_key(&self) -> String;

    /// Store key of the rank file.
    fn rank_key(&self) -> String;

    /// Image of a single basis graph as `(graph, coefficient)` pairs. The
    /// graphs need not be canonical; the builder canonicalises them in the
    /// target partition.
    fn operate_on(&self, graph: &Graph) -> Vec<(Graph, i64)>;

    /// Scheduling weight.
    fn get_work_estimate(&self) -> u64 {
        self.domain().get_work_estimate()
    }

    /// Human readable description.
    fn name(&self) -> String {
        format!("<{}: {}>", self.operator_type(), self.domain().name())
    }

    /// Operators are valid exactly when both endpoints are.
    fn is_valid(&self) -> bool {
        self.domain().is_valid() && self.target().is_valid()
    }

    /// Descriptor identity.
    fn is_same_operator(&self, other: &dyn GraphOperator) -> bool {
        self.operator_type() == other.operator_type()
            && self.domain().is_same_space(other.domain().as_ref())
            && self.target().is_same_space(other.target().as_ref())
    }

    /// Returns true when the matrix file exists.
    fn matrix_built(&self, store: &dyn Store) -> bool {
        store.exists(&self.matrix_key())
    }

    /// Shape as `(domain dim, target dim)`; invalid endpoints count 0.
    fn get_shape(&self, store: &dyn Store) -> Result<(usize, usize), GchError> {
        Ok((
            self.domain().get_dimension(store)?,
            self.target().get_dimension(store)?,
        ))
    }

    /// Builds the matrix file with a throwaway basis memo. Collections use
    /// [`build_matrix_cached`] to share loaded bases across their operators.
    ///
    /// [`build_matrix_cached`]: GraphOperator::build_matrix_cached
    fn build_matrix(
        &self,
        store: &dyn Store,
        ignore_existing: bool,
        skip_if_no_basis: bool,
    ) -> Result<(), GchError> {
        self.build_matrix_cached(store, ignore_existing, skip_if_no_basis, &BasisCache::new())
    }

    /// Builds the matrix file, reading endpoint bases through the memo.
    ///
    /// Skips invalid operators and existing files (unless `ignore_existing`).
    /// A missing basis either skips with `skip_if_no_basis` or surfaces as a
    /// `NotBuilt` error. Rows are processed in parallel; the output is
    /// independent of scheduling because triplets are sorted before writing.
    fn build_matrix_cached(
        &self,
        store: &dyn Store,
        ignore_existing: bool,
        skip_if_no_basis: bool,
        cache: &BasisCache,
    ) -> Result<(), GchError> {
        if !self.is_valid() {
            return Ok(());
        }
        let key = self.matrix_key();
        if store.exists(&key) && !ignore_existing {
            return Ok(());
        }
        let domain = self.domain();
        let target = self.target();
        let bases = (|| -> Result<_, GchError> {
            Ok((
                cache.basis(domain.as_ref(), store)?,
                cache.lookup(target.as_ref(), store)?,
            ))
        })();
        let (domain_basis, lookup) = match bases {
            Ok(found) => found,
            Err(err) if err.is_not_built() && skip_if_no_basis => return Ok(()),
            Err(err) if err.is_not_built() => {
                return Err(GchError::NotBuilt(
                    ErrorInfo::new("operator-basis", "endpoint basis missing")
                        .with_context("operator", self.name())
                        .with_hint("build the domain and target bases first"),
                ))
            }
            Err(err) => return Err(err),
        };
        let shape = (domain_basis.len(), lookup.len());
        if shape.0 == 0 || shape.1 == 0 {
            let empty = SparseMatrix::zero(shape.0, shape.1);
            return store.put(&key, empty.to_text().as_bytes());
        }
        let rows: Result<Vec<Vec<(usize, usize, i64)>>, GchError> = domain_basis
            .par_iter()
            .enumerate()
            .map(|(row, g6)| {
                let graph = from_graph6(g6)?;
                let mut acc: HashMap<String, i64> = HashMap::new();
                for (image, coefficient) in self.operate_on(&graph) {
                    let (canon_g6, sign) = target.graph_to_canon_g6(&image);
                    *acc.entry(canon_g6).or_insert(0) += sign * coefficient;
                }
                let mut triplets = Vec::new();
                for (canon_g6, value) in acc {
                    if value == 0 {
                        continue;
                    }
                    // Images outside the target basis are projected away.
                    if let Some(&col) = lookup.get(&canon_g6) {
                        triplets.push((row, col, value));
                    }
                }
                Ok(triplets)
            })
            .collect();
        let matrix = SparseMatrix::from_entries(shape.0, shape.1, rows?.into_iter().flatten())?;
        store.put(&key, matrix.to_text().as_bytes())
    }

    /// Loads the matrix; invalid operators yield the empty matrix. The
    /// stored shape must agree with the current space dimensions.
    fn get_matrix(&self, store: &dyn Store) -> Result<SparseMatrix, GchError> {
        if !self.is_valid() {
            return Ok(SparseMatrix::zero(0, 0));
        }
        let bytes = store.get(&self.matrix_key())?;
        let matrix = SparseMatrix::from_text(&String::from_utf8_lossy(&bytes))?;
        let expected = self.get_shape(store)?;
        if matrix.shape() != expected {
            return Err(GchError::Format(
                ErrorInfo::new("matrix-shape", "stored shape disagrees with the spaces")
                    .with_context("operator", self.name())
                    .with_context("stored", format!("{:?}", matrix.shape()))
                    .with_context("expected", format!("{expected:?}")),
            ));
        }
        Ok(matrix)
    }

    /// The transposed matrix view used by compositions.
    fn get_matrix_transposed(&self, store: &dyn Store) -> Result<SparseMatrix, GchError> {
        Ok(self.get_matrix(store)?.transposed())
    }

    /// Returns true when the operator is the zero map: an endpoint dimension
    /// vanishes or the matrix carries no entries.
    fn is_trivial(&self, store: &dyn Store) -> Result<bool, GchError> {
        let (d, t) = self.get_shape(store)?;
        if d == 0 || t == 0 {
            return Ok(true);
        }
        Ok(self.get_matrix(store)?.is_zero())
    }

    /// Computes and caches the rank of the matrix.
    ///
    /// Invalid operators materialise rank 0; a missing matrix file reports
    /// [`RankStatus::Inconclusive`] without writing anything.
    fn compute_rank(
        &self,
        store: &dyn Store,
        mode: RankMode,
        config: &Config,
        ignore_existing: bool,
    ) -> Result<RankStatus, GchError> {
        let key = self.rank_key();
        if !self.is_valid() {
            let zero = RankResult::Exact(0);
            if !store.exists(&key) || ignore_existing {
                store.put(&key, zero.to_text().as_bytes())?;
            }
            return Ok(RankStatus::Computed(zero));
        }
        if store.exists(&key) && !ignore_existing {
            return Ok(RankStatus::Reused);
        }
        if !self.matrix_built(store) {
            return Ok(RankStatus::Inconclusive);
        }
        let matrix = self.get_matrix(store)?;
        let mode = match mode {
            // Anchor the sketch seed to the operator so reruns agree.
            RankMode::Estimate { seed } => RankMode::Estimate {
                seed: derive_substream_seed(seed, key_seed(&key)),
            },
            other => other,
        };
        let result = RankResult::compute(&matrix, mode, config)?;
        store.put(&key, result.to_text().as_bytes())?;
        Ok(RankStatus::Computed(result))
    }

    /// Loads the cached rank. Invalid operators report rank 0.
    fn get_rank(&self, store: &dyn Store) -> Result<RankResult, GchError> {
        if !self.is_valid() {
            return Ok(RankResult::Exact(0));
        }
        let bytes = store.get(&self.rank_key())?;
        RankResult::from_text(&String::from_utf8_lossy(&bytes))
    }
}

fn key_seed(key: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(key.as_bytes());
    hasher.finish()
}
