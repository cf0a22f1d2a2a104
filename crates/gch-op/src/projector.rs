use std::collections::HashMap;
use std::sync::Arc;

use gch_core::{Config, ErrorInfo, GchError, Perm};
use gch_graph::from_graph6;
use gch_linalg::{RankMode, RankResult, SparseMatrix};
use gch_spaces::{BasisCache, GraphVectorSpace};
use gch_store::Store;
use itertools::Itertools;

use crate::operator::{GraphOperator, RankStatus};

/// Hook a family exposes when its numbered hairs carry a symmetric-group
/// action.
pub trait HairAction: Send + Sync {
    /// Number of numbered hairs.
    fn n_hairs(&self) -> usize;

    /// Lifts a permutation of the hair labels to a permutation of all
    /// vertices.
    fn vertex_permutation(&self, hair_perm: &Perm) -> Perm;
}

/// All partitions of `n` with parts in decreasing order, listed from `[n]`
/// down to `[1, …, 1]`.
pub fn partitions_of(n: usize) -> Vec<Vec<usize>> {
    fn descend(n: usize, max: usize, out: &mut Vec<Vec<usize>>, stack: &mut Vec<usize>) {
        if n == 0 {
            out.push(stack.clone());
            return;
        }
        for part in (1..=n.min(max)).rev() {
            stack.push(part);
            descend(n - part, part, out, stack);
            stack.pop();
        }
    }
    let mut out = Vec::new();
    descend(n, n, &mut out, &mut Vec::new());
    out
}

/// Irreducible character `χ_λ` at the class of cycle type `μ`, by the
/// Murnaghan–Nakayama rule over beta numbers.
pub fn character(lambda: &[usize], mu: &[usize]) -> i64 {
    let rows = lambda.len().max(1);
    let beta: Vec<i64> = (0..rows)
        .map(|i| lambda.get(i).copied().unwrap_or(0) as i64 + (rows - 1 - i) as i64)
        .collect();
    strip_sum(&beta, mu)
}

fn strip_sum(beta: &[i64], mu: &[usize]) -> i64 {
    let Some((&k, rest)) = mu.split_first() else {
        return 1;
    };
    let k = k as i64;
    let mut total = 0i64;
    for (i, &b) in beta.iter().enumerate() {
        let lowered = b - k;
        if lowered < 0 || beta.contains(&lowered) {
            continue;
        }
        let crossings = beta.iter().filter(|&&x| x > lowered && x < b).count();
        let sign = if crossings % 2 == 0 { 1 } else { -1 };
        let mut next = beta.to_vec();
        next[i] = lowered;
        total += sign * strip_sum(&next, rest);
    }
    total
}

/// Dimension of the irreducible indexed by `lambda`, via the hook length
/// formula.
pub fn irreducible_dimension(lambda: &[usize]) -> u64 {
    let n: usize = lambda.iter().sum();
    let mut numerator = 1u64;
    for k in 1..=n as u64 {
        numerator *= k;
    }
    let mut hooks = 1u64;
    for (i, &part) in lambda.iter().enumerate() {
        for j in 0..part {
            let arm = part - 1 - j;
            let leg = lambda[i + 1..].iter().filter(|&&p| p > j).count();
            hooks *= (arm + leg + 1) as u64;
        }
    }
    numerator / hooks
}

fn cycle_type(perm: &Perm) -> Vec<usize> {
    let n = perm.len();
    let mut seen = vec![false; n];
    let mut cycles = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        let mut len = 0usize;
        let mut v = start;
        while !seen[v] {
            seen[v] = true;
            v = perm.image(v);
            len += 1;
        }
        cycles.push(len);
    }
    cycles.sort_unstable_by(|a, b| b.cmp(a));
    cycles
}

/// Projector onto the isotypical component `rep_index` of the hair action.
///
/// The stored matrix is the integral character sum `Σ_σ χ_λ(σ)·A(σ)`, which
/// satisfies `P² = (h!/dim λ)·P`; `A(σ)` is the signed permutation-action
/// matrix on the space's basis.
pub struct SymmProjector {
    space: Arc<dyn GraphVectorSpace>,
    action: Arc<dyn HairAction>,
    rep_index: usize,
    matrix_key: String,
    rank_key: String,
}

impl SymmProjector {
    /// Creates a projector descriptor. `rep_index` indexes
    /// [`partitions_of`]`(h)`.
    pub fn new(
        space: Arc<dyn GraphVectorSpace>,
        action: Arc<dyn HairAction>,
        rep_index: usize,
        matrix_key: String,
        rank_key: String,
    ) -> Result<Self, GchError> {
        let h = action.n_hairs();
        if rep_index >= partitions_of(h).len() {
            return Err(GchError::Graph(
                ErrorInfo::new("projector-rep", "representation index out of range")
                    .with_context("rep_index", rep_index.to_string())
                    .with_context("hairs", h.to_string()),
            ));
        }
        Ok(Self {
            space,
            action,
            rep_index,
            matrix_key,
            rank_key,
        })
    }

    /// The underlying space.
    pub fn space(&self) -> &Arc<dyn GraphVectorSpace> {
        &self.space
    }

    /// The partition of `h` indexing the irreducible.
    pub fn representation(&self) -> Vec<usize> {
        partitions_of(self.action.n_hairs())[self.rep_index].clone()
    }

    /// Scaling constant `h!/dim λ` appearing in `P² = c·P`.
    pub fn idempotent_scale(&self) -> u64 {
        let h = self.action.n_hairs();
        let mut factorial = 1u64;
        for k in 1..=h as u64 {
            factorial *= k;
        }
        factorial / irreducible_dimension(&self.representation())
    }

    /// Store key of the projector matrix.
    pub fn matrix_key(&self) -> String {
        self.matrix_key.clone()
    }

    /// Builds the projector matrix from the space's basis. The basis and
    /// its lookup come from one memoised read.
    pub fn build_matrix(&self, store: &dyn Store, ignore_existing: bool) -> Result<(), GchError> {
        if !self.space.is_valid() {
            return Ok(());
        }
        if store.exists(&self.matrix_key) && !ignore_existing {
            return Ok(());
        }
        let cache = BasisCache::new();
        let basis = cache.basis(self.space.as_ref(), store)?;
        let lookup = cache.lookup(self.space.as_ref(), store)?;
        let dim = basis.len();
        let lambda = self.representation();
        let h = self.action.n_hairs();
        let mut characters: HashMap<Vec<usize>, i64> = HashMap::new();
        let mut entries: HashMap<(usize, usize), i64> = HashMap::new();
        for images in (0..h).permutations(h) {
            let hair_perm = Perm::new(images);
            let chi = *characters
                .entry(cycle_type(&hair_perm))
                .or_insert_with_key(|class| character(&lambda, class));
            if chi == 0 {
                continue;
            }
            let vertex_perm = self.action.vertex_permutation(&hair_perm);
            for (row, g6) in basis.iter().enumerate() {
                let graph = from_graph6(g6)?;
                let moved = graph.relabel(&vertex_perm);
                let (canon_g6, sign) = self.space.graph_to_canon_g6(&moved);
                if let Some(&col) = lookup.get(&canon_g6) {
                    *entries.entry((row, col)).or_insert(0) += chi * sign;
                }
            }
        }
        let matrix = SparseMatrix::from_entries(
            dim,
            dim,
            entries.into_iter().map(|((r, c), v)| (r, c, v)),
        )?;
        store.put(&self.matrix_key, matrix.to_text().as_bytes())
    }

    /// Loads the projector matrix.
    pub fn get_matrix(&self, store: &dyn Store) -> Result<SparseMatrix, GchError> {
        if !self.space.is_valid() {
            return Ok(SparseMatrix::zero(0, 0));
        }
        let bytes = store.get(&self.matrix_key)?;
        let matrix = SparseMatrix::from_text(&String::from_utf8_lossy(&bytes))?;
        let dim = self.space.get_dimension(store)?;
        if matrix.shape() != (dim, dim) {
            return Err(GchError::Format(
                ErrorInfo::new("projector-shape", "stored shape disagrees with the space")
                    .with_context("stored", format!("{:?}", matrix.shape()))
                    .with_context("dim", dim.to_string()),
            ));
        }
        Ok(matrix)
    }

    /// Computes and caches the projector rank.
    pub fn compute_rank(
        &self,
        store: &dyn Store,
        mode: RankMode,
        config: &Config,
        ignore_existing: bool,
    ) -> Result<RankStatus, GchError> {
        if store.exists(&self.rank_key) && !ignore_existing {
            return Ok(RankStatus::Reused);
        }
        if !store.exists(&self.matrix_key) {
            return Ok(RankStatus::Inconclusive);
        }
        let matrix = self.get_matrix(store)?;
        let result = RankResult::compute(&matrix, mode, config)?;
        store.put(&self.rank_key, result.to_text().as_bytes())?;
        Ok(RankStatus::Computed(result))
    }
}

/// A differential restricted to one isotypical component: `d_λ = d ∘ P_λ`.
///
/// The restricted matrix is the product `M(P_λ) · M(d)`; summed over λ the
/// restricted ranks recover the rank of `d` on the image of the total
/// projector.
pub struct RestrictedOperator {
    operator: Arc<dyn GraphOperator>,
    projector: SymmProjector,
    matrix_key: String,
    rank_key: String,
}

impl RestrictedOperator {
    /// Creates a restricted operator descriptor. The projector must live on
    /// the operator's domain.
    pub fn new(
        operator: Arc<dyn GraphOperator>,
        projector: SymmProjector,
        matrix_key: String,
        rank_key: String,
    ) -> Result<Self, GchError> {
        if !projector
            .space()
            .is_same_space(operator.domain().as_ref())
        {
            return Err(GchError::Graph(
                ErrorInfo::new("restricted-domain", "projector lives on a different space")
                    .with_context("operator", operator.name()),
            ));
        }
        Ok(Self {
            operator,
            projector,
            matrix_key,
            rank_key,
        })
    }

    /// Builds the restricted matrix from the stored operator and projector
    /// matrices.
    pub fn build_matrix(&self, store: &dyn Store, ignore_existing: bool) -> Result<(), GchError> {
        if !self.operator.is_valid() {
            return Ok(());
        }
        if store.exists(&self.matrix_key) && !ignore_existing {
            return Ok(());
        }
        let projector = self.projector.get_matrix(store)?;
        let operator = self.operator.get_matrix(store)?;
        let restricted = projector.multiply(&operator)?;
        store.put(&self.matrix_key, restricted.to_text().as_bytes())
    }

    /// Loads the restricted matrix.
    pub fn get_matrix(&self, store: &dyn Store) -> Result<SparseMatrix, GchError> {
        let bytes = store.get(&self.matrix_key)?;
        SparseMatrix::from_text(&String::from_utf8_lossy(&bytes))
    }

    /// Computes and caches the restricted rank.
    pub fn compute_rank(
        &self,
        store: &dyn Store,
        mode: RankMode,
        config: &Config,
        ignore_existing: bool,
    ) -> Result<RankStatus, GchError> {
        if store.exists(&self.rank_key) && !ignore_existing {
            return Ok(RankStatus::Reused);
        }
        if !store.exists(&self.matrix_key) {
            return Ok(RankStatus::Inconclusive);
        }
        let matrix = self.get_matrix(store)?;
        let result = RankResult::compute(&matrix, mode, config)?;
        store.put(&self.rank_key, result.to_text().as_bytes())?;
        Ok(RankStatus::Computed(result))
    }

    /// Loads the cached restricted rank.
    pub fn get_rank(&self, store: &dyn Store) -> Result<RankResult, GchError> {
        let bytes = store.get(&self.rank_key)?;
        RankResult::from_text(&String::from_utf8_lossy(&bytes))
    }
}
