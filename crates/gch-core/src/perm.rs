//! Permutations of `{0, …, n−1}` and their signatures.

use serde::{Deserialize, Serialize};

/// A permutation stored as the image list: `p[i]` is the image of `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perm(Vec<usize>);

impl Perm {
    /// Wraps an image list. The caller guarantees it is a permutation of
    /// `0..p.len()`.
    pub fn new(p: Vec<usize>) -> Self {
        debug_assert!(is_permutation(&p));
        Self(p)
    }

    /// The identity permutation on `n` points.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Builds a permutation from an arbitrary sequence of distinct values by
    /// replacing each value with its rank. `shifted(&[7, 3, 5])` is the
    /// permutation `[2, 0, 1]`.
    pub fn shifted(values: &[usize]) -> Self {
        let mut sorted: Vec<usize> = values.to_vec();
        sorted.sort_unstable();
        let ranks = values
            .iter()
            .map(|v| sorted.binary_search(v).unwrap_or(0))
            .collect();
        Self(ranks)
    }

    /// Number of points the permutation acts on.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty permutation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The image of point `i`.
    pub fn image(&self, i: usize) -> usize {
        self.0[i]
    }

    /// The underlying image list.
    pub fn images(&self) -> &[usize] {
        &self.0
    }

    /// The inverse permutation: `inv[p[i]] = i`.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (i, &j) in self.0.iter().enumerate() {
            inv[j] = i;
        }
        Self(inv)
    }

    /// Signature of the permutation: +1 for even, −1 for odd.
    ///
    /// Computed from the cycle decomposition; each cycle of length k
    /// contributes (−1)^(k−1).
    pub fn sign(&self) -> i64 {
        let n = self.0.len();
        let mut seen = vec![false; n];
        let mut sign = 1i64;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut len = 0usize;
            let mut v = start;
            while !seen[v] {
                seen[v] = true;
                v = self.0[v];
                len += 1;
            }
            if len % 2 == 0 {
                sign = -sign;
            }
        }
        sign
    }

    /// Composition `self ∘ other`: first apply `other`, then `self`.
    pub fn compose(&self, other: &Perm) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self(other.0.iter().map(|&j| self.0[j]).collect())
    }
}

fn is_permutation(p: &[usize]) -> bool {
    let mut seen = vec![false; p.len()];
    for &j in p {
        if j >= p.len() || seen[j] {
            return false;
        }
        seen[j] = true;
    }
    true
}
