use std::collections::BTreeMap;
use std::fmt::Write as _;

use gch_core::{ErrorInfo, GchError};
use serde::{Deserialize, Serialize};

/// Sparse integer matrix in triplet form.
///
/// Entries are kept lexicographically sorted by `(row, col)` with exact `i64`
/// values; duplicate coordinates are collapsed and zero values dropped at
/// construction. Rows index the domain basis of an operator, columns the
/// target basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, i64)>,
}

impl SparseMatrix {
    /// Creates a matrix from raw triplets with 0-based coordinates.
    ///
    /// Duplicates are summed, zero sums removed, and the result sorted.
    /// Out-of-range coordinates are a format error.
    pub fn from_entries(
        rows: usize,
        cols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, i64)>,
    ) -> Result<Self, GchError> {
        let mut acc: BTreeMap<(usize, usize), i64> = BTreeMap::new();
        for (r, c, v) in triplets {
            if r >= rows || c >= cols {
                return Err(GchError::Format(
                    ErrorInfo::new("matrix-bounds", "triplet outside the stated shape")
                        .with_context("entry", format!("({r}, {c})"))
                        .with_context("shape", format!("{rows}x{cols}")),
                ));
            }
            *acc.entry((r, c)).or_insert(0) += v;
        }
        let entries = acc
            .into_iter()
            .filter(|&(_, v)| v != 0)
            .map(|((r, c), v)| (r, c, v))
            .collect();
        Ok(Self {
            rows,
            cols,
            entries,
        })
    }

    /// An all-zero matrix of the given shape.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: Vec::new(),
        }
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the matrix holds no nonzero entry.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sorted triplets with 0-based coordinates.
    pub fn entries(&self) -> &[(usize, usize, i64)] {
        &self.entries
    }

    /// The transposed matrix.
    pub fn transposed(&self) -> Self {
        let mut entries: Vec<(usize, usize, i64)> = self
            .entries
            .iter()
            .map(|&(r, c, v)| (c, r, v))
            .collect();
        entries.sort_unstable();
        Self {
            rows: self.cols,
            cols: self.rows,
            entries,
        }
    }

    /// Exact integer product `self · other`.
    ///
    /// Shapes must agree (`self.cols == other.rows`).
    pub fn multiply(&self, other: &SparseMatrix) -> Result<SparseMatrix, GchError> {
        if self.cols != other.rows {
            return Err(GchError::Format(
                ErrorInfo::new("matrix-product-shape", "inner dimensions disagree")
                    .with_context("left", format!("{}x{}", self.rows, self.cols))
                    .with_context("right", format!("{}x{}", other.rows, other.cols)),
            ));
        }
        // Bucket the right factor by row for the scatter pass.
        let mut right_rows: BTreeMap<usize, Vec<(usize, i64)>> = BTreeMap::new();
        for &(r, c, v) in &other.entries {
            right_rows.entry(r).or_default().push((c, v));
        }
        let mut acc: BTreeMap<(usize, usize), i64> = BTreeMap::new();
        for &(r, k, v) in &self.entries {
            if let Some(row) = right_rows.get(&k) {
                for &(c, w) in row {
                    *acc.entry((r, c)).or_insert(0) += v * w;
                }
            }
        }
        let entries = acc
            .into_iter()
            .filter(|&(_, v)| v != 0)
            .map(|((r, c), v)| (r, c, v))
            .collect();
        Ok(SparseMatrix {
            rows: self.rows,
            cols: other.cols,
            entries,
        })
    }

    /// Entrywise 1-norm: the sum of absolute values.
    pub fn norm_one(&self) -> u64 {
        self.entries.iter().map(|&(_, _, v)| v.unsigned_abs()).sum()
    }

    /// Exact sum `self + scale · other`. Shapes must agree.
    pub fn add_scaled(&self, other: &SparseMatrix, scale: i64) -> Result<SparseMatrix, GchError> {
        if self.shape() != other.shape() {
            return Err(GchError::Format(
                ErrorInfo::new("matrix-sum-shape", "shapes disagree")
                    .with_context("left", format!("{}x{}", self.rows, self.cols))
                    .with_context("right", format!("{}x{}", other.rows, other.cols)),
            ));
        }
        let combined = self
            .entries
            .iter()
            .copied()
            .chain(other.entries.iter().map(|&(r, c, v)| (r, c, scale * v)));
        Self::from_entries(self.rows, self.cols, combined)
    }

    /// Serialises the matrix to the wire format.
    ///
    /// Header `rows cols M`, one 1-based `i j v` line per entry in
    /// lexicographic order, terminator `0 0 0`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} M", self.rows, self.cols);
        for &(r, c, v) in &self.entries {
            let _ = writeln!(out, "{} {} {}", r + 1, c + 1, v);
        }
        out.push_str("0 0 0\n");
        out
    }

    /// Parses the wire format produced by [`SparseMatrix::to_text`].
    pub fn from_text(text: &str) -> Result<Self, GchError> {
        let format_err = |msg: &str| GchError::Format(ErrorInfo::new("matrix-parse", msg));
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| format_err("missing header"))?;
        let mut parts = header.split_whitespace();
        let rows: usize = parts
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| format_err("bad header row count"))?;
        let cols: usize = parts
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| format_err("bad header column count"))?;
        if parts.next() != Some("M") || parts.next().is_some() {
            return Err(format_err("bad header tag"));
        }
        let mut triplets = Vec::new();
        let mut terminated = false;
        for line in lines.by_ref() {
            let mut parts = line.split_whitespace();
            let i: i64 = parts
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| format_err("bad entry row"))?;
            let j: i64 = parts
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| format_err("bad entry column"))?;
            let v: i64 = parts
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| format_err("bad entry value"))?;
            if parts.next().is_some() {
                return Err(format_err("trailing tokens on entry line"));
            }
            if (i, j, v) == (0, 0, 0) {
                terminated = true;
                break;
            }
            if i < 1 || j < 1 {
                return Err(format_err("entry indices must be 1-based"));
            }
            triplets.push(((i - 1) as usize, (j - 1) as usize, v));
        }
        if !terminated {
            return Err(format_err("missing terminator line"));
        }
        if lines.next().is_some() {
            return Err(format_err("content after terminator"));
        }
        Self::from_entries(rows, cols, triplets)
    }
}
