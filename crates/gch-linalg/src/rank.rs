use gch_core::{Config, ErrorInfo, GchError, RngHandle};
use nalgebra::DMatrix;
use rand::Rng;

use crate::sparse::SparseMatrix;

/// How a rank is to be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Exact rank over the integers (fraction-free elimination).
    Exact,
    /// Rank over `Z/pZ` for the first `n_primes` primes of the configured
    /// list.
    Modular {
        /// Number of primes to draw from the configured list.
        n_primes: usize,
    },
    /// Randomised numerical rank proxy, only good enough for scheduling.
    Estimate {
        /// Seed for the sketching matrix; derived deterministically from the
        /// operator key by the caller.
        seed: u64,
    },
}

/// Result of a rank computation, tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankResult {
    /// Exact integer rank.
    Exact(usize),
    /// One rank per prime, in the order the primes were drawn.
    Modular(Vec<(u64, usize)>),
    /// Randomised estimate, never used for cohomology dimensions.
    Estimate(usize),
}

impl RankResult {
    /// The single rank reported to consumers: the exact value, the minimum
    /// over primes, or the estimate.
    pub fn reported(&self) -> usize {
        match self {
            RankResult::Exact(r) | RankResult::Estimate(r) => *r,
            RankResult::Modular(pairs) => {
                pairs.iter().map(|&(_, r)| r).min().unwrap_or(0)
            }
        }
    }

    /// Returns true when the value is only an estimate.
    pub fn is_estimate(&self) -> bool {
        matches!(self, RankResult::Estimate(_))
    }

    /// Primes whose rank disagrees with the reported minimum, if any.
    pub fn disagreeing_primes(&self) -> Vec<u64> {
        match self {
            RankResult::Modular(pairs) => {
                let min = self.reported();
                pairs
                    .iter()
                    .filter(|&&(_, r)| r != min)
                    .map(|&(p, _)| p)
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Serialises the result to the rank file format: a single integer line
    /// for exact and single-prime modular ranks, `prime rank` pairs for
    /// multi-prime runs, and a `~`-prefixed integer for estimates.
    pub fn to_text(&self) -> String {
        match self {
            RankResult::Exact(r) => format!("{r}\n"),
            RankResult::Estimate(r) => format!("~{r}\n"),
            RankResult::Modular(pairs) if pairs.len() == 1 => format!("{}\n", pairs[0].1),
            RankResult::Modular(pairs) => {
                let mut out = String::new();
                for &(p, r) in pairs {
                    out.push_str(&format!("{p} {r}\n"));
                }
                out
            }
        }
    }

    /// Parses a rank file.
    pub fn from_text(text: &str) -> Result<Self, GchError> {
        let format_err =
            |msg: &str| GchError::Format(ErrorInfo::new("rank-parse", msg));
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        match lines.as_slice() {
            [] => Err(format_err("empty rank file")),
            [single] => {
                let token = single.trim();
                if let Some(rest) = token.strip_prefix('~') {
                    let r = rest
                        .parse()
                        .map_err(|_| format_err("bad estimate value"))?;
                    return Ok(RankResult::Estimate(r));
                }
                let mut parts = token.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(r), None, _) => Ok(RankResult::Exact(
                        r.parse().map_err(|_| format_err("bad rank value"))?,
                    )),
                    (Some(p), Some(r), None) => Ok(RankResult::Modular(vec![(
                        p.parse().map_err(|_| format_err("bad prime"))?,
                        r.parse().map_err(|_| format_err("bad rank value"))?,
                    )])),
                    _ => Err(format_err("bad rank line")),
                }
            }
            many => {
                let mut pairs = Vec::with_capacity(many.len());
                for line in many {
                    let mut parts = line.split_whitespace();
                    let p = parts
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| format_err("bad prime"))?;
                    let r = parts
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| format_err("bad rank value"))?;
                    if parts.next().is_some() {
                        return Err(format_err("trailing tokens on rank line"));
                    }
                    pairs.push((p, r));
                }
                Ok(RankResult::Modular(pairs))
            }
        }
    }

    /// Runs the requested mode against a matrix.
    pub fn compute(
        matrix: &SparseMatrix,
        mode: RankMode,
        config: &Config,
    ) -> Result<Self, GchError> {
        match mode {
            RankMode::Exact => Ok(RankResult::Exact(exact_rank(matrix)?)),
            RankMode::Modular { n_primes } => {
                let primes = config.primes_for(n_primes.max(1));
                let pairs = primes
                    .iter()
                    .map(|&p| (p, modular_rank(matrix, p)))
                    .collect();
                Ok(RankResult::Modular(pairs))
            }
            RankMode::Estimate { seed } => Ok(RankResult::Estimate(estimate_rank(
                matrix,
                config.estimate_rank_eps,
                seed,
            ))),
        }
    }
}

/// Exact rank over the integers via fraction-free (Bareiss) elimination with
/// full pivoting.
///
/// Intermediate values are minors of the input; `i128` accommodates every
/// matrix the engine produces, and overflow surfaces as a rank error rather
/// than a wrong answer.
pub fn exact_rank(matrix: &SparseMatrix) -> Result<usize, GchError> {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 || matrix.is_zero() {
        return Ok(0);
    }
    let mut dense = vec![vec![0i128; cols]; rows];
    for &(r, c, v) in matrix.entries() {
        dense[r][c] = v as i128;
    }
    let overflow = || {
        GchError::Rank(
            ErrorInfo::new("rank-overflow", "intermediate minor exceeds i128")
                .with_hint("use the modular mode for this operator"),
        )
    };
    let steps = rows.min(cols);
    let mut prev: i128 = 1;
    let mut rank = 0usize;
    for step in 0..steps {
        // Full pivot search over the remaining submatrix.
        let pivot = (step..rows)
            .flat_map(|i| (step..cols).map(move |j| (i, j)))
            .find(|&(i, j)| dense[i][j] != 0);
        let Some((pi, pj)) = pivot else {
            break;
        };
        dense.swap(step, pi);
        if pj != step {
            for row in dense.iter_mut() {
                row.swap(step, pj);
            }
        }
        let pivot_value = dense[step][step];
        for i in step + 1..rows {
            for j in step + 1..cols {
                let a = pivot_value.checked_mul(dense[i][j]).ok_or_else(overflow)?;
                let b = dense[i][step]
                    .checked_mul(dense[step][j])
                    .ok_or_else(overflow)?;
                dense[i][j] = a.checked_sub(b).ok_or_else(overflow)? / prev;
            }
            dense[i][step] = 0;
        }
        prev = pivot_value;
        rank += 1;
    }
    Ok(rank)
}

/// Rank over `Z/pZ` by Gaussian elimination. `p` must be an odd prime below
/// 2³².
pub fn modular_rank(matrix: &SparseMatrix, p: u64) -> usize {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 || matrix.is_zero() {
        return 0;
    }
    let mut dense = vec![vec![0u64; cols]; rows];
    for &(r, c, v) in matrix.entries() {
        dense[r][c] = v.rem_euclid(p as i64) as u64;
    }
    let mut rank = 0usize;
    let mut row = 0usize;
    for col in 0..cols {
        let Some(pivot_row) = (row..rows).find(|&i| dense[i][col] != 0) else {
            continue;
        };
        dense.swap(row, pivot_row);
        let inv = mod_inverse(dense[row][col], p);
        for j in col..cols {
            dense[row][j] = mod_mul(dense[row][j], inv, p);
        }
        for i in 0..rows {
            if i == row || dense[i][col] == 0 {
                continue;
            }
            let factor = dense[i][col];
            for j in col..cols {
                let sub = mod_mul(factor, dense[row][j], p);
                dense[i][j] = (dense[i][j] + p - sub) % p;
            }
        }
        row += 1;
        rank += 1;
        if row == rows {
            break;
        }
    }
    rank
}

/// Randomised numerical rank proxy.
///
/// Wide matrices are first sketched against a random ±1 matrix, then the
/// singular values above `eps` are counted. Deterministic for a fixed seed;
/// only used to schedule work, never for cohomology dimensions.
pub fn estimate_rank(matrix: &SparseMatrix, eps: f64, seed: u64) -> usize {
    const SKETCH_COLS: usize = 128;
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 || matrix.is_zero() {
        return 0;
    }
    let mut dense = DMatrix::<f64>::zeros(rows, cols);
    for &(r, c, v) in matrix.entries() {
        dense[(r, c)] = v as f64;
    }
    let sketched = if cols > SKETCH_COLS {
        let mut rng = RngHandle::from_seed(seed);
        let omega = DMatrix::<f64>::from_fn(cols, SKETCH_COLS, |_, _| {
            if rng.gen::<bool>() {
                1.0
            } else {
                -1.0
            }
        });
        &dense * omega
    } else {
        dense
    };
    sketched
        .svd(false, false)
        .singular_values
        .iter()
        .filter(|&&sigma| sigma > eps)
        .count()
}

fn mod_mul(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

fn mod_inverse(a: u64, p: u64) -> u64 {
    // Fermat: a^(p-2) mod p.
    let mut base = a % p;
    let mut exp = p - 2;
    let mut acc = 1u64;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mod_mul(acc, base, p);
        }
        base = mod_mul(base, base, p);
        exp >>= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use gch_core::config::RANK_PRIMES;
    use proptest::prelude::*;

    fn diagonal_ones() -> SparseMatrix {
        SparseMatrix::from_entries(3, 3, vec![(0, 0, 1), (1, 1, 1), (2, 2, 1)]).unwrap()
    }

    #[test]
    fn diagonal_rank_is_three_in_every_mode() {
        let m = diagonal_ones();
        assert_eq!(exact_rank(&m).unwrap(), 3);
        for p in RANK_PRIMES {
            assert_eq!(modular_rank(&m, p), 3);
        }
        assert_eq!(estimate_rank(&m, 1e-4, 7), 3);
    }

    #[test]
    fn dependent_rows_lower_the_rank() {
        let m = SparseMatrix::from_entries(
            3,
            3,
            vec![
                (0, 0, 1),
                (0, 1, 2),
                (1, 0, 2),
                (1, 1, 4),
                (2, 2, 5),
            ],
        )
        .unwrap();
        assert_eq!(exact_rank(&m).unwrap(), 2);
        assert_eq!(modular_rank(&m, RANK_PRIMES[0]), 2);
    }

    #[test]
    fn zero_and_empty_shapes() {
        assert_eq!(exact_rank(&SparseMatrix::zero(0, 4)).unwrap(), 0);
        assert_eq!(exact_rank(&SparseMatrix::zero(4, 4)).unwrap(), 0);
        assert_eq!(modular_rank(&SparseMatrix::zero(3, 0), RANK_PRIMES[0]), 0);
    }

    #[test]
    fn rank_file_round_trips() {
        let exact = RankResult::Exact(17);
        assert_eq!(exact.to_text(), "17\n");
        assert_eq!(RankResult::from_text("17\n").unwrap(), exact);

        let est = RankResult::Estimate(4);
        assert!(est.is_estimate());
        assert_eq!(est.to_text(), "~4\n");
        assert_eq!(RankResult::from_text("~4\n").unwrap(), est);

        let modular = RankResult::Modular(vec![(RANK_PRIMES[0], 3), (RANK_PRIMES[1], 3)]);
        let text = modular.to_text();
        assert_eq!(RankResult::from_text(&text).unwrap(), modular);
        assert_eq!(modular.reported(), 3);
        assert!(modular.disagreeing_primes().is_empty());
    }

    #[test]
    fn modular_minimum_and_disagreement() {
        let r = RankResult::Modular(vec![(5, 4), (7, 3)]);
        assert_eq!(r.reported(), 3);
        assert_eq!(r.disagreeing_primes(), vec![5]);
    }

    proptest! {
        #[test]
        fn exact_and_modular_agree_on_small_matrices(
            entries in proptest::collection::vec((0usize..6, 0usize..6, -4i64..5), 0..18)
        ) {
            let m = SparseMatrix::from_entries(6, 6, entries).unwrap();
            let exact = exact_rank(&m).unwrap();
            for p in RANK_PRIMES {
                prop_assert_eq!(modular_rank(&m, p), exact);
            }
        }
    }
}
