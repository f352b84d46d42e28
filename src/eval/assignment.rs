//! Maximum-weight bipartite assignment (Kuhn-Munkres).
//!
//! Used by CEAF to align gold and system clusters one-to-one. The solver is
//! the O(n²m) shortest-augmenting-path formulation with row and column
//! potentials, run on negated weights so that minimum cost is maximum
//! weight.

use serde::Serialize;

/// An optimal one-to-one matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assignment {
    /// Matched `(row, column)` pairs, sorted by row.
    pub pairs: Vec<(usize, usize)>,
    /// Sum of the weights of the matched pairs.
    pub total: f64,
}

/// Find the matching of rows to columns with maximum total weight.
///
/// Every row (or every column, whichever side is smaller) is matched.
/// Ragged rows are padded with zeros, and non-finite weights count as 0.
///
/// ```rust
/// use stroll::eval::assignment::max_weight_assignment;
///
/// let weights = vec![
///     vec![0.9, 0.8, 0.0],
///     vec![0.8, 0.0, 0.0],
///     vec![0.0, 0.0, 0.5],
/// ];
/// let best = max_weight_assignment(&weights);
/// assert_eq!(best.pairs, vec![(0, 1), (1, 0), (2, 2)]);
/// assert!((best.total - 2.1).abs() < 1e-9);
/// ```
#[must_use]
pub fn max_weight_assignment(weights: &[Vec<f64>]) -> Assignment {
    let rows = weights.len();
    let cols = weights.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Assignment::default();
    }

    let weight = |r: usize, c: usize| -> f64 {
        weights[r]
            .get(c)
            .copied()
            .filter(|w| w.is_finite())
            .unwrap_or(0.0)
    };

    // solve with n <= m
    let transposed = rows > cols;
    let (n, m) = if transposed { (cols, rows) } else { (rows, cols) };
    let cost = |i: usize, j: usize| -> f64 {
        if transposed {
            -weight(j, i)
        } else {
            -weight(i, j)
        }
    };

    // 1-indexed; column 0 is the virtual source
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // augment along the alternating path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=m)
        .filter(|&j| owner[j] != 0)
        .map(|j| {
            let (i, j) = (owner[j] - 1, j - 1);
            if transposed {
                (j, i)
            } else {
                (i, j)
            }
        })
        .collect();
    pairs.sort_unstable();

    let total = pairs.iter().map(|&(r, c)| weight(r, c)).sum();
    Assignment { pairs, total }
}
