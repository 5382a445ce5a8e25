//! SciPy optimization functions port.
//!
//! Ported from scipy.optimize.linear_sum_assignment (shortest augmenting path,
//! D.F. Crouse, "On implementing 2D rectangular assignment algorithms", 2016).
//! License: BSD 3-Clause (SciPy Developers)
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;

/// Represents a match between a row index and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Assignment {
    pub row_idx: usize,
    pub col_idx: usize,
}

/// Result of linear sum assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentResult {
    /// Valid assignments (row, col pairs), sorted by row
    pub assignments: Vec<Assignment>,
    /// Indices of rows that were not matched
    pub unmatched_rows: Vec<usize>,
    /// Indices of columns that were not matched
    pub unmatched_cols: Vec<usize>,
}

impl AssignmentResult {
    fn unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            assignments: Vec::new(),
            unmatched_rows: (0..num_rows).collect(),
            unmatched_cols: (0..num_cols).collect(),
        }
    }

    /// Sum of the costs of the assigned pairs.
    pub fn total_cost(&self, cost_matrix: &DMatrix<f64>) -> f64 {
        self.assignments
            .iter()
            .map(|a| cost_matrix[(a.row_idx, a.col_idx)])
            .sum()
    }
}

/// Solve the linear sum assignment problem over the allowed cells of a cost matrix.
///
/// A cell is allowed when its cost is strictly below `max_cost`; NaN cells are
/// never allowed. The result is a matching of maximum cardinality among allowed
/// cells and, among those, of minimum total cost. Forbidden cells are never part
/// of the result, so the empty matching is returned when nothing is allowed.
///
/// # Arguments
/// * `cost_matrix` - cost[(i, j)] is the cost of assigning row i to column j
/// * `max_cost` - exclusive upper bound on the cost of an assigned pair
///
/// # Algorithm
/// Forbidden cells are replaced by a penalty larger than any achievable sum of
/// allowed costs, the (possibly transposed) matrix is solved exactly with the
/// shortest augmenting path method, and penalised pairs are dropped.
pub fn linear_sum_assignment(cost_matrix: &DMatrix<f64>, max_cost: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.shape();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::unmatched(num_rows, num_cols);
    }

    let is_allowed = |c: f64| c.is_finite() && c < max_cost;

    let max_abs = cost_matrix
        .iter()
        .filter(|&&c| is_allowed(c))
        .fold(None, |acc: Option<f64>, &c| Some(acc.map_or(c.abs(), |m| m.max(c.abs()))));

    let Some(max_abs) = max_abs else {
        return AssignmentResult::unmatched(num_rows, num_cols);
    };

    // Swapping one forbidden cell for an allowed one must always pay off.
    let min_dim = num_rows.min(num_cols) as f64;
    let penalty = 2.0 * (max_abs + 1.0) * (min_dim + 1.0);

    // The solver needs rows <= cols.
    let transposed = num_rows > num_cols;
    let (nr, nc) = if transposed {
        (num_cols, num_rows)
    } else {
        (num_rows, num_cols)
    };

    let mut cost = Vec::with_capacity(nr * nc);
    for i in 0..nr {
        for j in 0..nc {
            let c = if transposed {
                cost_matrix[(j, i)]
            } else {
                cost_matrix[(i, j)]
            };
            cost.push(if is_allowed(c) { c } else { penalty });
        }
    }

    let col4row = solve_rectangular(&cost, nr, nc);

    let mut assignments = Vec::with_capacity(nr);
    let mut matched_rows = vec![false; num_rows];
    let mut matched_cols = vec![false; num_cols];

    for (i, &j) in col4row.iter().enumerate() {
        let (row_idx, col_idx) = if transposed { (j, i) } else { (i, j) };
        if is_allowed(cost_matrix[(row_idx, col_idx)]) {
            assignments.push(Assignment { row_idx, col_idx });
            matched_rows[row_idx] = true;
            matched_cols[col_idx] = true;
        }
    }
    assignments.sort_unstable();

    let unmatched_rows: Vec<usize> = (0..num_rows).filter(|&i| !matched_rows[i]).collect();
    let unmatched_cols: Vec<usize> = (0..num_cols).filter(|&j| !matched_cols[j]).collect();

    AssignmentResult {
        assignments,
        unmatched_rows,
        unmatched_cols,
    }
}

const NONE: usize = usize::MAX;

/// Exact minimum-cost assignment of every row of a finite `nr x nc` matrix, `nr <= nc`.
///
/// Returns the column assigned to each row.
fn solve_rectangular(cost: &[f64], nr: usize, nc: usize) -> Vec<usize> {
    debug_assert!(nr <= nc);
    debug_assert_eq!(cost.len(), nr * nc);

    let mut u = vec![0.0; nr];
    let mut v = vec![0.0; nc];
    let mut shortest_path_costs = vec![f64::INFINITY; nc];
    let mut path = vec![NONE; nc];
    let mut col4row = vec![NONE; nr];
    let mut row4col = vec![NONE; nc];
    let mut visited_rows = vec![false; nr];
    let mut visited_cols = vec![false; nc];
    let mut remaining = vec![0usize; nc];

    for cur_row in 0..nr {
        let mut min_val = 0.0;
        let mut i = cur_row;

        // Reversed so that ties prefer lower column indices.
        for (it, slot) in remaining.iter_mut().enumerate() {
            *slot = nc - it - 1;
        }
        let mut num_remaining = nc;

        visited_rows.iter_mut().for_each(|x| *x = false);
        visited_cols.iter_mut().for_each(|x| *x = false);
        shortest_path_costs.iter_mut().for_each(|x| *x = f64::INFINITY);

        // Dijkstra-like search for the shortest augmenting path from cur_row.
        let mut sink = NONE;
        while sink == NONE {
            let mut index = NONE;
            let mut lowest = f64::INFINITY;
            visited_rows[i] = true;

            for it in 0..num_remaining {
                let j = remaining[it];
                let r = min_val + cost[i * nc + j] - u[i] - v[j];
                if r < shortest_path_costs[j] {
                    path[j] = i;
                    shortest_path_costs[j] = r;
                }

                if shortest_path_costs[j] < lowest
                    || (shortest_path_costs[j] == lowest && row4col[j] == NONE)
                {
                    lowest = shortest_path_costs[j];
                    index = it;
                }
            }

            // Every cell is finite, so some column is always reachable.
            min_val = lowest;
            let j = remaining[index];
            if row4col[j] == NONE {
                sink = j;
            } else {
                i = row4col[j];
            }

            visited_cols[j] = true;
            num_remaining -= 1;
            remaining[index] = remaining[num_remaining];
        }

        // Update dual variables
        u[cur_row] += min_val;
        for r in 0..nr {
            if visited_rows[r] && r != cur_row {
                u[r] += min_val - shortest_path_costs[col4row[r]];
            }
        }
        for c in 0..nc {
            if visited_cols[c] {
                v[c] -= min_val - shortest_path_costs[c];
            }
        }

        // Augment along the path
        let mut j = sink;
        loop {
            let r = path[j];
            row4col[j] = r;
            std::mem::swap(&mut col4row[r], &mut j);
            if r == cur_row {
                break;
            }
        }
    }

    col4row
}
