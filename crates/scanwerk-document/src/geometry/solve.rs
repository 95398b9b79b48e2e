// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dense square linear solver: Gaussian elimination with partial pivoting.

use scanwerk_core::error::{Result, ScanError};

/// Pivots smaller than this fraction of the largest coefficient count as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `a * x = b` for a square `N x N` system.
///
/// At every step the remaining row with the largest magnitude in the pivot
/// column is swapped into place before eliminating below it, then the
/// solution is recovered by back-substitution. Fails with
/// [`ScanError::SingularSystem`] when no usable pivot exists.
pub fn solve_linear_system<const N: usize>(a: &[[f64; N]; N], b: &[f64; N]) -> Result<[f64; N]> {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(ScanError::SingularSystem);
    }
    let tolerance = scale * RELATIVE_PIVOT_TOLERANCE;

    let mut m = *a;
    let mut rhs = *b;

    for col in 0..N {
        let pivot_row = (col..N)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot_row][col].abs() <= tolerance {
            return Err(ScanError::SingularSystem);
        }
        m.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in col + 1..N {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..N {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = [0.0f64; N];
    for row in (0..N).rev() {
        let tail: f64 = (row + 1..N).map(|k| m[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / m[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(ScanError::SingularSystem);
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_system() {
        let a = [[2.0, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]];
        let b = [8.0, -11.0, -3.0];
        let x = solve_linear_system(&a, &b).unwrap();
        for (got, want) in x.iter().zip([2.0, 3.0, -1.0]) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
    }

    #[test]
    fn needs_pivoting_when_leading_entry_is_zero() {
        let a = [[0.0, 1.0], [1.0, 0.0]];
        let b = [5.0, 7.0];
        assert_eq!(solve_linear_system(&a, &b).unwrap(), [7.0, 5.0]);
    }

    #[test]
    fn mixed_magnitudes_stay_accurate() {
        let a = [[1e-3, 1500.0], [2000.0, 1.0]];
        let expected = [0.25, 4.0];
        let b = [
            a[0][0] * expected[0] + a[0][1] * expected[1],
            a[1][0] * expected[0] + a[1][1] * expected[1],
        ];
        let x = solve_linear_system(&a, &b).unwrap();
        assert!((x[0] - expected[0]).abs() < 1e-9);
        assert!((x[1] - expected[1]).abs() < 1e-9);
    }

    #[test]
    fn dependent_rows_are_singular() {
        let a = [[1.0, 2.0], [2.0, 4.0]];
        let b = [3.0, 6.0];
        assert!(matches!(
            solve_linear_system(&a, &b),
            Err(ScanError::SingularSystem)
        ));
    }

    #[test]
    fn zero_matrix_is_singular() {
        let a = [[0.0; 3]; 3];
        assert!(matches!(
            solve_linear_system(&a, &[1.0, 2.0, 3.0]),
            Err(ScanError::SingularSystem)
        ));
    }
}
