//! Gaussian elimination without pivoting, followed by back-substitution.

use crate::{
    error::{Result, SolveError},
    math::{Matrix, Vector},
    system::LinearSystem,
};
use rayon::prelude::*;

/// Pivots smaller than this in magnitude are rejected during back-substitution.
///
/// Elimination only rejects exact zeros.
pub const NEAR_ZERO_PIVOT: f64 = 1e-10;

/// Below this many rows under the pivot the parallel elimination runs the
/// step sequentially.
const PARALLEL_MIN_ROWS: usize = 64;

/// How the forward elimination sweeps the rows under each pivot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Elimination {
    #[default]
    Sequential,
    /// Rows under the pivot are updated on the rayon pool. Each row sees the
    /// same operations in the same order, so the result is bit-identical.
    Parallel,
}

#[inline]
fn eliminate_row(pivot_row: &[f64], b_pivot: f64, norm: usize, row: &mut [f64], b_row: &mut f64) {
    let multiplier = row[norm] / pivot_row[norm];
    for (dst, &src) in row[norm..].iter_mut().zip(&pivot_row[norm..]) {
        *dst -= src * multiplier;
    }
    *b_row -= b_pivot * multiplier;
}

fn eliminate_with(a: &mut Matrix, b: &mut Vector, elimination: Elimination) -> Result<()> {
    let n = b.len();
    debug_assert!(a.dimension() == n && a.is_square());

    for norm in 0..n.saturating_sub(1) {
        let (upper, lower) = a.rows.split_at_mut(norm + 1);
        let pivot_row = &upper[norm];
        if pivot_row[norm] == 0.0 {
            return Err(SolveError::SingularPivot { index: norm });
        }

        let (b_upper, b_lower) = b.split_at_mut(norm + 1);
        let b_pivot = b_upper[norm];

        if elimination == Elimination::Parallel && lower.len() >= PARALLEL_MIN_ROWS {
            lower
                .par_iter_mut()
                .zip(b_lower.par_iter_mut())
                .for_each(|(row, b_row)| eliminate_row(pivot_row, b_pivot, norm, row, b_row));
        } else {
            for (row, b_row) in lower.iter_mut().zip(b_lower.iter_mut()) {
                eliminate_row(pivot_row, b_pivot, norm, row, b_row);
            }
        }
    }
    Ok(())
}

/// Reduces `a` to upper-triangular form, applying the same row operations to `b`.
///
/// Entries under the diagonal are driven towards zero by subtraction and are
/// never assigned, so they may hold rounding residue afterwards. On error `a`
/// and `b` are left partially reduced.
pub fn eliminate(a: &mut Matrix, b: &mut Vector) -> Result<()> {
    eliminate_with(a, b, Elimination::Sequential)
}

/// Same as [`eliminate`] but updates the rows under each pivot in parallel.
pub fn eliminate_parallel(a: &mut Matrix, b: &mut Vector) -> Result<()> {
    eliminate_with(a, b, Elimination::Parallel)
}

/// Solves the upper-triangular system `a * x = b`, reading only the diagonal
/// and the entries above it.
pub fn back_substitute(a: &Matrix, b: &Vector) -> Result<Vector> {
    let n = b.len();
    let mut x = Vector::zero(n);
    for row in (0..n).rev() {
        let coeffs = &a.rows[row];
        let mut value = b[row];
        for (&coeff, &known) in coeffs[row + 1..].iter().zip(&x[row + 1..]) {
            value -= coeff * known;
        }

        let pivot = coeffs[row];
        if pivot.abs() < NEAR_ZERO_PIVOT {
            return Err(SolveError::NearSingularPivot {
                index: row,
                value: pivot,
            });
        }
        x[row] = value / pivot;
    }
    Ok(x)
}

/// Solves `system` sequentially, consuming it.
pub fn solve(system: LinearSystem) -> Result<Vector> {
    solve_with(system, Elimination::Sequential)
}

/// Solves `system` with the chosen elimination sweep, consuming it.
///
/// The triangularized matrix is dropped on return; clone the system first if
/// the original coefficients are still needed.
pub fn solve_with(system: LinearSystem, elimination: Elimination) -> Result<Vector> {
    let LinearSystem { mut a, mut b } = system;
    let n = b.len();

    log::debug!("eliminating {}x{} system ({:?})", n, n, elimination);
    eliminate_with(&mut a, &mut b, elimination)?;

    log::debug!("back-substituting {} rows", n);
    let x = back_substitute(&a, &b)?;

    log::info!("solved {}x{} system", n, n);
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn system<const N: usize>(a: &[[f64; N]; N], b: [f64; N]) -> LinearSystem {
        LinearSystem::new(Matrix::from(a), Vector::from(b.to_vec()))
    }

    #[test]
    fn test_known_3x3_system() {
        // 2x +  y +  z = 5
        // 4x - 6y      = -2
        // -2x + 7y + 2z = 9
        let s = system(&[[2., 1., 1.], [4., -6., 0.], [-2., 7., 2.]], [5., -2., 9.]);
        let x = solve(s).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_equation_is_exact_quotient() {
        let s = system(&[[0.37]], [0.91]);
        let x = solve(s).unwrap();
        assert_eq!(x[0], 0.91 / 0.37);
    }

    #[test]
    fn test_zero_pivot_fails_in_elimination() {
        let mut a = Matrix::from(&[[0., 1.], [1., 1.]]);
        let mut b = Vector::from(vec![1., 2.]);
        let err = eliminate(&mut a, &mut b).unwrap_err();
        assert_eq!(err, SolveError::SingularPivot { index: 0 });
        // nothing was touched before the pivot check
        assert_eq!(a, Matrix::from(&[[0., 1.], [1., 1.]]));

        let err = solve(system(&[[0., 1.], [1., 1.]], [1., 2.])).unwrap_err();
        assert!(err.is_singular_pivot());
    }

    #[test]
    fn test_zero_pivot_after_first_step() {
        // the second pivot becomes exactly 2 - 1 * 2 = 0
        let LinearSystem { mut a, mut b } =
            system(&[[1., 2., 0.], [1., 2., 1.], [0., 1., 1.]], [1., 1., 1.]);
        let err = eliminate(&mut a, &mut b).unwrap_err();
        assert_eq!(err, SolveError::SingularPivot { index: 1 });
    }

    #[test]
    fn test_near_zero_pivot_fails_in_back_substitution() {
        let mut a = Matrix::from(&[[1., 0.], [0., 1e-11]]);
        let mut b = Vector::from(vec![1., 1.]);
        eliminate(&mut a, &mut b).unwrap();
        let err = back_substitute(&a, &b).unwrap_err();
        assert_eq!(
            err,
            SolveError::NearSingularPivot {
                index: 1,
                value: 1e-11
            }
        );

        let err = solve(system(&[[1., 0.], [0., 1e-11]], [1., 1.])).unwrap_err();
        assert!(err.is_near_singular_pivot());
    }

    #[test]
    fn test_tiny_pivot_passes_elimination() {
        // elimination only checks exact zero
        let mut a = Matrix::from(&[[1e-12, 1.], [1., 1.]]);
        let mut b = Vector::from(vec![1., 2.]);
        assert!(eliminate(&mut a, &mut b).is_ok());
        let err = back_substitute(&a, &b).unwrap_err();
        assert_eq!(err.pivot_index(), 0);
    }

    #[test]
    fn test_pivot_at_tolerance_is_accepted() {
        let a = Matrix::from(&[[NEAR_ZERO_PIVOT]]);
        let b = Vector::from(vec![NEAR_ZERO_PIVOT]);
        let x = back_substitute(&a, &b).unwrap();
        assert_eq!(x[0], 1.0);
    }

    #[test]
    fn test_elimination_is_destructive() {
        let s = system(&[[2., 1., 1.], [4., -6., 0.], [-2., 7., 2.]], [5., -2., 9.]);
        let original = s.clone();
        let LinearSystem { mut a, mut b } = s;
        eliminate(&mut a, &mut b).unwrap();

        assert_ne!(a, original.a);
        assert_ne!(b, original.b);
        for row in 1..3 {
            for col in 0..row {
                assert_abs_diff_eq!(a.get(row, col), 0.0, epsilon = 1e-12);
            }
        }
        // pivot rows are never modified
        assert_eq!(a.rows[0], original.a.rows[0]);
        assert_eq!(b[0], original.b[0]);
    }

    #[test]
    fn test_back_substitution_ignores_lower_triangle() {
        let a = Matrix::from(&[[2., 1.], [123., 4.]]);
        let b = Vector::from(vec![4., 8.]);
        let x = back_substitute(&a, &b).unwrap();
        assert_eq!(x, Vector::from(vec![1., 2.]));
    }

    #[test]
    fn test_random_systems_have_small_residual() {
        for seed in 0..8 {
            let s = LinearSystem::random(8, seed);
            let original = s.clone();
            let x = solve(s).unwrap();
            assert!(original.max_residual(&x) <= 1e-6, "seed {}", seed);
        }
    }

    #[test]
    fn test_dominant_system_residual_200() {
        let mut s = LinearSystem::random(200, 42);
        for i in 0..200 {
            s.a.rows[i][i] += 200.0;
        }
        let original = s.clone();
        let x = solve(s).unwrap();
        assert!(original.max_residual(&x) <= 1e-6);
    }

    #[test]
    fn test_seed_42_solution() {
        // captured once from a reference run
        let x = solve(LinearSystem::random(3, 42)).unwrap();
        assert_eq!(
            &x[..],
            &[-2.8282227796505905, 1.442899898841495, 0.8759838382062594][..]
        );
    }

    #[test]
    #[ignore = "solves a 2000x2000 system"]
    fn test_largest_dimension() {
        let n = 2000;
        let mut s = LinearSystem::random(n, 2000);
        for i in 0..n {
            s.a.rows[i][i] += n as f64;
        }
        let original = s.clone();
        let x = solve(s).unwrap();
        assert_eq!(x.len(), n);
        assert!(original.max_residual(&x) <= 1e-6);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let x0 = solve(LinearSystem::random(30, 7)).unwrap();
        let x1 = solve(LinearSystem::random(30, 7)).unwrap();
        let bits = |x: &Vector| x.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&x0), bits(&x1));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let s = LinearSystem::random(150, 3);
        let x_seq = solve_with(s.clone(), Elimination::Sequential).unwrap();
        let x_par = solve_with(s.clone(), Elimination::Parallel).unwrap();
        assert_eq!(x_seq, x_par);

        let (mut a0, mut b0) = (s.a.clone(), s.b.clone());
        let (mut a1, mut b1) = (s.a, s.b);
        eliminate(&mut a0, &mut b0).unwrap();
        eliminate_parallel(&mut a1, &mut b1).unwrap();
        assert_eq!(a0, a1);
        assert_eq!(b0, b1);
    }

    #[test]
    fn test_parallel_reports_zero_pivot() {
        let mut s = LinearSystem::random(100, 11);
        s.a.rows[0][0] = 0.0;
        let err = solve_with(s, Elimination::Parallel).unwrap_err();
        assert_eq!(err, SolveError::SingularPivot { index: 0 });
    }
}
