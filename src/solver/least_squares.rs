//! Dense least-squares solve for the pressure system.
//!
//! The flow-conservation matrix is rank deficient by construction (pressures
//! are only defined up to a global offset), so an LU solve would reject it.
//! The SVD pseudo-inverse returns the minimum-norm solution instead, which is
//! the exact solution whenever the matrix is regular.

use nalgebra::{DMatrix, DVector, SVD};

use crate::error::{PhysarumError, Result};

/// Solve `A x = b` in the least-squares sense.
///
/// Singular values below `max(sigma) * n * f64::EPSILON` are treated as zero.
/// Singular or rank-deficient `A` is not an error; only mismatched
/// dimensions, non-finite input and a non-converging decomposition are.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    if a.nrows() != a.ncols() {
        return Err(PhysarumError::DimensionMismatch {
            expected: a.nrows(),
            actual: a.ncols(),
        });
    }
    if a.nrows() != b.len() {
        return Err(PhysarumError::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }

    let n = a.nrows();
    if n == 0 {
        return Ok(DVector::zeros(0));
    }

    if !a.iter().chain(b.iter()).all(|v| v.is_finite()) {
        return Err(PhysarumError::numeric("system contains non-finite coefficients"));
    }

    let svd = SVD::try_new(a.clone(), true, true, f64::EPSILON, 0)
        .ok_or_else(|| PhysarumError::numeric("singular value decomposition did not converge"))?;

    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tolerance = sigma_max * n as f64 * f64::EPSILON;

    let x = svd.solve(b, tolerance).map_err(PhysarumError::numeric)?;

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(PhysarumError::numeric("solution contains non-finite values"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn test_solve_regular() {
        // 2x + y = 5
        // x + 3y = 6
        let a = dmatrix![2.0, 1.0; 1.0, 3.0];
        let b = dvector![5.0, 6.0];

        let x = solve_least_squares(&a, &b).unwrap();

        assert_relative_eq!(x[0], 1.8, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-10);
    }

    #[test]
    fn test_singular_gives_minimum_norm() {
        // Pure offset ambiguity: x0 - x1 = 1 (twice, with opposite signs)
        let a = dmatrix![1.0, -1.0; -1.0, 1.0];
        let b = dvector![1.0, -1.0];

        let x = solve_least_squares(&a, &b).unwrap();

        assert_relative_eq!(x[0] - x[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[0] + x[1], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_inconsistent_gives_best_fit() {
        let a = dmatrix![1.0, 2.0; 2.0, 4.0];
        let b = dvector![1.0, 0.0];

        let x = solve_least_squares(&a, &b).unwrap();
        let residual = &a * &x - &b;

        // Best fit of x0 + 2 x1 against 1 and 0/2 is 0.2
        assert_relative_eq!(x[0] + 2.0 * x[1], 0.2, epsilon = 1e-10);
        assert!(residual.norm() < 1.0);
    }

    #[test]
    fn test_zero_matrix() {
        let a = DMatrix::zeros(3, 3);
        let b = dvector![1.0, 0.0, -1.0];
        let x = solve_least_squares(&a, &b).unwrap();
        assert_eq!(x, DVector::zeros(3));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = dmatrix![1.0, 2.0; 3.0, 4.0];
        let b = dvector![1.0, 2.0, 3.0];
        let result = solve_least_squares(&a, &b);
        assert!(matches!(result, Err(PhysarumError::DimensionMismatch { .. })));

        let a = DMatrix::zeros(2, 3);
        let b = dvector![1.0, 2.0];
        let result = solve_least_squares(&a, &b);
        assert!(matches!(result, Err(PhysarumError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_non_finite_input() {
        let a = dmatrix![f64::NAN, 0.0; 0.0, 1.0];
        let b = dvector![1.0, 1.0];
        let result = solve_least_squares(&a, &b);
        assert!(matches!(result, Err(PhysarumError::NumericFailure { .. })));
    }
}
