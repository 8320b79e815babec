//! Ordinary least squares with intercept.
//!
//! Columns are centered and scaled to unit RMS, so the normal-equation
//! matrix is a correlation matrix with a unit diagonal. A Cholesky pivot
//! below `MIN_PIVOT` means the columns are (numerically) linearly dependent.
//! Constant columns carry nothing once the intercept is fitted; they are left
//! out of the solve and get a zero coefficient, as a minimum-norm least
//! squares solution would give them.

use super::linalg::{center, cholesky_solve, column_scales, scatter, varying_columns};
use super::{LinearModel, ModelError, ModelKind, Regressor};
use ndarray::{Array1, Array2, Axis};

const MIN_PIVOT: f64 = 1e-10;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ols;

impl Regressor for Ols {
    fn kind(&self) -> ModelKind {
        ModelKind::Ols
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel, ModelError> {
        let n = x.nrows();
        let kept = varying_columns(x);
        if n <= kept.len() {
            return Err(ModelError::Singular);
        }

        let c = center(&x.select(Axis(1), &kept), y);
        let scales = column_scales(&c.x);
        if scales.iter().any(|&s| !(s > 0.0) || !s.is_finite()) {
            return Err(ModelError::Singular);
        }
        let xs = &c.x / &scales;

        let gram = xs.t().dot(&xs) / n as f64;
        let rhs = xs.t().dot(&c.y) / n as f64;
        let gamma = cholesky_solve(&gram, &rhs, MIN_PIVOT).ok_or(ModelError::Singular)?;

        let fitted = gamma / &scales;
        let intercept = c.y_mean - c.x_mean.dot(&fitted);
        Ok(LinearModel {
            intercept,
            coefficients: scatter(&fitted, &kept, x.ncols()),
            iterations: None,
            converged: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3 + 2a - b
        let x = array![
            [0.0, 1.0],
            [1.0, 0.0],
            [2.0, 5.0],
            [3.0, 2.0],
            [4.0, 7.0],
            [5.0, 1.0],
        ];
        let y = x.column(0).mapv(|a| 2.0 * a) - &x.column(1) + 3.0;

        let model = Ols.fit(&x, &y).unwrap();
        assert!((model.intercept - 3.0).abs() < 1e-10);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-10);
        assert!((model.coefficients[1] + 1.0).abs() < 1e-10);
    }

    #[test]
    fn handles_wildly_different_scales() {
        let n = 40;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let t = i as f64;
            if j == 0 {
                1e6 + 1e4 * (t * 0.7).sin()
            } else {
                1e-4 * (t * 1.3).cos()
            }
        });
        let y = x.column(0).mapv(|v| v * 1e-6) + x.column(1).mapv(|v| v * 5e3);

        let model = Ols.fit(&x, &y).unwrap();
        assert!((model.coefficients[0] - 1e-6).abs() < 1e-12);
        assert!((model.coefficients[1] - 5e3).abs() < 1e-4);
    }

    #[test]
    fn duplicate_column_is_singular() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(Ols.fit(&x, &y), Err(ModelError::Singular));
    }

    #[test]
    fn constant_columns_get_zero_coefficient() {
        // y = 1 + 2a plus a little noise; 0.1 does not center to exactly zero.
        let n = 80;
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let y = Array1::from_shape_fn(n, |i| 1.0 + 2.0 * a[i] + 1e-3 * (i as f64 * 1.7).cos());
        for level in [0.0, 0.1, 1.0 / 3.0] {
            let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { a[i] } else { level });
            let model = Ols.fit(&x, &y).unwrap();
            assert_eq!(model.coefficients[1], 0.0, "level {level}");
            assert!((model.coefficients[0] - 2.0).abs() < 1e-2);
            assert!((model.intercept - 1.0).abs() < 1e-2);
        }
    }

    #[test]
    fn constant_column_does_not_mask_collinearity() {
        let x = array![
            [1.0, 2.0, 0.1],
            [2.0, 4.0, 0.1],
            [3.0, 6.0, 0.1],
            [4.0, 8.0, 0.1],
            [5.0, 10.0, 0.1],
        ];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(Ols.fit(&x, &y), Err(ModelError::Singular));
    }

    #[test]
    fn all_constant_columns_fit_the_mean() {
        let x = array![[1.0, 0.2], [1.0, 0.2], [1.0, 0.2]];
        let y = array![1.0, 2.0, 6.0];
        let model = Ols.fit(&x, &y).unwrap();
        assert_eq!(model.coefficients, array![0.0, 0.0]);
        assert!((model.intercept - 3.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_rows_is_singular() {
        let x = array![[1.0, 2.0], [3.0, 1.0]];
        let y = array![1.0, 2.0];
        assert_eq!(Ols.fit(&x, &y), Err(ModelError::Singular));
    }
}
