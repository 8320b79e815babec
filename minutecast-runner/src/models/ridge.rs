//! Ridge regression: closed form on centered data.
//!
//! `(Xcᵀ Xc + αI) β = Xcᵀ yc`, intercept recovered from the means. The system
//! is symmetrically rescaled to a unit diagonal before the Cholesky solve,
//! which leaves the solution unchanged. Constant columns are left out and
//! get a zero coefficient for every `α`. With `α = 0` this is plain OLS and
//! collinearity among the remaining columns is reported as singular.

use super::linalg::{center, cholesky_solve, scatter, varying_columns};
use super::{LinearModel, ModelError, ModelKind, Regressor};
use ndarray::{Array1, Array2, Axis};

const MIN_PIVOT: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
pub struct Ridge {
    alpha: f64,
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl Regressor for Ridge {
    fn kind(&self) -> ModelKind {
        ModelKind::Ridge
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel, ModelError> {
        let kept = varying_columns(x);
        let p = kept.len();
        let c = center(&x.select(Axis(1), &kept), y);

        let mut gram = c.x.t().dot(&c.x);
        for j in 0..p {
            gram[[j, j]] += self.alpha;
        }
        let rhs = c.x.t().dot(&c.y);

        let d = gram.diag().mapv(f64::sqrt);
        if d.iter().any(|&v| !(v > 0.0) || !v.is_finite()) {
            return Err(ModelError::Singular);
        }
        let scaled = Array2::from_shape_fn((p, p), |(i, j)| gram[[i, j]] / (d[i] * d[j]));
        let gamma =
            cholesky_solve(&scaled, &(&rhs / &d), MIN_PIVOT).ok_or(ModelError::Singular)?;
        let fitted = gamma / &d;

        let intercept = c.y_mean - c.x_mean.dot(&fitted);
        Ok(LinearModel {
            intercept,
            coefficients: scatter(&fitted, &kept, x.ncols()),
            iterations: None,
            converged: true,
        })
    }
}
