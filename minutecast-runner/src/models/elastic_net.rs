//! ElasticNet and Lasso by cyclic coordinate descent.
//!
//! Minimises `(1/2n)||y - Xw||² + αρ||w||₁ + α(1-ρ)/2·||w||²` over centered
//! data. Each sweep updates one coefficient at a time against the running
//! residual:
//!
//! ```text
//! w_j ← S(x_jᵀ(r + x_j w_j), nαρ) / (x_jᵀx_j + nα(1-ρ))
//! ```
//!
//! where `S` is the soft-threshold operator. A sweep whose largest update is
//! at most `tolerance · max|w|` ends the descent. Constant columns are left
//! out and keep a zero weight.

use super::linalg::{center, scatter, varying_columns};
use super::{LinearModel, ModelError, ModelKind, Regressor};
use ndarray::{Array1, Array2, Axis, Zip};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct ElasticNet {
    alpha: f64,
    l1_ratio: f64,
    max_iter: usize,
    tolerance: f64,
}

impl ElasticNet {
    pub fn new(alpha: f64, l1_ratio: f64, max_iter: usize, tolerance: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            max_iter,
            tolerance,
        }
    }

    /// Pure L1 penalty.
    pub fn lasso(alpha: f64, max_iter: usize, tolerance: f64) -> Self {
        Self::new(alpha, 1.0, max_iter, tolerance)
    }

    fn is_lasso(&self) -> bool {
        self.l1_ratio == 1.0
    }
}

pub(crate) fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

impl Regressor for ElasticNet {
    fn kind(&self) -> ModelKind {
        if self.is_lasso() {
            ModelKind::Lasso
        } else {
            ModelKind::ElasticNet
        }
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel, ModelError> {
        let n = x.nrows() as f64;
        let kept = varying_columns(x);
        let p = kept.len();
        let c = center(&x.select(Axis(1), &kept), y);

        let l1 = n * self.alpha * self.l1_ratio;
        let l2 = n * self.alpha * (1.0 - self.l1_ratio);
        let col_sq: Vec<f64> = c.x.columns().into_iter().map(|col| col.dot(&col)).collect();

        let mut w = Array1::<f64>::zeros(p);
        let mut residual = c.y.clone();
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;
            let mut max_delta = 0.0_f64;
            let mut max_w = 0.0_f64;

            for j in 0..p {
                let col = c.x.column(j);
                let old = w[j];
                let denom = col_sq[j] + l2;
                let new = if denom > 0.0 {
                    let rho = col.dot(&residual) + col_sq[j] * old;
                    soft_threshold(rho, l1) / denom
                } else {
                    0.0
                };

                let delta = new - old;
                if delta != 0.0 {
                    Zip::from(&mut residual)
                        .and(&col)
                        .for_each(|r, &xj| *r -= xj * delta);
                    w[j] = new;
                }
                max_delta = max_delta.max(delta.abs());
                max_w = max_w.max(new.abs());
            }

            if !max_delta.is_finite() {
                return Err(ModelError::Singular);
            }
            if max_delta <= self.tolerance * max_w || max_delta == 0.0 {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                model = %self.kind(),
                alpha = self.alpha,
                l1_ratio = self.l1_ratio,
                iterations,
                "coordinate descent did not converge"
            );
        }

        let intercept = c.y_mean - c.x_mean.dot(&w);
        Ok(LinearModel {
            intercept,
            coefficients: scatter(&w, &kept, x.ncols()),
            iterations: Some(iterations),
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ols;
    use ndarray::array;

    fn design() -> (Array2<f64>, Array1<f64>) {
        let n = 60;
        let x = Array2::from_shape_fn((n, 3), |(i, j)| {
            let t = i as f64;
            match j {
                0 => (t * 0.37).sin(),
                1 => (t * 0.91).cos(),
                _ => 0.1 * (t * 2.3).cos(),
            }
        });
        // Third column carries no signal and little variance.
        let y = x.column(0).mapv(|v| 3.0 * v) - x.column(1).mapv(|v| 0.5 * v) + 1.0;
        (x, y)
    }

    #[test]
    fn soft_threshold_shape() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(-1.0, 1.0), 0.0);
    }

    #[test]
    fn tiny_penalty_approaches_ols() {
        let (x, y) = design();
        let enet = ElasticNet::new(1e-8, 0.5, 10_000, 1e-10).fit(&x, &y).unwrap();
        let ols = Ols.fit(&x, &y).unwrap();
        assert!(enet.converged);
        for (e, o) in enet.coefficients.iter().zip(ols.coefficients.iter()) {
            assert!((e - o).abs() < 1e-5, "{e} vs {o}");
        }
        assert!((enet.intercept - ols.intercept).abs() < 1e-5);
    }

    #[test]
    fn large_lasso_penalty_zeroes_everything() {
        let (x, y) = design();
        let model = ElasticNet::lasso(100.0, 1000, 1e-4).fit(&x, &y).unwrap();
        assert!(model.coefficients.iter().all(|&c| c == 0.0));
        // Intercept falls back to the target mean.
        let mean = y.sum() / y.len() as f64;
        assert!((model.intercept - mean).abs() < 1e-12);
        assert_eq!(model.iterations, Some(1));
        assert!(model.converged);
    }

    #[test]
    fn moderate_lasso_drops_noise_column() {
        let (x, y) = design();
        let model = ElasticNet::lasso(0.05, 5000, 1e-8).fit(&x, &y).unwrap();
        assert!(model.coefficients[0] > 1.0);
        assert!(model.coefficients[1] < 0.0);
        assert_eq!(model.coefficients[2], 0.0);
    }

    #[test]
    fn kind_follows_l1_ratio() {
        assert_eq!(ElasticNet::lasso(1.0, 10, 1e-4).kind(), ModelKind::Lasso);
        assert_eq!(ElasticNet::new(1.0, 0.3, 10, 1e-4).kind(), ModelKind::ElasticNet);
    }

    #[test]
    fn zero_column_stays_zero() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        let model = ElasticNet::lasso(0.01, 1000, 1e-8).fit(&x, &y).unwrap();
        assert_eq!(model.coefficients[1], 0.0);
        assert!(model.coefficients[0] > 0.9);
    }

    #[test]
    fn unpenalised_constant_column_stays_zero() {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| {
            if j == 0 {
                (i as f64 * 0.37).sin()
            } else {
                0.1
            }
        });
        let y = x.column(0).mapv(|v| 2.0 * v + 0.5);
        let model = ElasticNet::lasso(0.0, 1000, 1e-10).fit(&x, &y).unwrap();
        assert_eq!(model.coefficients[1], 0.0);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((model.intercept - 0.5).abs() < 1e-6);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let (x, y) = design();
        let model = ElasticNet::new(1e-6, 0.5, 1, 1e-12).fit(&x, &y).unwrap();
        assert_eq!(model.iterations, Some(1));
        assert!(!model.converged);
    }
}
