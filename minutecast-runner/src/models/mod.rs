//! Linear-family regressors: OLS, Ridge, Lasso and ElasticNet.
//!
//! All models fit an unpenalised intercept by centering the design matrix.
//! Objectives follow the scikit-learn conventions:
//! - OLS: `||y - Xβ||²`
//! - Ridge: `||y - Xβ||² + α||β||²`
//! - ElasticNet: `(1/2n)||y - Xβ||² + αρ||β||₁ + α(1-ρ)/2·||β||²`
//! - Lasso: ElasticNet with ρ = 1

pub mod elastic_net;
pub mod linalg;
pub mod ols;
pub mod ridge;

pub use elastic_net::ElasticNet;
pub use ols::Ols;
pub use ridge::Ridge;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which regressor to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Ols,
    Lasso,
    Ridge,
    ElasticNet,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Ols,
        ModelKind::Lasso,
        ModelKind::Ridge,
        ModelKind::ElasticNet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Ols => "ols",
            ModelKind::Lasso => "lasso",
            ModelKind::Ridge => "ridge",
            ModelKind::ElasticNet => "elastic_net",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = UnknownModelKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ols" | "linear" | "linear_regression" => Ok(ModelKind::Ols),
            "lasso" => Ok(ModelKind::Lasso),
            "ridge" => Ok(ModelKind::Ridge),
            "elasticnet" | "elastic_net" | "elastic-net" => Ok(ModelKind::ElasticNet),
            _ => Err(UnknownModelKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown model kind '{0}' (expected ols, lasso, ridge or elasticnet)")]
pub struct UnknownModelKind(pub String);

/// Regularisation hyperparameters. Ignored where a model has no use for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Penalty strength (Ridge, Lasso, ElasticNet).
    pub alpha: f64,
    /// L1 share of the ElasticNet penalty, in [0, 1].
    pub l1_ratio: f64,
    /// Coordinate-descent sweep limit.
    pub max_iter: usize,
    /// Coordinate-descent stopping tolerance on the largest coefficient update.
    pub tolerance: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_ratio: 0.5,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }
}

/// A fitted linear predictor: `ŷ = intercept + X·β`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
    /// Coordinate-descent sweeps used, `None` for closed-form fits.
    pub iterations: Option<usize>,
    pub converged: bool,
}

impl LinearModel {
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }

    pub fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("design matrix is rank deficient")]
    Singular,

    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// A regressor that fits a [`LinearModel`] to a design matrix and target.
pub trait Regressor: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// `x` is rows × features, `y` has one entry per row. At least one row.
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel, ModelError>;
}

/// Model kind plus hyperparameters, resolved into a regressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub params: ModelParams,
}

impl ModelSpec {
    pub fn new(kind: ModelKind, params: ModelParams) -> Self {
        Self { kind, params }
    }

    /// Validate the parameters this kind uses and build the regressor.
    pub fn build(&self) -> Result<Box<dyn Regressor>, ModelError> {
        let p = &self.params;
        let check = |name: &'static str, value: f64, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(ModelError::InvalidParameter { name, value })
            }
        };

        match self.kind {
            ModelKind::Ols => Ok(Box::new(Ols)),
            ModelKind::Ridge => {
                check("alpha", p.alpha, p.alpha.is_finite() && p.alpha >= 0.0)?;
                Ok(Box::new(Ridge::new(p.alpha)))
            }
            ModelKind::Lasso | ModelKind::ElasticNet => {
                check("alpha", p.alpha, p.alpha.is_finite() && p.alpha >= 0.0)?;
                check("max_iter", p.max_iter as f64, p.max_iter >= 1)?;
                check(
                    "tolerance",
                    p.tolerance,
                    p.tolerance.is_finite() && p.tolerance > 0.0,
                )?;
                if self.kind == ModelKind::Lasso {
                    return Ok(Box::new(ElasticNet::lasso(p.alpha, p.max_iter, p.tolerance)));
                }
                check(
                    "l1_ratio",
                    p.l1_ratio,
                    (0.0..=1.0).contains(&p.l1_ratio),
                )?;
                Ok(Box::new(ElasticNet::new(
                    p.alpha,
                    p.l1_ratio,
                    p.max_iter,
                    p.tolerance,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn parses_kind_aliases() {
        assert_eq!("ols".parse::<ModelKind>().unwrap(), ModelKind::Ols);
        assert_eq!("Linear".parse::<ModelKind>().unwrap(), ModelKind::Ols);
        assert_eq!("lasso".parse::<ModelKind>().unwrap(), ModelKind::Lasso);
        assert_eq!("ridge".parse::<ModelKind>().unwrap(), ModelKind::Ridge);
        assert_eq!("elasticnet".parse::<ModelKind>().unwrap(), ModelKind::ElasticNet);
        assert_eq!("elastic_net".parse::<ModelKind>().unwrap(), ModelKind::ElasticNet);
        assert_eq!(
            "forest".parse::<ModelKind>(),
            Err(UnknownModelKind("forest".into()))
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.to_string().parse::<ModelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        let bad_alpha = ModelParams {
            alpha: -1.0,
            ..ModelParams::default()
        };
        assert!(matches!(
            ModelSpec::new(ModelKind::Ridge, bad_alpha).build(),
            Err(ModelError::InvalidParameter { name: "alpha", .. })
        ));

        let bad_ratio = ModelParams {
            l1_ratio: 1.5,
            ..ModelParams::default()
        };
        assert!(matches!(
            ModelSpec::new(ModelKind::ElasticNet, bad_ratio).build(),
            Err(ModelError::InvalidParameter { name: "l1_ratio", .. })
        ));
        // Lasso ignores l1_ratio, OLS ignores everything.
        assert!(ModelSpec::new(ModelKind::Lasso, bad_ratio).build().is_ok());
        assert!(ModelSpec::new(ModelKind::Ols, bad_alpha).build().is_ok());
    }

    #[test]
    fn linear_model_predicts() {
        let model = LinearModel {
            intercept: 1.0,
            coefficients: array![2.0, -1.0],
            iterations: None,
            converged: true,
        };
        let x = array![[1.0, 1.0], [0.0, 3.0]];
        assert_eq!(model.predict(&x), array![2.0, -2.0]);
    }

    #[test]
    fn params_defaults() {
        let p: ModelParams = serde_json::from_str(r#"{"alpha": 0.01}"#).unwrap();
        assert_eq!(p.alpha, 0.01);
        assert_eq!(p.l1_ratio, 0.5);
        assert_eq!(p.max_iter, 1000);
        assert_eq!(p.tolerance, 1e-4);
    }
}
