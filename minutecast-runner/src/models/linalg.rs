//! Dense helpers for the linear models: centering and Cholesky solves.

use ndarray::{Array1, Array2, Axis};

/// Design matrix and target with column means removed.
#[derive(Debug, Clone)]
pub struct Centered {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub x_mean: Array1<f64>,
    pub y_mean: f64,
}

/// Subtract column means from `x` and the mean from `y`.
///
/// Callers guarantee at least one row.
pub fn center(x: &Array2<f64>, y: &Array1<f64>) -> Centered {
    let n = x.nrows().max(1) as f64;
    let x_mean = x.sum_axis(Axis(0)) / n;
    let y_mean = y.sum() / n;
    Centered {
        x: x - &x_mean,
        y: y - y_mean,
        x_mean,
        y_mean,
    }
}

/// Indices of the columns that take more than one value.
///
/// Compared on the raw values, before centering, so a constant column is
/// recognised whatever its level.
pub fn varying_columns(x: &Array2<f64>) -> Vec<usize> {
    x.columns()
        .into_iter()
        .enumerate()
        .filter(|(_, col)| {
            col.first()
                .is_some_and(|&first| col.iter().any(|&v| v != first))
        })
        .map(|(j, _)| j)
        .collect()
}

/// Widen coefficients fitted on the `kept` columns back to `width`, with
/// zeros everywhere else.
pub fn scatter(coefficients: &Array1<f64>, kept: &[usize], width: usize) -> Array1<f64> {
    let mut full = Array1::<f64>::zeros(width);
    for (&j, &c) in kept.iter().zip(coefficients.iter()) {
        full[j] = c;
    }
    full
}

/// Root mean square of each (already centered) column.
pub fn column_scales(x: &Array2<f64>) -> Array1<f64> {
    let n = x.nrows().max(1) as f64;
    x.map_axis(Axis(0), |col| (col.dot(&col) / n).sqrt())
}

/// Solve `a · x = b` for symmetric positive definite `a`.
///
/// Returns `None` when a pivot falls to `min_pivot` or below, or is not finite.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>, min_pivot: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    // A = L Lᵀ
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let pivot = a[[i, i]] - sum;
                if !pivot.is_finite() || pivot <= min_pivot {
                    return None;
                }
                l[[i, i]] = pivot.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}
