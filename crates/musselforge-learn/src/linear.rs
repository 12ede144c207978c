//! Ordinary least squares with an intercept.


use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{LearnError, Result};
use crate::Regressor;

const RIDGE: f64 = 1e-8;
const PIVOT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Solves the normal equations. A tiny ridge term keeps collinear
    /// one-hot columns solvable.
    pub fn fit(data: &Dataset) -> Result<Self> {
        if data.is_empty() {
            return Err(LearnError::EmptyDataset);
        }
        let p = data.n_features() + 1;
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, &y) in data.features().iter().zip(data.targets()) {
            let x: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for i in 0..p {
                xty[i] += x[i] * y;
                for j in 0..p {
                    xtx[i][j] += x[i] * x[j];
                }
            }
        }
        for (i, row) in xtx.iter_mut().enumerate().skip(1) {
            row[i] += RIDGE;
        }
        let beta = solve(xtx, xty)?;
        Ok(Self {
            intercept: beta[0],
            coefficients: beta[1..].to_vec(),
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn predict_row(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}

impl Regressor for LinearRegression {
    fn predict_row(&self, x: &[f64]) -> f64 {
        LinearRegression::predict_row(self, x)
    }
}

// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(LearnError::SingularSystem)?;
        if a[pivot][col].abs() < PIVOT_EPS {
            return Err(LearnError::SingularSystem);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
