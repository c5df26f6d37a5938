// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Ordinary least squares over the substitution features.
//!
//! The fit solves the normal equations with a tiny ridge term on the diagonal,
//! which keeps the solve well-defined even for collinear feature columns.

use displaydoc::Display;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use thiserror::Error;

use crate::model::LinearModel;

/// Stabilizes the normal equations; negligible wrt the fitted coefficients.
const RIDGE: f32 = 1e-6;

/// Errors of the regression fit.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum FitError {
    /// The feature matrix has no rows
    NoSamples,
    /// The feature matrix has {rows} rows but the label vector has {labels} entries
    ShapeMismatch { rows: usize, labels: usize },
    /// The normal equations are singular
    Singular,
}

/// Fits a linear regressor with intercept to the feature matrix and labels.
pub fn fit(x: ArrayView2<'_, f32>, y: ArrayView1<'_, f32>) -> Result<LinearModel, FitError> {
    let samples = x.nrows();
    if samples == 0 {
        return Err(FitError::NoSamples);
    }
    if samples != y.len() {
        return Err(FitError::ShapeMismatch {
            rows: samples,
            labels: y.len(),
        });
    }

    // design matrix with a leading ones column for the intercept
    let terms = x.ncols() + 1;
    let mut design = Array2::ones((samples, terms));
    design.slice_mut(s![.., 1..]).assign(&x);

    let mut normal = design.t().dot(&design);
    for i in 0..terms {
        normal[[i, i]] += RIDGE;
    }
    let rhs = design.t().dot(&y);

    let solution = solve(normal, rhs).ok_or(FitError::Singular)?;
    let intercept = solution[0];
    let coefficients = solution.slice(s![1..]).to_vec();

    Ok(LinearModel::new(coefficients, intercept))
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f32>, mut b: Array1<f32>) -> Option<Array1<f32>> {
    let n = a.nrows();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[[i, col]]
                .abs()
                .partial_cmp(&a[[j, col]].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[[pivot, col]].abs() <= f32::EPSILON {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum::<f32>();
        x[row] = (b[row] - tail) / a[[row, row]];
    }

    Some(x)
}

/// Holdout metrics of a fitted model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub mse: f32,
    pub r2: f32,
}

/// Evaluates the model on the given features and labels.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(model: &LinearModel, x: ArrayView2<'_, f32>, y: ArrayView1<'_, f32>) -> Evaluation {
    let residual = x
        .rows()
        .into_iter()
        .zip(&y)
        .map(|(row, &label)| (model.predict_iter(row.iter()) - label).powi(2))
        .sum::<f32>();
    let mse = residual / y.len().max(1) as f32;

    let mean = y.mean().unwrap_or(0.);
    let total = y.iter().map(|&label| (label - mean).powi(2)).sum::<f32>();
    let r2 = if total > f32::EPSILON {
        1. - residual / total
    } else if residual <= f32::EPSILON {
        1.
    } else {
        0.
    };

    Evaluation { mse, r2 }
}

/// Splits `0..len` into shuffled (train, test) index sets.
///
/// The split is reproducible for a fixed seed. The test set gets
/// `ceil(len * test_fraction)` entries, bounded such that both sets stay
/// non-empty for `len >= 2`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn holdout_split(len: usize, test_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices = (0..len).collect::<Vec<_>>();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let test_len = ((len as f32 * test_fraction).ceil() as usize)
        .max(usize::from(len >= 2))
        .min(len.saturating_sub(1));
    let train = indices.split_off(test_len);

    (train, indices)
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};
    use xayn_swap_test_utils::{assert_approx_eq, assert_approx_eq_all};

    use super::*;

    #[test]
    fn test_fit_recovers_exact_linear_relation() {
        let x = arr2(&[
            [1., 0., 2., 0.5],
            [2., 1., 0., 0.25],
            [0., 3., 1., 0.75],
            [4., 2., 2., 1.],
            [3., 0., 0., 0.],
            [1., 1., 1., 0.5],
        ]);
        // y = 10 + 2*x0 - 3*x1 + 0.5*x2 + 4*x3
        let y = x
            .rows()
            .into_iter()
            .map(|row| 10. + 2. * row[0] - 3. * row[1] + 0.5 * row[2] + 4. * row[3])
            .collect::<Array1<f32>>();

        let model = fit(x.view(), y.view()).unwrap();
        assert_approx_eq!(f32, model.intercept(), 10., epsilon = 1e-2);
        assert_approx_eq_all!(
            f32,
            model.coefficients().iter().copied(),
            [2., -3., 0.5, 4.],
            epsilon = 1e-2,
        );
    }

    #[test]
    fn test_fit_rejects_empty_and_mismatched_inputs() {
        let empty = Array2::<f32>::zeros((0, 4));
        assert!(matches!(
            fit(empty.view(), arr1(&[]).view()),
            Err(FitError::NoSamples),
        ));

        let x = arr2(&[[1., 2., 3., 4.]]);
        assert!(matches!(
            fit(x.view(), arr1(&[1., 2.]).view()),
            Err(FitError::ShapeMismatch { rows: 1, labels: 2 }),
        ));
    }

    #[test]
    fn test_evaluate_perfect_fit() {
        let x = arr2(&[[1., 0.], [0., 1.], [1., 1.]]);
        let model = LinearModel::new(vec![2., 3.], 1.);
        let y = arr1(&[3., 4., 6.]);

        let evaluation = evaluate(&model, x.view(), y.view());
        assert_approx_eq!(f32, evaluation.mse, 0., epsilon = 1e-6);
        assert_approx_eq!(f32, evaluation.r2, 1., epsilon = 1e-6);
    }

    #[test]
    fn test_evaluate_constant_labels() {
        let x = arr2(&[[1.], [2.]]);
        let model = LinearModel::new(vec![1.], 0.);
        let y = arr1(&[5., 5.]);

        let evaluation = evaluate(&model, x.view(), y.view());
        assert!(evaluation.mse > 0.);
        assert_approx_eq!(f32, evaluation.r2, 0.);
    }

    #[test]
    fn test_holdout_split_is_reproducible_and_complete() {
        let (train, test) = holdout_split(10, 0.2, 42);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        let (train_again, test_again) = holdout_split(10, 0.2, 42);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);

        let mut all = train.iter().chain(&test).copied().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_holdout_split_keeps_both_sets_non_empty() {
        let (train, test) = holdout_split(2, 0.2, 7);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);

        let (train, test) = holdout_split(5, 0.99, 7);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 4);
    }
}
