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

use serde::{Deserialize, Serialize};

use crate::features::{Features, FEATURE_NAMES};

/// A fitted linear regressor over the substitution features.
///
/// This is the payload of the persisted model artifact; the serde shape is
/// the wire format the trainer publishes and the model cache consumes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LinearModel {
    coefficients: Vec<f32>,
    intercept: f32,
    feature_names: Vec<String>,
}

impl LinearModel {
    /// Creates a model over the default feature set.
    pub fn new(coefficients: Vec<f32>, intercept: f32) -> Self {
        Self {
            coefficients,
            intercept,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predicts the substitution-quality score for the features.
    ///
    /// The prediction is intentionally not clamped; a poorly fit regressor may
    /// return scores outside of `[0, 100]`.
    pub fn predict(&self, features: Features) -> f32 {
        self.predict_iter(&features.to_array())
    }

    pub(crate) fn predict_iter<'a>(&self, row: impl IntoIterator<Item = &'a f32>) -> f32 {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(coefficient, feature)| coefficient * feature)
            .sum::<f32>()
            + self.intercept
    }
}
