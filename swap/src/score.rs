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

use std::sync::Arc;

use crate::{config::Config, features::Features, model::LinearModel};

/// How a substitution-quality score is produced for one request.
///
/// The variant is selected once per request from the model cache state, so the
/// prediction path stays branch-free afterwards.
#[derive(Clone, Debug)]
pub enum ScoreStrategy {
    /// Predict with the currently active regressor.
    Learned(Arc<LinearModel>),
    /// Deterministic fallback for when no model has ever been trained.
    RuleBased,
}

impl ScoreStrategy {
    /// Scores a candidate substitution.
    ///
    /// The learned path returns the raw prediction. The rule-based path scores
    /// price and rating closeness equally on a `[0, 100]` scale and ignores
    /// the similarity and rating-presence features.
    pub fn score(&self, features: Features, config: &Config) -> f32 {
        match self {
            Self::Learned(model) => model.predict(features),
            Self::RuleBased => {
                let price_score = (1. - features.price_diff / config.price_tolerance()).max(0.);
                let rating_score = (1. - features.rating_diff / config.rating_tolerance()).max(0.);
                50. * price_score + 50. * rating_score
            }
        }
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, Self::Learned(_))
    }
}

/// Rounds a score to two decimal places for presentation.
pub fn round_score(score: f32) -> f32 {
    (score * 100.).round() / 100.
}

#[cfg(test)]
mod tests {
    use xayn_swap_test_utils::assert_approx_eq;

    use super::*;

    fn features(price_diff: f32, rating_diff: f32) -> Features {
        Features {
            price_diff,
            rating_diff,
            has_rating: 1.,
            similarity: 0.9,
        }
    }

    #[test]
    fn test_rule_based_identical_pair_scores_full() {
        let score = ScoreStrategy::RuleBased.score(features(0., 0.), &Config::default());
        assert_approx_eq!(f32, score, 100.);
    }

    #[test]
    fn test_rule_based_price_term_saturates() {
        // price diff of 10 exhausts the price term, ratings are equal
        let score = ScoreStrategy::RuleBased.score(features(10., 0.), &Config::default());
        assert_approx_eq!(f32, score, 50.);
    }

    #[test]
    fn test_rule_based_ignores_similarity() {
        let config = Config::default();
        let mut low_similarity = features(1., 1.);
        low_similarity.similarity = 0.;
        let mut high_similarity = features(1., 1.);
        high_similarity.similarity = 1.;

        assert_approx_eq!(
            f32,
            ScoreStrategy::RuleBased.score(low_similarity, &config),
            ScoreStrategy::RuleBased.score(high_similarity, &config),
        );
    }

    #[test]
    fn test_learned_scores_are_not_clamped() {
        let model = Arc::new(LinearModel::new(vec![0., 0., 0., 0.], 150.));
        let score = ScoreStrategy::Learned(model).score(features(0., 0.), &Config::default());
        assert_approx_eq!(f32, score, 150.);
    }

    #[test]
    fn test_round_score() {
        assert_approx_eq!(f32, round_score(87.654_32), 87.65);
        assert_approx_eq!(f32, round_score(87.656), 87.66, epsilon = 1e-4);
        assert_approx_eq!(f32, round_score(100.), 100.);
    }
}
