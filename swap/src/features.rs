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

use crate::embedding::{cosine_similarity, Embedding};

/// The feature names in the order they enter the regressor.
pub const FEATURE_NAMES: [&str; 4] = ["price_diff", "rating_diff", "has_rating", "semantic_similarity"];

/// The scoring-relevant signals of one side of an (original, replacement) pair.
///
/// Prices and ratings may come from the catalog, a feedback record or a
/// prediction request; the embedding is always resolved against the catalog.
#[derive(Clone, Copy, Debug)]
pub struct ItemSignals<'a> {
    pub price: Option<f32>,
    pub rating: f32,
    pub embedding: Option<&'a Embedding>,
}

/// The fixed-length feature encoding of an (original, replacement) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features {
    pub price_diff: f32,
    pub rating_diff: f32,
    pub has_rating: f32,
    pub similarity: f32,
}

impl Features {
    /// Extracts the features of a replacement candidate wrt the original item.
    ///
    /// An absent price is treated as zero for the difference. The similarity
    /// falls back to `neutral_similarity` if either embedding is absent or
    /// degenerate.
    pub fn extract(
        original: ItemSignals<'_>,
        replacement: ItemSignals<'_>,
        neutral_similarity: f32,
    ) -> Self {
        let price_diff =
            (replacement.price.unwrap_or(0.) - original.price.unwrap_or(0.)).abs();
        let rating_diff = (replacement.rating - original.rating).abs();
        let has_rating = f32::from(original.rating > 0. && replacement.rating > 0.);
        let similarity = match (original.embedding, replacement.embedding) {
            (Some(original), Some(replacement)) => {
                cosine_similarity(original, replacement).unwrap_or(neutral_similarity)
            }
            _ => neutral_similarity,
        };

        Self {
            price_diff,
            rating_diff,
            has_rating,
            similarity,
        }
    }

    /// The features as an array in [`FEATURE_NAMES`] order.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.price_diff,
            self.rating_diff,
            self.has_rating,
            self.similarity,
        ]
    }
}

#[cfg(test)]
mod tests {
    use xayn_swap_test_utils::assert_approx_eq;

    use super::*;

    const NEUTRAL: f32 = 0.5;

    fn signals(price: Option<f32>, rating: f32) -> ItemSignals<'static> {
        ItemSignals {
            price,
            rating,
            embedding: None,
        }
    }

    #[test]
    fn test_extract_diffs_are_absolute() {
        let a = signals(Some(10.), 4.5);
        let b = signals(Some(12.5), 3.);

        let ab = Features::extract(a, b, NEUTRAL);
        let ba = Features::extract(b, a, NEUTRAL);

        assert_approx_eq!(f32, ab.price_diff, 2.5);
        assert_approx_eq!(f32, ab.rating_diff, 1.5);
        assert_approx_eq!(f32, ab.price_diff, ba.price_diff);
        assert_approx_eq!(f32, ab.rating_diff, ba.rating_diff);
    }

    #[test]
    fn test_extract_absent_price_counts_as_zero() {
        let features = Features::extract(signals(None, 4.), signals(Some(3.), 4.), NEUTRAL);
        assert_approx_eq!(f32, features.price_diff, 3.);
    }

    #[test]
    fn test_extract_has_rating() {
        let rated = Features::extract(signals(Some(1.), 4.), signals(Some(1.), 3.), NEUTRAL);
        assert_approx_eq!(f32, rated.has_rating, 1.);

        let unrated = Features::extract(signals(Some(1.), 0.), signals(Some(1.), 3.), NEUTRAL);
        assert_approx_eq!(f32, unrated.has_rating, 0.);
    }

    #[test]
    fn test_extract_similarity_neutral_fallback() {
        let features = Features::extract(signals(Some(1.), 1.), signals(Some(1.), 1.), NEUTRAL);
        assert_approx_eq!(f32, features.similarity, 0.5);

        let embedding = Embedding::from([1., 0.]);
        let with_one_side = Features::extract(
            ItemSignals {
                price: Some(1.),
                rating: 1.,
                embedding: Some(&embedding),
            },
            signals(Some(1.), 1.),
            NEUTRAL,
        );
        assert_approx_eq!(f32, with_one_side.similarity, 0.5);
    }

    #[test]
    fn test_extract_similarity_from_embeddings() {
        let a = Embedding::from([1., 0.]);
        let b = Embedding::from([1., 1.]);
        let features = Features::extract(
            ItemSignals {
                price: Some(1.),
                rating: 1.,
                embedding: Some(&a),
            },
            ItemSignals {
                price: Some(1.),
                rating: 1.,
                embedding: Some(&b),
            },
            NEUTRAL,
        );
        assert_approx_eq!(f32, features.similarity, std::f32::consts::FRAC_1_SQRT_2);
    }

    #[test]
    fn test_to_array_order_matches_names() {
        let features = Features {
            price_diff: 1.,
            rating_diff: 2.,
            has_rating: 3.,
            similarity: 4.,
        };
        assert_eq!(features.to_array(), [1., 2., 3., 4.]);
        assert_eq!(FEATURE_NAMES.len(), features.to_array().len());
    }
}
