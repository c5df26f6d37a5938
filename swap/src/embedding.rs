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

use derive_more::{Deref, From};
use ndarray::Array1;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A d-dimensional item embedding.
///
/// The serde is identical to a `Vec<f32>`.
#[derive(Clone, Debug, Default, Deref, From, PartialEq)]
pub struct Embedding(Array1<f32>);

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Array1::from_vec(vec).into()
    }
}

impl<const N: usize> From<[f32; N]> for Embedding {
    fn from(array: [f32; N]) -> Self {
        Vec::from(array).into()
    }
}

impl Serialize for Embedding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.0)
    }
}

impl<'de> Deserialize<'de> for Embedding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<f32>::deserialize(deserializer).map(Self::from)
    }
}

/// Computes the cosine similarity between two embeddings.
///
/// Returns `None` if the embeddings differ in length or either vector is
/// degenerate (zero or non-finite norm), so callers can substitute their
/// neutral fallback instead of dividing by zero.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let norms = a.dot(&**a).sqrt() * b.dot(&**b).sqrt();
    if norms > 0. && norms.is_finite() {
        Some(a.dot(&**b) / norms)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use xayn_swap_test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let embedding = Embedding::from([1., 2., 3.]);
        let similarity = cosine_similarity(&embedding, &embedding).unwrap();
        assert_approx_eq!(f32, similarity, 1., epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Embedding::from([1., 0.]);
        let b = Embedding::from([0., 1.]);
        assert_approx_eq!(f32, cosine_similarity(&a, &b).unwrap(), 0.);
    }

    // modeled after the scipy implementation:
    // 1 - distance.cosine([1, 2, 3], [1, 5, 9]) == 0.9818105397247233
    #[test]
    fn test_cosine_similarity_scipy() {
        let a = Embedding::from([1., 2., 3.]);
        let b = Embedding::from([1., 5., 9.]);
        assert_approx_eq!(
            f32,
            cosine_similarity(&a, &b).unwrap(),
            0.981_810_57,
            epsilon = 1e-6,
        );
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        let zero = Embedding::from([0., 0., 0.]);
        let unit = Embedding::from([1., 0., 0.]);
        assert!(cosine_similarity(&zero, &unit).is_none());
        assert!(cosine_similarity(&unit, &zero).is_none());

        let nan = Embedding::from([f32::NAN, 0., 0.]);
        assert!(cosine_similarity(&nan, &unit).is_none());
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        let a = Embedding::from([1., 2.]);
        let b = Embedding::from([1., 2., 3.]);
        assert!(cosine_similarity(&a, &b).is_none());
    }

    #[test]
    fn test_serde_as_vec() {
        let embedding = Embedding::from([0.5, -1.5]);
        let json = serde_json::to_string(&embedding).unwrap();
        assert_eq!(json, "[0.5,-1.5]");
        let deserialized = serde_json::from_str::<Embedding>(&json).unwrap();
        assert_eq!(deserialized, embedding);
    }
}
