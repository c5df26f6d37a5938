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

use xayn_swap::Embedding;

use crate::models::{FeedbackRecord, Item};

pub(crate) fn item(id: &str, category: &str, price: Option<f32>, rating: f32) -> Item {
    Item {
        id: id.try_into().unwrap(),
        title: id.to_uppercase(),
        category: category.into(),
        price,
        rating,
        discount: 0.,
        features: Vec::new(),
        description: String::new(),
        embedding: None,
    }
}

pub(crate) fn embedded_item(
    id: &str,
    category: &str,
    price: Option<f32>,
    rating: f32,
    embedding: impl Into<Embedding>,
) -> Item {
    Item {
        embedding: Some(embedding.into()),
        ..item(id, category, price, rating)
    }
}

pub(crate) fn feedback_record(original: &str, replacement: &str, score: f32) -> FeedbackRecord {
    FeedbackRecord {
        user_id: "tester".try_into().unwrap(),
        original_id: original.try_into().unwrap(),
        replacement_id: replacement.try_into().unwrap(),
        original_price: Some(2.),
        replacement_price: Some(2.5),
        original_rating: 4.,
        replacement_rating: 4.5,
        score,
    }
}
