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

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display, Into};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use xayn_swap::Embedding;

use crate::error::{InvalidItemId, InvalidUserId};

macro_rules! id_wrapper {
    ($name:ident, $validate:expr, $error:ident) => {
        #[derive(
            AsRef, Into, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String> + AsRef<str>) -> Result<Self, $error> {
                if ($validate)(id.as_ref()) {
                    Ok(Self(id.into()))
                } else {
                    Err($error { id: id.into() })
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $error;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

fn is_valid_id(id: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-:@.]+$").unwrap());
    RE.is_match(id)
}

id_wrapper!(ItemId, is_valid_id, InvalidItemId);

id_wrapper!(UserId, is_valid_id, InvalidUserId);

/// A catalog item with its precomputed embedding.
///
/// Items are loaded once at startup and shared read-only afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "subcategory")]
    pub category: String,
    #[serde(default)]
    pub price: Option<f32>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub discount: f32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

/// One item of a generated cart.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CartEntry {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub price: Option<f32>,
    pub rating: f32,
    pub unavailable: bool,
}

/// A freshly generated game round, owned by the caller after return.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Round {
    pub cart: Vec<CartEntry>,
    pub replacements: HashMap<ItemId, Vec<Item>>,
}

/// One user judgement of a proposed substitution, appended verbatim to the
/// feedback log.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FeedbackRecord {
    pub user_id: UserId,
    pub original_id: ItemId,
    pub replacement_id: ItemId,
    pub original_price: Option<f32>,
    pub replacement_price: Option<f32>,
    pub original_rating: f32,
    pub replacement_rating: f32,
    pub score: f32,
}

/// A request to score one candidate substitution.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub original_id: ItemId,
    pub replacement_id: ItemId,
    pub original_price: Option<f32>,
    pub replacement_price: Option<f32>,
    pub original_rating: f32,
    pub replacement_rating: f32,
}

/// The scored response, rounded to two decimals.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PredictedScore {
    pub predicted_score: f32,
}

/// One completed training run in the append-only retrain log.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RetrainLogEntry {
    pub timestamp: DateTime<Utc>,
    pub num_samples: usize,
    pub mse: f32,
    pub r2: f32,
    pub feature_names: Vec<String>,
    pub model_path: String,
}

/// The retrain history, newest first.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RetrainLogs {
    pub logs: Vec<RetrainLogEntry>,
}
