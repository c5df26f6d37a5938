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

//! Substitution-quality scoring: feature extraction, the linear regressor and
//! its training, and the learned/rule-based scoring strategy.

#![deny(unsafe_code)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod config;
mod embedding;
mod features;
mod model;
mod regression;
mod score;

pub use crate::{
    config::{Config, Error},
    embedding::{cosine_similarity, Embedding},
    features::{Features, ItemSignals, FEATURE_NAMES},
    model::LinearModel,
    regression::{evaluate, fit, holdout_split, Evaluation, FitError},
    score::{round_score, ScoreStrategy},
};
