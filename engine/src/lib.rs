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

//! The grocery substitution engine: round generation, feedback-driven
//! retraining and hot-reloaded substitution scoring behind one facade.

#![forbid(unsafe_code)]
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

mod catalog;
pub mod config;
mod engine;
mod error;
mod feedback;
pub mod logging;
mod model_cache;
mod models;
mod round;
mod scheduler;
#[cfg(test)]
mod test_fixtures;
mod trainer;

pub use crate::{
    catalog::Catalog,
    config::{load_config, Config},
    engine::Engine,
    error::{Error, InvalidItemId, InvalidUserId},
    feedback::FeedbackStore,
    model_cache::ModelCache,
    models::{
        CartEntry,
        FeedbackRecord,
        Item,
        ItemId,
        PredictedScore,
        PredictionRequest,
        RetrainLogEntry,
        RetrainLogs,
        Round,
        UserId,
    },
    scheduler::spawn_periodic_retrain,
};
