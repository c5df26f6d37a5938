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

use std::io;

use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

/// Malformed item id "{id}".
#[derive(Clone, Debug, Display, Error, Serialize)]
pub struct InvalidItemId {
    pub(crate) id: String,
}

/// Malformed user id "{id}".
#[derive(Clone, Debug, Display, Error, Serialize)]
pub struct InvalidUserId {
    pub(crate) id: String,
}

/// Errors surfaced to the caller of the engine.
///
/// Absorbed conditions like a missing model artifact or a feedback record
/// referencing an unknown item never show up here; those degrade gracefully
/// and only emit tracing events.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Requested a cart of {requested} items but the catalog only holds {available}
    InsufficientCatalog { requested: usize, available: usize },
    /// Retraining needs at least {required} usable samples but found only {found}
    InsufficientData { found: usize, required: usize },
    /// Invalid scoring configuration: {0}
    Config(#[from] xayn_swap::Error),
    /// Invalid round configuration, expected non-empty cart and candidate set
    RoundConfig,
    /// Invalid retrain threshold, expected positive value
    RetrainThreshold,
    /// Fitting the regressor failed: {0}
    Fit(#[from] xayn_swap::FitError),
    /// Storage operation failed: {0}
    Io(#[from] io::Error),
    /// Encoding or decoding a record failed: {0}
    Json(#[from] serde_json::Error),
}

impl Error {
    /// A retrain abort for lack of data is expected while feedback is still
    /// accumulating and must not fail the triggering operation.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
