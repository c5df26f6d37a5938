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

use std::time::Duration;

use tracing::{info, warn};
use xayn_swap::{round_score, Features, ItemSignals, ScoreStrategy};

use crate::{
    catalog::Catalog,
    config::Config,
    error::Error,
    feedback::FeedbackStore,
    model_cache::ModelCache,
    models::{FeedbackRecord, ItemId, PredictedScore, PredictionRequest, RetrainLogEntry, RetrainLogs, Round},
    round::generate_round,
    trainer,
};

/// The serving facade over the catalog, feedback log, model cache and trainer.
///
/// One instance per process, shared behind an [`Arc`](std::sync::Arc) between
/// the transport layer and the periodic retrain task.
pub struct Engine {
    config: Config,
    catalog: Catalog,
    feedback: FeedbackStore,
    cache: ModelCache,
}

impl Engine {
    pub fn new(config: Config, catalog: Catalog) -> Result<Self, Error> {
        config.validate()?;
        let feedback = FeedbackStore::new(&config.feedback.path);
        let cache = ModelCache::new(
            &config.model.artifact_path,
            Duration::from_secs(config.model.check_interval_secs),
        );

        Ok(Self {
            config,
            catalog,
            feedback,
            cache,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates a round with the configured cart shape.
    pub fn generate_round(&self) -> Result<Round, Error> {
        generate_round(
            &self.catalog,
            self.config.round.cart_size,
            self.config.round.unavailable_count,
            self.config.round.max_candidates,
        )
    }

    /// Appends the feedback record and evaluates the retrain trigger.
    ///
    /// Retraining runs synchronously before the call returns. An abort for
    /// lack of usable samples is absorbed, any other trainer failure
    /// surfaces to the caller.
    pub fn log_feedback(&self, record: &FeedbackRecord) -> Result<(), Error> {
        self.feedback.append(record)?;

        if self
            .feedback
            .should_retrain(self.config.feedback.retrain_threshold)?
        {
            info!(
                threshold = self.config.feedback.retrain_threshold,
                "feedback count reached the retrain threshold",
            );
            match self.retrain() {
                Ok(_) => {}
                Err(error) if error.is_insufficient_data() => {
                    warn!(%error, "retraining skipped");
                }
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }

    /// Scores one candidate substitution.
    ///
    /// Uses the active model if one is loaded, else the rule-based fallback.
    /// Item ids unknown to the catalog only cost the similarity feature its
    /// embedding, they never fail the request.
    pub fn predict_score(&self, request: &PredictionRequest) -> PredictedScore {
        let strategy = self
            .cache
            .active()
            .map_or(ScoreStrategy::RuleBased, ScoreStrategy::Learned);

        let features = Features::extract(
            ItemSignals {
                price: request.original_price,
                rating: request.original_rating,
                embedding: self.embedding_of(&request.original_id),
            },
            ItemSignals {
                price: request.replacement_price,
                rating: request.replacement_rating,
                embedding: self.embedding_of(&request.replacement_id),
            },
            self.config.scoring.neutral_similarity(),
        );

        PredictedScore {
            predicted_score: round_score(strategy.score(features, &self.config.scoring)),
        }
    }

    /// Retrains from the accumulated feedback and publishes the new model.
    pub fn retrain(&self) -> Result<RetrainLogEntry, Error> {
        trainer::retrain(
            &self.catalog,
            &self.feedback,
            &self.config.scoring,
            &self.config.model.artifact_path,
            &self.config.model.retrain_log_path,
        )
    }

    /// The retrain history, newest first.
    pub fn retrain_logs(&self) -> Result<RetrainLogs, Error> {
        trainer::read_logs(&self.config.model.retrain_log_path)
    }

    fn embedding_of(&self, id: &ItemId) -> Option<&xayn_swap::Embedding> {
        self.catalog
            .get(id)
            .and_then(|item| item.embedding.as_ref())
    }
}
