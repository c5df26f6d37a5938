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

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::Error, logging};

/// The shape of a generated round.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundConfig {
    pub cart_size: usize,
    pub unavailable_count: usize,
    pub max_candidates: usize,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            cart_size: 4,
            unavailable_count: 2,
            max_candidates: 4,
        }
    }
}

/// The feedback log and its retrain trigger.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackConfig {
    pub path: PathBuf,
    pub retrain_threshold: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            path: "feedback_log.jsonl".into(),
            retrain_threshold: 50,
        }
    }
}

/// The model artifact, retrain log and reload/retrain cadence.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
    pub retrain_log_path: PathBuf,
    /// Minimum seconds between artifact metadata checks.
    pub check_interval_secs: u64,
    /// Seconds between runs of the periodic safety-net retraining.
    pub periodic_retrain_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "replacement_model.json".into(),
            retrain_log_path: "retrain_log.jsonl".into(),
            check_interval_secs: 3,
            periodic_retrain_secs: 3600,
        }
    }
}

/// The full engine configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub logging: logging::Config,
    pub round: RoundConfig,
    pub feedback: FeedbackConfig,
    pub model: ModelConfig,
    pub scoring: xayn_swap::Config,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        self.scoring.validate()?;
        if self.round.cart_size == 0 || self.round.max_candidates == 0 {
            return Err(Error::RoundConfig);
        }
        if self.feedback.retrain_threshold == 0 {
            return Err(Error::RetrainThreshold);
        }

        Ok(())
    }
}

/// Load the configuration into given type.
///
/// # Load order/priority
///
/// This will by ascending priority load:
///
/// 1. `./config.toml` or specified toml config file
/// 2. `./.env`
/// 3. `./.env.local`
/// 4. process environment
/// 5. options passed through `update_with`
///
/// Config values loaded from higher priority sources override such from lower
/// priority sources.
///
/// Environment variables from `.env` and `.env.local` are loaded into the
/// process environment if they don't already exist there. Only variables with
/// the `XAYN_SWAP__` prefix are considered and the prefix is stripped; they
/// are split at `__`, i.e. `XAYN_SWAP__FEEDBACK__RETRAIN_THRESHOLD=25` is
/// treated like the json `{ "feedback": { "retrain_threshold": 25 } }`.
pub fn load_config<C, U>(config_file: Option<&Path>, update_with: U) -> Result<C, figment::Error>
where
    C: DeserializeOwned,
    U: Serialize,
{
    // the order must be from highest to lowest priority
    // or else it won't work correctly
    load_dotenv(".env.local")?;
    load_dotenv(".env")?;

    let mut figment = Figment::new()
        .join(Serialized::defaults(update_with))
        .join(Env::prefixed("XAYN_SWAP__").split("__"));

    let file = config_file.unwrap_or_else(|| Path::new("config.toml"));
    if file.exists() {
        figment = figment.join(Toml::file(file));
    }

    figment.extract()
}

fn load_dotenv(file_name: &str) -> Result<(), figment::Error> {
    match dotenvy::from_filename(file_name) {
        Err(error) if !error.not_found() => {
            Err(figment::Error::from(error.to_string()).with_path(file_name))
        }
        _ => Ok(()),
    }
}
