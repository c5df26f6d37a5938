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

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{info, warn};

use crate::engine::Engine;

/// Spawns the periodic safety-net retraining task.
///
/// Shares the trainer code path with the feedback trigger; the two may race,
/// the artifact publish is atomic and the last write wins. Aborts for lack of
/// usable samples are expected while feedback is still accumulating.
pub fn spawn_periodic_retrain(engine: Arc<Engine>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately
        timer.tick().await;

        loop {
            timer.tick().await;
            let engine = engine.clone();
            let outcome = tokio::task::spawn_blocking(move || engine.retrain()).await;
            match outcome {
                Ok(Ok(entry)) => info!(
                    num_samples = entry.num_samples,
                    mse = entry.mse,
                    r2 = entry.r2,
                    "periodic retraining completed",
                ),
                Ok(Err(error)) if error.is_insufficient_data() => {
                    info!(%error, "periodic retraining skipped");
                }
                Ok(Err(error)) => warn!(%error, "periodic retraining failed"),
                Err(error) => warn!(%error, "periodic retraining panicked"),
            }
        }
    })
}
