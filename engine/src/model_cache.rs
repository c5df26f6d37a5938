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

use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant, SystemTime},
};

use tracing::{info, warn};
use xayn_swap::LinearModel;

#[derive(Default)]
struct CacheState {
    model: Option<(Arc<LinearModel>, SystemTime)>,
    last_check: Option<Instant>,
}

/// Holds the currently active regressor, refreshed from the artifact file.
///
/// A missing artifact is the normal pre-first-training state, not an error.
/// With a model loaded, the artifact's metadata is only re-checked once the
/// check interval has elapsed, and the model is replaced only if the artifact
/// has a newer modification time than the loaded one. Replacing is an atomic
/// swap of the shared handle, in-flight scoring calls keep the old model.
pub struct ModelCache {
    path: PathBuf,
    check_interval: Duration,
    state: RwLock<CacheState>,
}

impl ModelCache {
    pub fn new(path: impl Into<PathBuf>, check_interval: Duration) -> Self {
        Self {
            path: path.into(),
            check_interval,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// The currently active model, if any, applying the reload policy.
    pub fn active(&self) -> Option<Arc<LinearModel>> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((model, _)) = &state.model {
                let fresh = state
                    .last_check
                    .map_or(false, |checked| checked.elapsed() < self.check_interval);
                if fresh {
                    return Some(model.clone());
                }
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // another caller may have refreshed while this one waited on the lock
        if let Some((model, _)) = &state.model {
            let fresh = state
                .last_check
                .map_or(false, |checked| checked.elapsed() < self.check_interval);
            if fresh {
                return Some(model.clone());
            }
        }
        state.last_check = Some(Instant::now());

        let Ok(modified) = std::fs::metadata(&self.path).and_then(|metadata| metadata.modified())
        else {
            // no artifact yet, serve the rule-based fallback
            state.model = None;
            return None;
        };

        let stale = match &state.model {
            Some((_, loaded)) => modified > *loaded,
            None => true,
        };
        if stale {
            match self.load(modified) {
                Ok(loaded) => {
                    info!(path = %self.path.display(), "model artifact loaded");
                    state.model = Some(loaded);
                }
                // keep serving the previous model rather than a broken one
                Err(error) => warn!(%error, "failed to load model artifact"),
            }
        }

        state.model.as_ref().map(|(model, _)| model.clone())
    }

    fn load(&self, modified: SystemTime) -> Result<(Arc<LinearModel>, SystemTime), anyhow::Error> {
        let model = serde_json::from_reader(BufReader::new(File::open(&self.path)?))?;

        Ok((Arc::new(model), modified))
    }
}
