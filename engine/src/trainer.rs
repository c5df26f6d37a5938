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
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
};

use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info, instrument, warn};
use xayn_swap::{evaluate, fit, holdout_split, Config, Features, ItemSignals, FEATURE_NAMES};

use crate::{
    catalog::Catalog,
    error::Error,
    feedback::FeedbackStore,
    models::{FeedbackRecord, RetrainLogEntry, RetrainLogs},
};

/// Rebuilds the regressor from the accumulated feedback, evaluates it on a
/// reproducible holdout split and publishes the artifact plus a log entry.
///
/// The artifact is written to a sibling temp file and moved into place, so
/// concurrent model-cache reads never observe a partial write. Overlapping
/// runs are allowed, the last publish wins.
#[instrument(skip_all, err)]
pub(crate) fn retrain(
    catalog: &Catalog,
    feedback: &FeedbackStore,
    config: &Config,
    model_path: &Path,
    log_path: &Path,
) -> Result<RetrainLogEntry, Error> {
    let records = feedback.load_all()?;
    let rows = records
        .iter()
        .filter_map(|record| training_row(catalog, record, config))
        .collect::<Vec<_>>();

    let samples = rows.len();
    if samples < config.min_samples() {
        return Err(Error::InsufficientData {
            found: samples,
            required: config.min_samples(),
        });
    }

    let mut x = Array2::zeros((samples, FEATURE_NAMES.len()));
    let mut y = Array1::zeros(samples);
    for (i, (features, score)) in rows.into_iter().enumerate() {
        x.row_mut(i).assign(&Array1::from_iter(features.to_array()));
        y[i] = score;
    }

    let (train, test) = holdout_split(samples, config.test_fraction(), config.split_seed());
    let model = fit(x.select(Axis(0), &train).view(), y.select(Axis(0), &train).view())?;
    let evaluation = evaluate(&model, x.select(Axis(0), &test).view(), y.select(Axis(0), &test).view());

    publish_artifact(model_path, &model)?;

    let entry = RetrainLogEntry {
        timestamp: Utc::now(),
        num_samples: samples,
        mse: evaluation.mse,
        r2: evaluation.r2,
        feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        model_path: model_path.display().to_string(),
    };
    append_log(log_path, &entry)?;
    info!(
        num_samples = samples,
        mse = evaluation.mse,
        r2 = evaluation.r2,
        "model retrained",
    );

    Ok(entry)
}

/// Resolves one feedback record into a training row.
///
/// Records referencing unknown items or items without embeddings are skipped,
/// partial data loss is tolerated over failing the whole run.
fn training_row(
    catalog: &Catalog,
    record: &FeedbackRecord,
    config: &Config,
) -> Option<(Features, f32)> {
    let (Some(original), Some(replacement)) = (
        catalog.get(&record.original_id),
        catalog.get(&record.replacement_id),
    ) else {
        debug!(
            original = %record.original_id,
            replacement = %record.replacement_id,
            "skipping feedback record with unresolvable item ids",
        );
        return None;
    };
    let (Some(original_embedding), Some(replacement_embedding)) =
        (&original.embedding, &replacement.embedding)
    else {
        debug!(
            original = %record.original_id,
            replacement = %record.replacement_id,
            "skipping feedback record without embeddings",
        );
        return None;
    };

    let features = Features::extract(
        ItemSignals {
            price: record.original_price,
            rating: record.original_rating,
            embedding: Some(original_embedding),
        },
        ItemSignals {
            price: record.replacement_price,
            rating: record.replacement_rating,
            embedding: Some(replacement_embedding),
        },
        config.neutral_similarity(),
    );

    Some((features, record.score))
}

fn publish_artifact(model_path: &Path, model: &xayn_swap::LinearModel) -> Result<(), Error> {
    let temp_path = model_path.with_extension("json.tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(&serde_json::to_vec(model)?)?;
    file.sync_data()?;
    fs::rename(&temp_path, model_path)?;

    Ok(())
}

fn append_log(log_path: &Path, entry: &RetrainLogEntry) -> Result<(), Error> {
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');
    file.write_all(line.as_bytes())?;

    Ok(())
}

/// Reads the retrain history, newest first. A missing log means no runs yet.
pub(crate) fn read_logs(log_path: &Path) -> Result<RetrainLogs, Error> {
    let file = match File::open(log_path) {
        Ok(file) => file,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(RetrainLogs::default());
        }
        Err(error) => return Err(error.into()),
    };

    let mut logs = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => logs.push(entry),
            Err(error) => warn!(%error, "skipping undecodable retrain log entry"),
        }
    }
    logs.reverse();

    Ok(RetrainLogs { logs })
}

#[cfg(test)]
mod tests {
    use xayn_swap::LinearModel;

    use super::*;
    use crate::test_fixtures::{embedded_item, feedback_record};

    fn catalog() -> Catalog {
        Catalog::from_items([
            embedded_item("a1", "dairy", Some(2.), 4., [1., 0., 0.]),
            embedded_item("a2", "dairy", Some(2.5), 4.5, [0.9, 0.1, 0.]),
            embedded_item("a3", "dairy", Some(6.), 1., [0., 1., 0.]),
            embedded_item("b1", "bakery", Some(1.), 3., [0., 0., 1.]),
        ])
    }

    fn store_with_records(dir: &Path, count: usize) -> FeedbackStore {
        let store = FeedbackStore::new(dir.join("feedback_log.jsonl"));
        for i in 0..count {
            let (replacement, score) = if i % 2 == 0 { ("a2", 90.) } else { ("a3", 15.) };
            store
                .append(&feedback_record("a1", replacement, score))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_retrain_publishes_artifact_and_log_entry() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let log_path = dir.path().join("retrain_log.jsonl");
        let store = store_with_records(dir.path(), 10);

        let entry = retrain(
            &catalog(),
            &store,
            &Config::default(),
            &model_path,
            &log_path,
        )
        .unwrap();

        assert_eq!(entry.num_samples, 10);
        assert!(entry
            .feature_names
            .iter()
            .map(String::as_str)
            .eq(FEATURE_NAMES));

        let artifact =
            serde_json::from_slice::<LinearModel>(&fs::read(&model_path).unwrap()).unwrap();
        assert_eq!(artifact.coefficients().len(), FEATURE_NAMES.len());

        let logs = read_logs(&log_path).unwrap();
        assert_eq!(logs.logs.len(), 1);
        assert_eq!(logs.logs[0].num_samples, 10);
    }

    #[test]
    fn test_insufficient_data_aborts_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let log_path = dir.path().join("retrain_log.jsonl");
        let store = store_with_records(dir.path(), 3);

        let result = retrain(
            &catalog(),
            &store,
            &Config::default(),
            &model_path,
            &log_path,
        );

        assert!(matches!(
            result,
            Err(Error::InsufficientData {
                found: 3,
                required: 5,
            }),
        ));
        assert!(!model_path.exists());
        assert!(!log_path.exists());
    }

    #[test]
    fn test_unresolvable_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_records(dir.path(), 6);
        // resolvable but pushes the count over the trigger without being usable
        store.append(&feedback_record("a1", "ghost", 50.)).unwrap();

        let entry = retrain(
            &catalog(),
            &store,
            &Config::default(),
            &dir.path().join("model.json"),
            &dir.path().join("retrain_log.jsonl"),
        )
        .unwrap();

        assert_eq!(entry.num_samples, 6);
    }

    #[test]
    fn test_read_logs_returns_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("retrain_log.jsonl");
        for samples in [5, 10] {
            append_log(
                &log_path,
                &RetrainLogEntry {
                    timestamp: Utc::now(),
                    num_samples: samples,
                    mse: 1.,
                    r2: 0.5,
                    feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
                    model_path: "model.json".into(),
                },
            )
            .unwrap();
        }

        let logs = read_logs(&log_path).unwrap();
        assert_eq!(logs.logs[0].num_samples, 10);
        assert_eq!(logs.logs[1].num_samples, 5);
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_logs(&dir.path().join("retrain_log.jsonl"))
            .unwrap()
            .logs
            .is_empty());
    }
}
