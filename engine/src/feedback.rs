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
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{error::Error, models::FeedbackRecord};

/// The append-only, newline-delimited feedback log.
///
/// Records are never mutated or deleted; the record count is the sole input
/// of the retrain trigger. Count and append are separate filesystem
/// observations, an off-by-one race between them is tolerated.
pub struct FeedbackStore {
    path: PathBuf,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the record durably.
    pub fn append(&self, record: &FeedbackRecord) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        Ok(())
    }

    /// Counts the stored records. A missing log means zero records.
    pub fn count(&self) -> Result<usize, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(error) => return Err(error.into()),
        };

        Ok(BufReader::new(file)
            .lines()
            .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()))
            .count())
    }

    /// Loads all stored records, skipping undecodable lines.
    pub fn load_all(&self) -> Result<Vec<FeedbackRecord>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(error) => warn!(%error, "skipping undecodable feedback record"),
            }
        }

        Ok(records)
    }

    /// True iff the record count is a positive, exact multiple of the
    /// threshold. Retraining fires at counts 50, 100, 150, ... and nowhere in
    /// between.
    pub fn should_retrain(&self, threshold: usize) -> Result<bool, Error> {
        let count = self.count()?;

        Ok(count > 0 && count % threshold == 0)
    }
}
