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

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configurations of the scoring system.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
#[must_use]
pub struct Config {
    price_tolerance: f32,
    rating_tolerance: f32,
    neutral_similarity: f32,
    min_samples: usize,
    test_fraction: f32,
    split_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price_tolerance: 5.,
            rating_tolerance: 5.,
            neutral_similarity: 0.5,
            min_samples: 5,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

/// Errors of the scoring system configuration.
#[derive(Copy, Clone, Debug, Display, Error)]
pub enum Error {
    /// Invalid price tolerance, expected positive value
    PriceTolerance,
    /// Invalid rating tolerance, expected positive value
    RatingTolerance,
    /// Invalid neutral similarity, expected value from [-1, 1]
    NeutralSimilarity,
    /// Invalid minimum number of training samples, expected at least 2
    MinSamples,
    /// Invalid test fraction, expected value from (0, 1)
    TestFraction,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.price_tolerance > 0.) {
            return Err(Error::PriceTolerance);
        }
        if !(self.rating_tolerance > 0.) {
            return Err(Error::RatingTolerance);
        }
        if !(-1. ..=1.).contains(&self.neutral_similarity) {
            return Err(Error::NeutralSimilarity);
        }
        if self.min_samples < 2 {
            return Err(Error::MinSamples);
        }
        if !(self.test_fraction > 0. && self.test_fraction < 1.) {
            return Err(Error::TestFraction);
        }

        Ok(())
    }

    /// The price difference at which the rule-based price term reaches zero.
    pub fn price_tolerance(&self) -> f32 {
        self.price_tolerance
    }

    /// Sets the price tolerance.
    ///
    /// # Errors
    /// Fails if the tolerance is not positive.
    pub fn with_price_tolerance(mut self, price_tolerance: f32) -> Result<Self, Error> {
        self.price_tolerance = price_tolerance;
        self.validate()?;

        Ok(self)
    }

    /// The rating difference at which the rule-based rating term reaches zero.
    pub fn rating_tolerance(&self) -> f32 {
        self.rating_tolerance
    }

    /// Sets the rating tolerance.
    ///
    /// # Errors
    /// Fails if the tolerance is not positive.
    pub fn with_rating_tolerance(mut self, rating_tolerance: f32) -> Result<Self, Error> {
        self.rating_tolerance = rating_tolerance;
        self.validate()?;

        Ok(self)
    }

    /// The similarity assumed for pairs without comparable embeddings.
    pub fn neutral_similarity(&self) -> f32 {
        self.neutral_similarity
    }

    /// Sets the neutral similarity.
    ///
    /// # Errors
    /// Fails if the similarity is outside of [`-1, 1`].
    pub fn with_neutral_similarity(mut self, neutral_similarity: f32) -> Result<Self, Error> {
        self.neutral_similarity = neutral_similarity;
        self.validate()?;

        Ok(self)
    }

    /// The minimum number of usable feedback samples required for a fit.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Sets the minimum number of training samples.
    ///
    /// # Errors
    /// Fails if the minimum is below 2.
    pub fn with_min_samples(mut self, min_samples: usize) -> Result<Self, Error> {
        self.min_samples = min_samples;
        self.validate()?;

        Ok(self)
    }

    /// The fraction of samples held out for evaluation.
    pub fn test_fraction(&self) -> f32 {
        self.test_fraction
    }

    /// Sets the test fraction.
    ///
    /// # Errors
    /// Fails if the fraction is outside of (0, 1).
    pub fn with_test_fraction(mut self, test_fraction: f32) -> Result<Self, Error> {
        self.test_fraction = test_fraction;
        self.validate()?;

        Ok(self)
    }

    /// The seed of the reproducible holdout split.
    pub fn split_seed(&self) -> u64 {
        self.split_seed
    }

    /// Sets the split seed.
    pub fn with_split_seed(mut self, split_seed: u64) -> Self {
        self.split_seed = split_seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        assert!(Config::default().with_price_tolerance(0.).is_err());
        assert!(Config::default().with_rating_tolerance(-1.).is_err());
        assert!(Config::default().with_neutral_similarity(1.5).is_err());
        assert!(Config::default().with_min_samples(1).is_err());
        assert!(Config::default().with_test_fraction(1.).is_err());
    }
}
