//! Run configuration.
//!
//! Loaded from an optional JSON file; command-line flags override individual
//! values. The resolved config is passed down explicitly.

use crate::fields::Gender;
use crate::gender::{GenderRule, GenderScheme, GenderVocabulary};
use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How free-text gender answers are classified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderConfig {
    /// Preset table to start from
    pub scheme: GenderScheme,
    /// Where "vill ej uppge" goes; None keeps the scheme's choice
    pub declined_as: Option<Gender>,
    /// Additional or overriding answers
    pub extra_rules: Vec<GenderRule>,
}

impl GenderConfig {
    pub fn vocabulary(&self) -> GenderVocabulary {
        let mut vocabulary = GenderVocabulary::for_scheme(self.scheme);
        if let Some(gender) = self.declined_as {
            vocabulary = vocabulary.with_declined_as(gender);
        }
        for rule in &self.extra_rules {
            vocabulary.add_rule(rule.clone());
        }
        vocabulary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    /// Year whose confirmations count and against which ages are computed
    pub reporting_year: i32,
    pub gender: GenderConfig,
    /// Where merge writes all.csv, dups.csv and maybedups.csv
    pub output_dir: PathBuf,
}

impl Default for CensusConfig {
    fn default() -> Self {
        CensusConfig {
            reporting_year: chrono::Local::now().year(),
            gender: GenderConfig::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl CensusConfig {
    /// Load from JSON; keys left out keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: CensusConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        log::debug!("Loaded config from {:?}: {:?}", path.as_ref(), config);
        Ok(config)
    }

    pub fn with_reporting_year(mut self, year: i32) -> Self {
        self.reporting_year = year;
        self
    }

    pub fn vocabulary(&self) -> GenderVocabulary {
        self.gender.vocabulary()
    }
}
