//! Analysis configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::head_direction::FeatureOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Cap on aligned sentences compared per language pair
    pub sample_size: Option<usize>,
    pub ngram_sizes: Vec<usize>,
    pub ngram_top_k: usize,
    /// Number of most similar language pairs to report
    pub top_pairs: usize,
    pub head_direction: FeatureOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            ngram_sizes: vec![2, 3],
            ngram_top_k: 20,
            top_pairs: 10,
            head_direction: FeatureOptions::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| AnalysisError::io(path, err))?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ngram_sizes.contains(&0) {
            return Err(AnalysisError::InvalidConfig(
                "n-gram sizes must be at least 1".to_string(),
            ));
        }
        if self.head_direction.min_occurrences == 0 {
            return Err(AnalysisError::InvalidConfig(
                "min_occurrences must be at least 1".to_string(),
            ));
        }
        if self.head_direction.min_languages == Some(0) {
            return Err(AnalysisError::InvalidConfig(
                "min_languages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
