use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Top-level configuration, loadable from JSON. Every field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub labels: LabelConfig,
}

impl Config {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate().context("validating config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.aggregator.validate()?;
        self.labels.validate()
    }
}

/// How run files are discovered and tokenised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatorConfig {
    /// Accepted run-file extensions, without the dot.
    #[serde(default = "AggregatorConfig::default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "AggregatorConfig::default_delimiter")]
    pub delimiter: char,
    #[serde(default = "AggregatorConfig::default_quote")]
    pub quote: char,
}

impl AggregatorConfig {
    fn default_extensions() -> Vec<String> {
        vec!["dat".to_string(), "div".to_string()]
    }
    fn default_delimiter() -> char {
        ' '
    }
    fn default_quote() -> char {
        '"'
    }

    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(DataError::invalid_config("no run-file extensions configured"));
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return Err(DataError::invalid_config(format!(
                "extension '{ext}' must be non-empty and given without a leading dot"
            )));
        }
        if !self.delimiter.is_ascii() || !self.quote.is_ascii() {
            return Err(DataError::invalid_config("delimiter and quote must be ASCII"));
        }
        if self.delimiter == self.quote {
            return Err(DataError::invalid_config("delimiter and quote must differ"));
        }
        Ok(())
    }

    /// Delimiter as a byte. Only meaningful after [`validate`](Self::validate).
    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub(crate) fn quote_byte(&self) -> u8 {
        self.quote as u8
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            delimiter: Self::default_delimiter(),
            quote: Self::default_quote(),
        }
    }
}

/// Which label derivation to run over the directory names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStrategy {
    /// Pairwise common-block removal; the longest residual wins.
    #[default]
    Residual,
    /// Drop `_`-separated words shared by every directory.
    Tokens,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelConfig {
    #[serde(default)]
    pub strategy: LabelStrategy,
    /// Common blocks shorter than this are kept in the residual.
    #[serde(default = "LabelConfig::default_min_common_len")]
    pub min_common_len: usize,
    /// Trim common blocks so they never split a word.
    #[serde(default = "LabelConfig::default_word_boundaries")]
    pub word_boundaries: bool,
}

impl LabelConfig {
    fn default_min_common_len() -> usize {
        1
    }
    fn default_word_boundaries() -> bool {
        true
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_common_len == 0 {
            return Err(DataError::invalid_config("min_common_len must be at least 1"));
        }
        Ok(())
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            strategy: LabelStrategy::default(),
            min_common_len: Self::default_min_common_len(),
            word_boundaries: Self::default_word_boundaries(),
        }
    }
}
