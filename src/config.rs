//! Merge configuration
//!
//! Every field has a default matching EAD 2002 finding aids, so an empty
//! (or absent) YAML file yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tag names and tokens the locator and merge engine work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Subfolder of the document directory that receives merged output.
    pub output_folder: String,
    /// Elements allowed to hold the grouping wrapper.
    pub permissible_parents: Vec<String>,
    /// Tag of both the outer wrapper and the per-kind subgroups.
    pub wrapper_tag: String,
    /// Tag of the subgroup label element.
    pub label_tag: String,
    /// Element whose attribute carries the document language.
    pub language_element: String,
    pub language_attribute: String,
    /// Language code that selects Dutch labels; anything else selects English.
    pub primary_language: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_folder: "MERGED".to_string(),
            permissible_parents: vec!["did".into(), "descgrp".into(), "dsc".into()],
            wrapper_tag: "controlaccess".to_string(),
            label_tag: "head".to_string(),
            language_element: "language".to_string(),
            language_attribute: "langcode".to_string(),
            primary_language: "dut".to_string(),
        }
    }
}

impl MergeConfig {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn with_output_folder(mut self, folder: impl Into<String>) -> Self {
        self.output_folder = folder.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let folder = self.output_folder.trim();
        if folder.is_empty() || folder.contains(['/', '\\']) || folder == "." || folder == ".." {
            return Err(ConfigError::Invalid(format!(
                "output_folder must be a plain folder name, got {:?}",
                self.output_folder
            )));
        }
        if self.permissible_parents.is_empty() {
            return Err(ConfigError::Invalid(
                "permissible_parents must not be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("wrapper_tag", &self.wrapper_tag),
            ("label_tag", &self.label_tag),
            ("language_element", &self.language_element),
            ("language_attribute", &self.language_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}
