//! Engine options from a TOML configuration file
//!
//! Command-line flags override file values, file values override the
//! engine defaults.

use crate::error::CliError;
use anyhow::{Context, Result};
use markant_core::{AnnotatorConfig, Family};
use serde::Deserialize;
use std::path::Path;

/// Engine options as they appear in a `markant.toml`
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Soft chunking threshold in bytes
    pub chunk_threshold_bytes: Option<usize>,
    /// Window overlap margin in bytes
    pub chunk_overlap_bytes: Option<usize>,
    /// Absolute input cap in bytes
    pub max_input_bytes: Option<usize>,
    /// Family priority order, e.g. `["SEM", "CLU", "ATO", "MEMA"]`
    pub family_priority: Option<Vec<String>>,
    /// Default composed score threshold
    pub composed_min_score_default: Option<f64>,
    /// Worker threads for chunked processing
    pub threads: Option<usize>,
}

impl FileConfig {
    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Build the engine configuration, applying CLI overrides last
    pub fn into_engine_config(self, chunk_threshold: Option<usize>) -> Result<AnnotatorConfig> {
        let defaults = AnnotatorConfig::default();
        let mut builder = AnnotatorConfig::builder()
            .chunk_threshold_bytes(
                chunk_threshold
                    .or(self.chunk_threshold_bytes)
                    .unwrap_or(defaults.chunk_threshold_bytes),
            )
            .chunk_overlap_bytes(
                self.chunk_overlap_bytes
                    .unwrap_or(defaults.chunk_overlap_bytes),
            )
            .max_input_bytes(self.max_input_bytes.unwrap_or(defaults.max_input_bytes))
            .composed_min_score_default(
                self.composed_min_score_default
                    .unwrap_or(defaults.composed_min_score_default),
            )
            .threads(self.threads);

        if let Some(names) = self.family_priority {
            builder = builder.family_priority(parse_priority(&names)?);
        }

        builder.build().map_err(|e| anyhow::anyhow!(e))
    }
}

fn parse_priority(names: &[String]) -> Result<[Family; 4]> {
    let parsed: Vec<Family> = names
        .iter()
        .map(|name| {
            name.parse::<Family>()
                .map_err(|e| anyhow::anyhow!(CliError::ConfigError(e)))
        })
        .collect::<Result<_>>()?;
    parsed.try_into().map_err(|_| {
        anyhow::anyhow!(CliError::ConfigError(
            "family_priority must list exactly four families".to_string()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_engine_defaults() {
        let config = FileConfig::default().into_engine_config(None).unwrap();
        assert_eq!(config, AnnotatorConfig::default());
    }

    #[test]
    fn cli_override_beats_file_value() {
        let file = FileConfig {
            chunk_threshold_bytes: Some(5_000),
            ..Default::default()
        };
        let config = file.into_engine_config(Some(9_000)).unwrap();
        assert_eq!(config.chunk_threshold_bytes, 9_000);
    }

    #[test]
    fn parses_family_priority_names() {
        let file = FileConfig {
            family_priority: Some(vec![
                "ATO".to_string(),
                "SEM".to_string(),
                "CLU".to_string(),
                "MEMA".to_string(),
            ]),
            ..Default::default()
        };
        let config = file.into_engine_config(None).unwrap();
        assert_eq!(config.family_priority[0], Family::Ato);
    }

    #[test]
    fn rejects_short_priority_lists() {
        let file = FileConfig {
            family_priority: Some(vec!["SEM".to_string()]),
            ..Default::default()
        };
        assert!(file.into_engine_config(None).is_err());
    }

    #[test]
    fn parses_toml_document() {
        let parsed: FileConfig = toml::from_str(
            r#"
            chunk_threshold_bytes = 8000
            chunk_overlap_bytes = 300
            composed_min_score_default = 0.5
            family_priority = ["SEM", "CLU", "ATO", "MEMA"]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.chunk_threshold_bytes, Some(8000));
        assert_eq!(parsed.composed_min_score_default, Some(0.5));
    }
}
