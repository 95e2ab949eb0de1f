//! Engine configuration

use crate::definition::Family;
use crate::domain::overlap::DEFAULT_FAMILY_PRIORITY;
use crate::error::EngineError;

/// Configuration for an [`Annotator`](crate::Annotator)
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorConfig {
    /// Soft cap: documents above this size are processed in windows
    pub chunk_threshold_bytes: usize,
    /// Overlap margin between adjacent windows; should exceed the largest
    /// composed span the definition set can produce
    pub chunk_overlap_bytes: usize,
    /// Hard cap: documents above this size are rejected outright
    pub max_input_bytes: usize,
    /// Total order over families used by the overlap resolver
    pub family_priority: [Family; 4],
    /// Score threshold for composed markers without an own `min_score`
    pub composed_min_score_default: f64,
    /// Worker threads for chunked processing (`None` = all cores)
    pub threads: Option<usize>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            chunk_threshold_bytes: 12_000,
            chunk_overlap_bytes: 200,
            max_input_bytes: 50 * 1024 * 1024,
            family_priority: DEFAULT_FAMILY_PRIORITY,
            composed_min_score_default: 0.6,
            threads: None,
        }
    }
}

impl AnnotatorConfig {
    /// Create a builder
    pub fn builder() -> AnnotatorConfigBuilder {
        AnnotatorConfigBuilder::default()
    }
}

/// Builder for [`AnnotatorConfig`] with validation
#[derive(Debug, Default)]
pub struct AnnotatorConfigBuilder {
    config: AnnotatorConfig,
}

impl AnnotatorConfigBuilder {
    /// Set the chunking threshold in bytes
    pub fn chunk_threshold_bytes(mut self, bytes: usize) -> Self {
        self.config.chunk_threshold_bytes = bytes;
        self
    }

    /// Set the window overlap margin in bytes
    pub fn chunk_overlap_bytes(mut self, bytes: usize) -> Self {
        self.config.chunk_overlap_bytes = bytes;
        self
    }

    /// Set the absolute input cap in bytes
    pub fn max_input_bytes(mut self, bytes: usize) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    /// Set the family priority order
    pub fn family_priority(mut self, priority: [Family; 4]) -> Self {
        self.config.family_priority = priority;
        self
    }

    /// Set the default composed score threshold
    pub fn composed_min_score_default(mut self, min_score: f64) -> Self {
        self.config.composed_min_score_default = min_score;
        self
    }

    /// Set the worker thread count (`None` = all cores)
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.config.threads = threads;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<AnnotatorConfig, EngineError> {
        let config = self.config;
        if config.chunk_threshold_bytes == 0 {
            return Err(EngineError::Config(
                "chunk_threshold_bytes must be positive".to_string(),
            ));
        }
        if config.chunk_overlap_bytes >= config.chunk_threshold_bytes {
            return Err(EngineError::Config(
                "chunk_overlap_bytes must be smaller than chunk_threshold_bytes".to_string(),
            ));
        }
        if config.max_input_bytes < config.chunk_threshold_bytes {
            return Err(EngineError::Config(
                "max_input_bytes must not be smaller than chunk_threshold_bytes".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.composed_min_score_default) {
            return Err(EngineError::Config(
                "composed_min_score_default must lie in 0.0..=1.0".to_string(),
            ));
        }
        for family in [Family::Ato, Family::Sem, Family::Clu, Family::Mema] {
            if !config.family_priority.contains(&family) {
                return Err(EngineError::Config(format!(
                    "family_priority must mention every family, {family} is missing"
                )));
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(AnnotatorConfig::builder().build().is_ok());
    }

    #[test]
    fn rejects_overlap_at_or_above_threshold() {
        let err = AnnotatorConfig::builder()
            .chunk_threshold_bytes(100)
            .chunk_overlap_bytes(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn rejects_incomplete_family_priority() {
        let err = AnnotatorConfig::builder()
            .family_priority([Family::Sem, Family::Sem, Family::Ato, Family::Mema])
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let err = AnnotatorConfig::builder()
            .composed_min_score_default(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
