//! Layered error types
//!
//! Definition-set errors are fatal and reject the whole set before any text
//! is processed; per-definition and per-window failures during a run are
//! recovered locally and surface as [`Diagnostic`] entries on the result.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while compiling a marker definition set
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Malformed activation or promotion formula
    #[error("marker '{marker_id}': invalid formula: {detail}")]
    FormulaSyntax {
        /// The definition carrying the formula
        marker_id: String,
        /// Parser message with position information
        detail: String,
    },

    /// A declared pattern failed to compile
    #[error("marker '{marker_id}': invalid pattern: {source}")]
    InvalidPattern {
        /// The definition carrying the pattern
        marker_id: String,
        /// The underlying regex error
        source: regex::Error,
    },

    /// Two definitions share the same id
    #[error("duplicate marker id '{marker_id}'")]
    DuplicateId {
        /// The repeated id
        marker_id: String,
    },

    /// An atomic definition declared no patterns
    #[error("atomic marker '{marker_id}' declares no patterns")]
    MissingPatterns {
        /// The offending definition
        marker_id: String,
    },

    /// A composed definition declared no children
    #[error("composed marker '{marker_id}' declares no children")]
    EmptyComposition {
        /// The offending definition
        marker_id: String,
    },

    /// A composed definition references a marker that does not exist
    #[error("marker '{marker_id}': unknown child '{child}'")]
    UnknownChild {
        /// The referencing definition
        marker_id: String,
        /// The missing child id
        child: String,
    },

    /// A composed definition references a marker above its own level
    #[error("marker '{marker_id}': child '{child}' is at a higher hierarchy level")]
    HierarchyViolation {
        /// The referencing definition
        marker_id: String,
        /// The out-of-order child id
        child: String,
    },

    /// The id prefix does not match the declared family
    #[error("marker '{marker_id}': id prefix does not match declared family")]
    FamilyMismatch {
        /// The offending definition
        marker_id: String,
    },

    /// The composition graph contains a cycle
    ///
    /// The core never produces this itself (hierarchy ordering makes cycles
    /// unreachable during evaluation); it is raised by definition loaders
    /// that validate bundles before handing them over.
    #[error("marker '{marker_id}' participates in a composition cycle")]
    DefinitionCycle {
        /// A marker on the cycle
        marker_id: String,
    },
}

/// Engine-level errors for a single annotation run
#[derive(Error, Debug)]
pub enum EngineError {
    /// Definition set rejected at load time
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Document exceeds the absolute hard cap
    #[error("input of {len} bytes exceeds the hard cap of {cap} bytes")]
    InputTooLarge {
        /// Length of the rejected document in bytes
        len: usize,
        /// The configured cap in bytes
        cap: usize,
    },

    /// Invalid engine configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Non-fatal events recorded during a run and attached to the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// One definition's activation could not be evaluated for one window;
    /// the definition was skipped there and the run continued
    ActivationFailed {
        /// The definition whose formula failed
        marker_id: String,
        /// Sentence-window index where evaluation failed
        window: usize,
        /// Evaluator message
        reason: String,
    },

    /// One chunk window failed and was excluded from the global merge
    WindowFailed {
        /// Index of the failed window
        index: usize,
        /// Failure description
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_error_display() {
        let err = DefinitionError::UnknownChild {
            marker_id: "SEM_X".to_string(),
            child: "ATO_Y".to_string(),
        };
        assert_eq!(err.to_string(), "marker 'SEM_X': unknown child 'ATO_Y'");
    }

    #[test]
    fn input_too_large_display() {
        let err = EngineError::InputTooLarge {
            len: 100,
            cap: 50,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn definition_error_converts_to_engine_error() {
        let err: EngineError = DefinitionError::DuplicateId {
            marker_id: "ATO_A".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Definition(_)));
    }
}
