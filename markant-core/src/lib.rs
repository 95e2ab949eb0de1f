//! Hierarchical marker detection and annotation engine
//!
//! Detects "markers" — linguistic/behavioral patterns — in free text and
//! produces a minimal, conflict-free set of annotated spans with confidence
//! scores. Markers live on four hierarchy levels (ATO < SEM < CLU < MEMA):
//! atomic markers are pattern-matched against raw text, composed markers
//! fire when a restricted activation formula holds over lower-level
//! evidence. Large documents are processed in overlapping sentence-aligned
//! windows with document-global offsets.
//!
//! # Architecture
//!
//! - **Domain layer**: boundary detection, atomic matching, the formula
//!   interpreter, composition, span policies, overlap resolution — pure
//!   deterministic functions
//! - **Application layer**: window splitting, per-window pipeline
//!   execution, global merge
//! - **API layer**: [`Annotator`], configuration, and the reported
//!   [`AnnotationSet`]
//!
//! # Example
//!
//! ```rust
//! use markant_core::{Annotator, Family, MarkerDefinition, SpanPolicy};
//!
//! let definitions = vec![
//!     MarkerDefinition::atomic("ATO_GASLIGHTING_TERM", 0.7)
//!         .with_regex(r"bildest dir das nur ein"),
//!     MarkerDefinition::composed("SEM_GASLIGHTING_PATTERN", [("ATO_GASLIGHTING_TERM", 1.0)])
//!         .with_activation("ATO_GASLIGHTING_TERM >= 1")
//!         .with_span_policy(SpanPolicy::sentence_union(1)),
//! ];
//!
//! let annotator = Annotator::new(&definitions).unwrap();
//! let result = annotator
//!     .annotate("Du bildest dir das nur ein. Das habe ich nie gesagt.")
//!     .unwrap();
//!
//! // The SEM marker spans the first sentence and outranks its own
//! // atomic evidence during overlap resolution
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.annotations[0].family, Family::Sem);
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod application;
pub mod definition;
pub mod domain;
pub mod error;

pub use api::{
    annotate, Annotation, AnnotationSet, Annotator, AnnotatorConfig, AnnotatorConfigBuilder,
    FamilyCounts, RunStats,
};
pub use definition::{
    ChildSpec, CompiledMarkerSet, Family, MarkerDefinition, MarkerKind, PatternSpec,
    PromotionRule, SpanMode, SpanPolicy,
};
pub use error::{DefinitionError, Diagnostic, EngineError, Result};
