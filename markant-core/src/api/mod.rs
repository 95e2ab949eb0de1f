//! Public API surface
//!
//! A stable facade over the domain and application layers: compile a
//! definition set into an [`Annotator`], feed it documents, receive
//! conflict-free [`AnnotationSet`]s.

pub mod config;
pub mod output;
pub mod processor;

pub use config::{AnnotatorConfig, AnnotatorConfigBuilder};
pub use output::{Annotation, AnnotationSet, FamilyCounts, RunStats};
pub use processor::{annotate, Annotator};
